use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Characters with meaning in the engine's query_string mini-language
///
/// `&` and `|` are only reserved when doubled, see [escape].
pub const RESERVED_CHARS: &[char] = &[
    '\\', '+', '-', '!', '(', ')', '{', '}', '[', ']', '^', '"', '~', '*', '?', '/',
];

/// Where an escaped value ends up, which decides what stays unescaped
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EscapeContext {
    /// Exact-match values: everything reserved is escaped
    Term,
    /// Facet and nested sub-filters keep quotes and grouping
    Facet,
    /// Caller-authored free text keeps grouping
    FreeText,
}

impl EscapeContext {
    #[inline]
    fn keeps(&self, c: char) -> bool {
        match self {
            EscapeContext::Term => false,
            EscapeContext::Facet => matches!(c, '"' | '(' | ')'),
            EscapeContext::FreeText => matches!(c, '(' | ')'),
        }
    }
}

impl Display for EscapeContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EscapeContext::Term => write!(f, "term"),
            EscapeContext::Facet => write!(f, "facet"),
            EscapeContext::FreeText => write!(f, "free_text"),
        }
    }
}

/// Backslash-escapes the reserved characters of `value` that `context` does not keep
pub fn escape(value: &str, context: EscapeContext) -> String {
    let mut ret = String::with_capacity(value.len() + value.len() / 4);
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '&' | '|' if chars.peek() == Some(&c) => {
                chars.next();
                ret.push('\\');
                ret.push(c);
                ret.push(c);
            }
            _ if RESERVED_CHARS.contains(&c) && !context.keeps(c) => {
                ret.push('\\');
                ret.push(c);
            }
            _ => ret.push(c),
        }
    }

    ret
}

/// Escapes the inside of a quoted phrase
///
/// The delimiter and the escape character itself are always escaped so the
/// phrase stays a single phrase, whatever the context keeps.
pub fn escape_phrase(value: &str, context: EscapeContext) -> String {
    let escaped = escape(value, context);

    if context.keeps('"') {
        // Facet keeps bare quotes; inside a phrase they must still be escaped
        let mut ret = String::with_capacity(escaped.len() + 2);
        let mut chars = escaped.chars();

        while let Some(c) = chars.next() {
            match c {
                '\\' => {
                    ret.push(c);
                    if let Some(next) = chars.next() {
                        ret.push(next);
                    }
                }
                '"' => ret.push_str("\\\""),
                _ => ret.push(c),
            }
        }

        ret
    } else {
        escaped
    }
}

/// Escapes a comparison value so it stays a single bare word
///
/// Spaces are not reserved by the engine but would split the word in two.
pub fn escape_word(value: &str, context: EscapeContext) -> String {
    escape_breaks(value, context, &[' '])
}

/// Escapes a free-text word so it re-parses as free text
///
/// A `:` would turn it into a comparison and a bare `and`/`or` into an operator.
pub fn escape_text(value: &str, context: EscapeContext) -> String {
    let escaped = escape_breaks(value, context, &[' ', ':']);

    if is_keyword(value) {
        format!("\\{}", escaped)
    } else {
        escaped
    }
}

/// True for the words the grammar reads as logical operators
pub fn is_keyword(value: &str) -> bool {
    value.eq_ignore_ascii_case("and") || value.eq_ignore_ascii_case("or")
}

fn escape_breaks(value: &str, context: EscapeContext, breaks: &[char]) -> String {
    let escaped = escape(value, context);
    let mut ret = String::with_capacity(escaped.len());

    // escape never emits a backslash in front of a break char, so every one seen here is literal
    for c in escaped.chars() {
        if breaks.contains(&c) {
            ret.push('\\');
        }

        ret.push(c);
    }

    ret
}

/// Resolves backslash escapes written by the caller into the literal text
///
/// A trailing lone backslash is kept as a literal backslash.
pub fn unescape(value: &str) -> String {
    let mut ret = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            ret.push(chars.next().unwrap_or('\\'));
        } else {
            ret.push(c);
        }
    }

    ret
}
