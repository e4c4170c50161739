mod processor;

use pest::Parser;
use pest_derive::Parser;

#[allow(unused_imports)]
use crate::logging::{debug, error, info, warn};

use crate::ast::ParsedQuery;
use crate::error::{missing_token, QueryError};

/// Characters turned into a plain space before parsing
const NORMALIZED_SPACES: &[char] = &['\n', '\r', '\t', '\u{a0}'];

#[derive(Parser)]
#[grammar = "query_parser/query_grammar.pest"]
pub struct QueryParser;

/// Resource limits checked before the grammar runs
#[derive(Debug, Copy, Clone)]
pub struct ParseLimits {
    pub max_length: usize,
    pub max_depth: usize,
}

/// Turns newlines, tabs and non-breaking spaces into spaces and trims the result
///
/// Any other control character is rejected.
pub fn normalize(query: &str) -> Result<String, QueryError> {
    let mut normalized = String::with_capacity(query.len());

    for (position, c) in query.char_indices() {
        if NORMALIZED_SPACES.contains(&c) {
            normalized.push(' ');
        } else if c.is_control() {
            return Err(QueryError::Encoding { position, character: c });
        } else {
            normalized.push(c);
        }
    }

    let trimmed = normalized.trim();

    // a trailing `\ ` is an escaped space, not padding
    let escapes = trimmed.chars().rev().take_while(|c| *c == '\\').count();

    if escapes % 2 == 1 && trimmed.len() < normalized.trim_start().len() {
        Ok(format!("{} ", trimmed))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Where [nesting_depth] is within the current token
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Scan {
    /// Between tokens, where a `"` opens a phrase
    Boundary,
    /// A free-text word or a comparison key
    Word,
    /// Just after the `:` of a comparison
    Operator,
    /// A bare comparison value, where `"` and `(` are literal
    Value,
    Phrase,
}

/// Deepest nesting of parentheses and brackets, ignoring phrases and escapes
///
/// Quotes and parentheses only count where the grammar would read them as
/// structure: a `"` opens a phrase at the start of a token, never mid-word.
pub fn nesting_depth(query: &str) -> usize {
    // true for `field:(a OR b)` value groups, whose members are values
    let mut groups: Vec<bool> = Vec::new();
    let mut max_depth = 0usize;
    let mut state = Scan::Boundary;
    let mut word_start = 0usize;
    let mut list_key = false;
    let mut chars = query.char_indices();

    while let Some((i, c)) = chars.next() {
        let in_value_group = groups.last().copied().unwrap_or(false);

        state = match (state, c) {
            (Scan::Phrase, '\\') => { chars.next(); Scan::Phrase }
            (Scan::Phrase, '"') => Scan::Boundary,
            (Scan::Phrase, _) => Scan::Phrase,

            (_, '\\') => {
                chars.next();

                match state {
                    Scan::Boundary if in_value_group => Scan::Value,
                    Scan::Boundary => { word_start = i; Scan::Word }
                    Scan::Operator => Scan::Value,
                    other => other,
                }
            }

            (Scan::Boundary, '"') | (Scan::Word, '"') | (Scan::Operator, '"') => Scan::Phrase,
            (Scan::Boundary, '(') | (Scan::Word, '(') => { groups.push(in_value_group); Scan::Boundary }
            (Scan::Operator, '(') => { groups.push(true); Scan::Boundary }
            (Scan::Operator, '[') if list_key => { groups.push(false); Scan::Boundary }
            (_, ')') | (Scan::Boundary, ']') | (Scan::Word, ']') => { groups.pop(); Scan::Boundary }
            (_, ' ') | (Scan::Boundary, ',') => Scan::Boundary,

            (Scan::Word, ':') => {
                list_key = matches!(&query[word_start..i], "facets" | "nested");
                Scan::Operator
            }
            (Scan::Operator, '<' | '>' | '=') => Scan::Operator,
            (Scan::Operator, _) | (Scan::Value, _) => Scan::Value,
            (Scan::Boundary, _) if in_value_group => Scan::Value,
            (Scan::Boundary, _) => { word_start = i; Scan::Word }
            (Scan::Word, _) => Scan::Word,
        };

        max_depth = max_depth.max(groups.len());
    }

    max_depth
}

/// Fails fast on input that would make the parse unreasonably expensive
pub fn check_limits(query: &str, limits: ParseLimits) -> Result<(), QueryError> {
    if query.len() > limits.max_length {
        return Err(QueryError::QueryTooLong { length: query.len(), max: limits.max_length });
    }

    let depth = nesting_depth(query);

    if depth > limits.max_depth {
        return Err(QueryError::NestingTooDeep { depth, max: limits.max_depth });
    }

    Ok(())
}

/// Parses an already normalized query into a [ParsedQuery]
pub fn parse_query(query: &str) -> Result<ParsedQuery, QueryError> {
    debug!("Attempting to parse query: {}", query);

    let query_pair = QueryParser::parse(Rule::query, query)?
        .next()
        .ok_or(missing_token("query"))?;

    ParsedQuery::new(query_pair)
}
