use crate::ast::{Comparison, LogicalExpression, Term, Value};
use crate::sanitizer::{escape_phrase, escape_text, escape_word, is_keyword, EscapeContext};

/// Renders a [LogicalExpression] into query_string text
///
/// Grouping parentheses are written back verbatim; only literals pass
/// through the sanitizer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ExpressionCompiler {
    /// Context for comparison values
    values: EscapeContext,
    /// Context for free-text words and phrases
    text: EscapeContext,
}

impl ExpressionCompiler {
    /// The main free-text query
    pub const QUERY: ExpressionCompiler = ExpressionCompiler {
        values: EscapeContext::Term,
        text: EscapeContext::FreeText,
    };

    /// Inline filters of facets and nested queries
    pub const SUB_FILTER: ExpressionCompiler = ExpressionCompiler {
        values: EscapeContext::Facet,
        text: EscapeContext::Facet,
    };

    pub fn compile(&self, expression: &LogicalExpression) -> String {
        let mut ret = String::new();

        for (i, (conjunction, term)) in expression.terms.iter().enumerate() {
            if i > 0 {
                ret.push_str(conjunction.separator());
            }

            self.compile_term(term, &mut ret);
        }

        ret
    }

    fn compile_term(&self, term: &Term, ret: &mut String) {
        match term {
            Term::Comparison(comparison) => self.compile_comparison(comparison, ret),
            Term::Text(word) => ret.push_str(&escape_text(word, self.text)),
            Term::Phrase(phrase) => quote(phrase, self.text, ret),
            Term::Group(inner) => {
                ret.push('(');
                ret.push_str(&self.compile(inner));
                ret.push(')');
            }
        }
    }

    fn compile_comparison(&self, comparison: &Comparison, ret: &mut String) {
        ret.push_str(&comparison.key);
        ret.push_str(comparison.operator.engine_form());
        self.compile_value(&comparison.value, false, ret);
    }

    fn compile_value(&self, value: &Value, in_group: bool, ret: &mut String) {
        match value {
            Value::Word(word) => {
                // inside a value group a bare and/or would read as an operator
                if in_group && is_keyword(word) {
                    ret.push('\\');
                }

                ret.push_str(&escape_word(word, self.values));
            }
            Value::Phrase(phrase) => quote(phrase, self.values, ret),
            Value::Group(members) => {
                ret.push('(');

                for (i, (conjunction, member)) in members.iter().enumerate() {
                    if i > 0 {
                        ret.push_str(conjunction.separator());
                    }

                    self.compile_value(member, true, ret);
                }

                ret.push(')');
            }
        }
    }
}

fn quote(phrase: &str, context: EscapeContext, ret: &mut String) {
    ret.push('"');
    ret.push_str(&escape_phrase(phrase, context));
    ret.push('"');
}


#[cfg(test)]
mod expression_tests {
    use crate::ast::{Comparison, Conjunction, LogicalExpression, Operator, Term, Value};
    use crate::compiler::ExpressionCompiler;

    fn expression(terms: Vec<(Conjunction, Term)>) -> LogicalExpression {
        LogicalExpression { terms }
    }

    fn compare(key: &str, operator: Operator, value: &str) -> Term {
        Term::Comparison(Comparison { key: key.to_string(), operator, value: Value::Word(value.to_string()) })
    }

    #[test]
    fn joins_terms() {
        let expr = expression(vec![
            (Conjunction::Implicit, compare("a", Operator::Match, "1")),
            (Conjunction::And, compare("b", Operator::GreaterThan, "2")),
            (Conjunction::Or, Term::Text("free".to_string())),
            (Conjunction::Implicit, compare("c", Operator::Equal, "3")),
        ]);

        assert_eq!("a:1 b:>2 OR free c:3", ExpressionCompiler::QUERY.compile(&expr));
    }

    #[test]
    fn escapes_per_context() {
        let expr = expression(vec![
            (Conjunction::Implicit, compare("url", Operator::Match, "http://x-y")),
            (Conjunction::Implicit, Term::Phrase(r#"say "hi" (now)"#.to_string())),
            (Conjunction::Implicit, Term::Comparison(Comparison {
                key: "author".to_string(),
                operator: Operator::Match,
                value: Value::Phrase("john".to_string()),
            })),
        ]);

        assert_eq!(r#"url:http:\/\/x\-y "say \"hi\" (now)" author:"john""#, ExpressionCompiler::QUERY.compile(&expr));
        assert_eq!(r#"url:http:\/\/x\-y "say \"hi\" (now)" author:"john""#, ExpressionCompiler::SUB_FILTER.compile(&expr));
    }

    #[test]
    fn groups_stay_literal() {
        let inner = expression(vec![
            (Conjunction::Implicit, compare("a", Operator::Match, "1")),
            (Conjunction::Or, compare("b", Operator::Match, "(2)")),
        ]);
        let expr = expression(vec![
            (Conjunction::Implicit, Term::Group(inner)),
            (Conjunction::Implicit, Term::Comparison(Comparison {
                key: "tags".to_string(),
                operator: Operator::Match,
                value: Value::Group(vec![
                    (Conjunction::Implicit, Value::Word("red".to_string())),
                    (Conjunction::Or, Value::Word("blue+green".to_string())),
                ]),
            })),
        ]);

        assert_eq!(r"(a:1 OR b:\(2\)) tags:(red OR blue\+green)", ExpressionCompiler::QUERY.compile(&expr));
        assert_eq!(r"(a:1 OR b:(2)) tags:(red OR blue\+green)", ExpressionCompiler::SUB_FILTER.compile(&expr));
    }

    #[test]
    fn words_stay_single_tokens() {
        let expr = expression(vec![
            (Conjunction::Implicit, compare("path", Operator::Match, "a b")),
            (Conjunction::Implicit, Term::Text("hello:world".to_string())),
            (Conjunction::Implicit, Term::Text("or".to_string())),
            (Conjunction::Implicit, Term::Comparison(Comparison {
                key: "tags".to_string(),
                operator: Operator::Match,
                value: Value::Group(vec![
                    (Conjunction::Implicit, Value::Word("AND".to_string())),
                    (Conjunction::Or, Value::Word("x y".to_string())),
                ]),
            })),
        ]);

        assert_eq!(r"path:a\ b hello\:world \or tags:(\AND OR x\ y)", ExpressionCompiler::QUERY.compile(&expr));
    }
}
