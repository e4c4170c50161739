//! Typed fragments produced by the grammar and consumed by the compilers
//!
//! All string payloads are literals: caller escapes have been resolved and
//! nothing has been escaped for the engine yet.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::error::QueryError;

/// How a term is joined to the one before it
#[derive(Serialize, Debug, Copy, Clone, PartialEq, Eq)]
pub enum Conjunction {
    /// Only whitespace separated the terms
    Implicit,
    And,
    Or,
}

impl Conjunction {
    /// Rendering between two terms
    ///
    /// AND is the engine's default operator, so an explicit AND renders the same
    /// as an implicit one; OR is always written upper-case whatever the input case.
    pub fn separator(&self) -> &'static str {
        match self {
            Conjunction::Implicit | Conjunction::And => " ",
            Conjunction::Or => " OR ",
        }
    }
}

#[derive(Serialize, Debug, Copy, Clone, PartialEq, Eq)]
pub enum Operator {
    Match,
    Equal,
    GreaterThan,
    LessThan,
    GreaterEqual,
    LessEqual,
}

impl Operator {
    /// The engine's form of the operator; equality collapses to the default match
    pub fn engine_form(&self) -> &'static str {
        match self {
            Operator::Match | Operator::Equal => ":",
            Operator::GreaterThan => ":>",
            Operator::LessThan => ":<",
            Operator::GreaterEqual => ":>=",
            Operator::LessEqual => ":<=",
        }
    }

    /// Operators that can become exact-match term filters
    pub fn is_equality(&self) -> bool {
        matches!(self, Operator::Match | Operator::Equal)
    }
}

impl TryFrom<&str> for Operator {
    type Error = QueryError;

    fn try_from(token: &str) -> Result<Self, Self::Error> {
        match token {
            ":" => Ok(Operator::Match),
            ":=" => Ok(Operator::Equal),
            ":>" => Ok(Operator::GreaterThan),
            ":<" => Ok(Operator::LessThan),
            ":>=" => Ok(Operator::GreaterEqual),
            ":<=" => Ok(Operator::LessEqual),
            _ => Err(QueryError::UnsupportedOperator(token.to_string()))
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let token = match self {
            Operator::Match => ":",
            Operator::Equal => ":=",
            _ => self.engine_form(),
        };

        write!(f, "{}", token)
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub enum Value {
    Word(String),
    /// Contents of a quoted phrase, without the delimiters
    Phrase(String),
    /// `field:(a OR b)`
    Group(Vec<(Conjunction, Value)>),
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Comparison {
    pub key: String,
    pub operator: Operator,
    pub value: Value,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub enum Term {
    Comparison(Comparison),
    Text(String),
    Phrase(String),
    Group(LogicalExpression),
}

/// A sequence of terms; the conjunction paired with the first term is ignored
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub struct LogicalExpression {
    pub terms: Vec<(Conjunction, Term)>,
}

impl LogicalExpression {
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn push(&mut self, conjunction: Conjunction, term: Term) {
        let conjunction = if self.terms.is_empty() { Conjunction::Implicit } else { conjunction };

        self.terms.push((conjunction, term));
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TypeClause {
    pub name: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct FacetSpec {
    pub name: String,
    pub filter: Option<LogicalExpression>,
}

impl FacetSpec {
    /// Splits `a.b.c` into the nested path `a.b` and leaf field `c`
    pub fn split_path(&self) -> (Option<&str>, &str) {
        match self.name.rsplit_once('.') {
            Some((path, leaf)) => (Some(path), leaf),
            None => (None, self.name.as_str()),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NestedSpec {
    pub path: String,
    pub query: LogicalExpression,
}

/// One top-level clause, in source order
#[derive(Serialize, Debug, Clone, PartialEq)]
pub enum Fragment {
    Type(TypeClause),
    /// A free-text term with the operator that joins it to the previous free-text term
    Query(Conjunction, Term),
    Facets(Vec<FacetSpec>),
    Nested(Vec<NestedSpec>),
}

/// Everything one query string parsed into
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ParsedQuery {
    /// The normalized query text
    pub query: String,
    pub type_clause: Option<TypeClause>,
    pub expression: LogicalExpression,
    pub nested: Vec<NestedSpec>,
    pub facets: BTreeMap<String, FacetSpec>,
}

impl ParsedQuery {
    /// Routes each fragment into its bucket; later facets with the same name win
    pub fn from_fragments(query: String, fragments: Vec<Fragment>) -> Self {
        let mut type_clause = None;
        let mut expression = LogicalExpression::default();
        let mut nested = Vec::new();
        let mut facets = BTreeMap::new();

        for fragment in fragments {
            match fragment {
                Fragment::Type(clause) => type_clause = Some(clause),
                Fragment::Query(conjunction, term) => expression.push(conjunction, term),
                Fragment::Facets(specs) => {
                    for spec in specs {
                        facets.insert(spec.name.clone(), spec);
                    }
                }
                Fragment::Nested(specs) => nested.extend(specs),
            }
        }

        ParsedQuery { query, type_clause, expression, nested, facets }
    }

    /// True when only free text was given
    pub fn is_text_only(&self) -> bool {
        self.type_clause.is_none() && self.nested.is_empty() && self.facets.is_empty()
    }
}


#[cfg(test)]
mod ast_tests {
    use crate::ast::{Conjunction, FacetSpec, Fragment, Operator, ParsedQuery, Term, TypeClause};
    use crate::QueryError;

    #[test]
    fn operator_tokens() {
        assert_eq!(Operator::Match, Operator::try_from(":").unwrap());
        assert_eq!(Operator::GreaterEqual, Operator::try_from(":>=").unwrap());
        assert_eq!(":", Operator::try_from(":=").unwrap().engine_form());
        assert_eq!(":<", Operator::LessThan.engine_form());

        match Operator::try_from(":<>") {
            Err(QueryError::UnsupportedOperator(op)) => assert_eq!(":<>", op),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn facet_paths() {
        let facet = FacetSpec { name: "comments.author.name".to_string(), filter: None };
        assert_eq!((Some("comments.author"), "name"), facet.split_path());

        let facet = FacetSpec { name: "color".to_string(), filter: None };
        assert_eq!((None, "color"), facet.split_path());
    }

    #[test]
    fn partition_fragments() {
        let fragments = vec![
            Fragment::Type(TypeClause { name: "article".to_string() }),
            Fragment::Query(Conjunction::Or, Term::Text("first".to_string())),
            Fragment::Facets(vec![
                FacetSpec { name: "color".to_string(), filter: None },
            ]),
            Fragment::Query(Conjunction::Or, Term::Text("second".to_string())),
            Fragment::Facets(vec![
                FacetSpec { name: "color".to_string(), filter: Some(Default::default()) },
            ]),
        ];

        let parsed = ParsedQuery::from_fragments("q".to_string(), fragments);

        assert_eq!(Some(TypeClause { name: "article".to_string() }), parsed.type_clause);
        assert_eq!(1, parsed.facets.len());
        assert!(parsed.facets["color"].filter.is_some());
        assert!(parsed.nested.is_empty());

        // the leading conjunction never survives
        assert_eq!(Conjunction::Implicit, parsed.expression.terms[0].0);
        assert_eq!(Conjunction::Or, parsed.expression.terms[1].0);
        assert!(!parsed.is_text_only());
    }
}
