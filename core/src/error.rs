use thiserror::Error;

use crate::query_parser::Rule;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Parse error at position {position}: {message}")]
    Parse { position: usize, message: String },

    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),

    #[error("Unsupported character {character:?} at position {position}")]
    Encoding { position: usize, character: char },

    #[error("Query is {length} bytes long; the limit is {max}")]
    QueryTooLong { length: usize, max: usize },

    #[error("Query nests {depth} levels deep; the limit is {max}")]
    NestingTooDeep { depth: usize, max: usize },

    #[error("Query cannot be expressed as term filters: {0}")]
    IncompatibleOutputMode(String),

    #[error("Expected token: {0}")]
    UnexpectedMissingToken(String),

    #[error("Unexpected rule: {0:?}")]
    UnexpectedRule(Rule),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl QueryError {
    /// True for every failure caused by the query text itself
    pub fn is_parse_error(&self) -> bool {
        matches!(self,
            QueryError::Parse { .. } | QueryError::QueryTooLong { .. } | QueryError::NestingTooDeep { .. })
    }
}

impl From<pest::error::Error<Rule>> for QueryError {
    fn from(e: pest::error::Error<Rule>) -> Self {
        let position = match e.location {
            pest::error::InputLocation::Pos(pos) => pos,
            pest::error::InputLocation::Span((start, _)) => start,
        };

        QueryError::Parse { position, message: e.variant.message().to_string() }
    }
}

pub(crate) fn missing_token(token: &str) -> QueryError {
    QueryError::UnexpectedMissingToken(token.to_string())
}
