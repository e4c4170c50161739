//! The filtered-query documents sent to the search engine

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A translated query in one of the two output shapes
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum QueryDsl {
    Rich(RichQuery),
    Flat(FlatQuery),
}

impl QueryDsl {
    pub fn to_json(&self) -> Result<JsonValue, serde_json::Error> {
        serde_json::to_value(self)
    }

    pub fn as_rich(&self) -> Option<&RichQuery> {
        match self {
            QueryDsl::Rich(rich) => Some(rich),
            QueryDsl::Flat(_) => None,
        }
    }

    pub fn as_flat(&self) -> Option<&FlatQuery> {
        match self {
            QueryDsl::Flat(flat) => Some(flat),
            QueryDsl::Rich(_) => None,
        }
    }
}

/// Bool filter, optional query_string and facets
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RichQuery {
    pub query: Filtered<BoolFilter>,
    pub facets: BTreeMap<String, FacetDescriptor>,
}

/// A plain conjunction of term filters
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FlatQuery {
    pub query: Filtered<AndFilter>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Filtered<F> {
    pub filtered: FilteredBody<F>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FilteredBody<F> {
    pub filter: F,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<QueryString>,
}

impl<F> Filtered<F> {
    pub fn new(filter: F, query: Option<QueryString>) -> Self {
        Filtered { filtered: FilteredBody { filter, query } }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct BoolFilter {
    #[serde(rename = "bool")]
    pub clauses: BoolClauses,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct BoolClauses {
    pub must: Vec<FilterClause>,
    pub should: Vec<FilterClause>,
    pub must_not: Vec<FilterClause>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AndFilter {
    pub and: Vec<FilterClause>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum FilterClause {
    Type(TypeFilter),
    Nested(NestedFilter),
    Term(TermFilter),
}

impl FilterClause {
    pub fn type_filter(name: &str) -> Self {
        FilterClause::Type(TypeFilter { type_value: TypeValue { value: name.to_string() } })
    }

    pub fn nested(path: &str, query: String) -> Self {
        FilterClause::Nested(NestedFilter {
            nested: NestedQuery { path: path.to_string(), query: QueryString::new(query) }
        })
    }

    pub fn term(key: &str, value: String) -> Self {
        let mut term = BTreeMap::new();
        term.insert(key.to_string(), value);

        FilterClause::Term(TermFilter { term })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TypeFilter {
    #[serde(rename = "type")]
    pub type_value: TypeValue,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TypeValue {
    pub value: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NestedFilter {
    pub nested: NestedQuery,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NestedQuery {
    pub path: String,
    pub query: QueryString,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TermFilter {
    pub term: BTreeMap<String, String>,
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum DefaultOperator {
    #[default]
    #[serde(rename = "AND")]
    And,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct QueryString {
    pub query_string: QueryStringBody,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct QueryStringBody {
    pub query: String,
    pub default_operator: DefaultOperator,
}

impl QueryString {
    pub fn new(query: String) -> Self {
        QueryString { query_string: QueryStringBody { query, default_operator: DefaultOperator::And } }
    }

    pub fn text(&self) -> &str {
        self.query_string.query.as_str()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FacetDescriptor {
    pub terms: TermsAggregation,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facet_filter: Option<FacetFilter>,

    /// Set only when the facet is both dotted and filtered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TermsAggregation {
    pub field: String,
    pub size: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FacetFilter {
    pub query: QueryString,
}
