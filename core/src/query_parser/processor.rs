use pest::iterators::Pair;

#[allow(unused_imports)]
use crate::logging::{debug, error, info, warn};

use crate::ast::{
    Comparison, Conjunction, FacetSpec, Fragment, LogicalExpression, NestedSpec, Operator,
    ParsedQuery, Term, TypeClause, Value,
};
use crate::error::{missing_token, QueryError};
use crate::query_parser::Rule;
use crate::sanitizer::unescape;

/// Field name that is only allowed as the leading type clause
const TYPE_KEY: &str = "type";

impl ParsedQuery {
    /// Walks the `query` pair into fragments, then partitions them
    pub fn new(query_pair: Pair<Rule>) -> Result<Self, QueryError> {
        let query = query_pair.as_str().to_string();
        let fragments = process_query(query_pair)?;

        debug!("Parsed {} fragments from: {}", fragments.len(), query);

        Ok(ParsedQuery::from_fragments(query, fragments))
    }
}

/// Converts the top-level pairs into fragments, in source order
///
/// The conjunction attached to each free-text fragment is the last explicit
/// operator seen since the previous free-text fragment, so operators that sat
/// next to a facets or nested clause don't leak into the text.
fn process_query(pair: Pair<Rule>) -> Result<Vec<Fragment>, QueryError> {
    let mut fragments = Vec::new();
    let mut pending = Conjunction::Implicit;

    for next_pair in pair.into_inner() {
        match next_pair.as_rule() {
            Rule::type_clause => {
                let name = next_pair.into_inner()
                                   .next()
                                   .ok_or(missing_token("type_name"))?
                                   .as_str()
                                   .to_string();

                fragments.push(Fragment::Type(TypeClause { name }));
            }
            Rule::and_op => pending = Conjunction::And,
            Rule::or_op => pending = Conjunction::Or,
            Rule::facets => {
                let facets = next_pair.into_inner().map(process_facet).collect::<Result<Vec<_>, _>>()?;
                fragments.push(Fragment::Facets(facets));
            }
            Rule::nested => {
                let nested = next_pair.into_inner().map(process_nested_entry).collect::<Result<Vec<_>, _>>()?;
                fragments.push(Fragment::Nested(nested));
            }
            Rule::group | Rule::comparison | Rule::phrase | Rule::text_word => {
                if next_pair.as_rule() == Rule::comparison {
                    reject_type_comparison(&next_pair)?;
                }

                fragments.push(Fragment::Query(pending, process_term(next_pair)?));
                pending = Conjunction::Implicit;
            }
            Rule::EOI => break,
            _ => return Err(QueryError::UnexpectedRule(next_pair.as_rule()))
        }
    }

    Ok(fragments)
}

/// A `type:` comparison anywhere but the leading clause is an error
fn reject_type_comparison(pair: &Pair<Rule>) -> Result<(), QueryError> {
    let key = pair.clone().into_inner().next().ok_or(missing_token("key"))?;

    if key.as_str() == TYPE_KEY {
        return Err(QueryError::Parse {
            position: pair.as_span().start(),
            message: format!("the type clause must be the first clause and alphanumeric, found: {}", pair.as_str()),
        });
    }

    Ok(())
}

/// Converts an `expression` pair into its terms
pub(crate) fn process_expression(pair: Pair<Rule>) -> Result<LogicalExpression, QueryError> {
    let mut expression = LogicalExpression::default();
    let mut pending = Conjunction::Implicit;

    for next_pair in pair.into_inner() {
        match next_pair.as_rule() {
            Rule::and_op => pending = Conjunction::And,
            Rule::or_op => pending = Conjunction::Or,
            _ => {
                expression.push(pending, process_term(next_pair)?);
                pending = Conjunction::Implicit;
            }
        }
    }

    if expression.is_empty() {
        return Err(missing_token("term"));
    }

    Ok(expression)
}

fn process_term(pair: Pair<Rule>) -> Result<Term, QueryError> {
    Ok(match pair.as_rule() {
        Rule::group => {
            let inner = pair.into_inner().next().ok_or(missing_token("expression"))?;
            Term::Group(process_expression(inner)?)
        }
        Rule::comparison => Term::Comparison(process_comparison(pair)?),
        Rule::phrase => Term::Phrase(phrase_literal(pair.as_str())),
        Rule::text_word => Term::Text(unescape(pair.as_str())),
        _ => return Err(QueryError::UnexpectedRule(pair.as_rule()))
    })
}

fn process_comparison(pair: Pair<Rule>) -> Result<Comparison, QueryError> {
    let mut pairs = pair.into_inner();

    // always key, operator, value
    let key = pairs.next().ok_or(missing_token("key"))?.as_str().to_string();
    let operator = Operator::try_from(pairs.next().ok_or(missing_token("operator"))?.as_str())?;
    let value = process_value(pairs.next().ok_or(missing_token("phrase | value_group | value_word"))?)?;

    Ok(Comparison { key, operator, value })
}

fn process_value(pair: Pair<Rule>) -> Result<Value, QueryError> {
    Ok(match pair.as_rule() {
        Rule::phrase => Value::Phrase(phrase_literal(pair.as_str())),
        Rule::value_word | Rule::group_word => Value::Word(unescape(pair.as_str())),
        Rule::value_group => {
            let mut members = Vec::new();
            let mut pending = Conjunction::Implicit;

            for member in pair.into_inner() {
                match member.as_rule() {
                    Rule::and_op => pending = Conjunction::And,
                    Rule::or_op => pending = Conjunction::Or,
                    _ => {
                        let conjunction = if members.is_empty() { Conjunction::Implicit } else { pending };
                        members.push((conjunction, process_value(member)?));
                        pending = Conjunction::Implicit;
                    }
                }
            }

            Value::Group(members)
        }
        _ => return Err(QueryError::UnexpectedRule(pair.as_rule()))
    })
}

fn process_facet(pair: Pair<Rule>) -> Result<FacetSpec, QueryError> {
    let mut pairs = pair.into_inner();

    let name = pairs.next().ok_or(missing_token("field_path"))?.as_str().to_string();
    let filter = pairs.next().map(process_expression).transpose()?;

    Ok(FacetSpec { name, filter })
}

fn process_nested_entry(pair: Pair<Rule>) -> Result<NestedSpec, QueryError> {
    let mut pairs = pair.into_inner();

    let path = pairs.next().ok_or(missing_token("field_path"))?.as_str().to_string();
    let query = process_expression(pairs.next().ok_or(missing_token("expression"))?)?;

    Ok(NestedSpec { path, query })
}

/// Strips the delimiters off a phrase and resolves its escapes
fn phrase_literal(phrase: &str) -> String {
    let inner = phrase.strip_prefix('"')
                      .and_then(|p| p.strip_suffix('"'))
                      .unwrap_or(phrase);

    unescape(inner)
}
