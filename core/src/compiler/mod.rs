mod expression;
mod facets;
mod nested;

pub use expression::ExpressionCompiler;
pub use facets::FacetCompiler;
pub use nested::compile_nested;

#[allow(unused_imports)]
use crate::logging::{debug, error, info, warn};

use crate::ast::{Conjunction, ParsedQuery, Term, Value};
use crate::config::{OutputMode, TranslatorConfig};
use crate::dsl::{AndFilter, BoolFilter, FilterClause, Filtered, FlatQuery, QueryDsl, QueryString, RichQuery};
use crate::error::QueryError;
use crate::sanitizer::{escape, EscapeContext};

/// Builds the output document for `parsed` in the requested shape
pub fn assemble(parsed: &ParsedQuery, mode: OutputMode, config: &TranslatorConfig) -> Result<QueryDsl, QueryError> {
    let dsl = match mode {
        OutputMode::Rich => QueryDsl::Rich(assemble_rich(parsed, config)),
        OutputMode::Flat => QueryDsl::Flat(assemble_flat(parsed)?),
        OutputMode::Auto => {
            match flat_ineligibility(parsed) {
                None => QueryDsl::Flat(assemble_flat(parsed)?),
                Some(reason) => {
                    debug!("Using the rich output shape: {}", reason);
                    QueryDsl::Rich(assemble_rich(parsed, config))
                }
            }
        }
    };

    Ok(dsl)
}

/// Type clause first, then nested fragments; free text as query_string
pub fn assemble_rich(parsed: &ParsedQuery, config: &TranslatorConfig) -> RichQuery {
    let mut filter = BoolFilter::default();

    if let Some(type_clause) = &parsed.type_clause {
        filter.clauses.must.push(FilterClause::type_filter(&type_clause.name));
    }

    filter.clauses.must.extend(compile_nested(&parsed.nested));

    let text = ExpressionCompiler::QUERY.compile(&parsed.expression);
    let query = if text.is_empty() { None } else { Some(QueryString::new(text)) };

    let facet_compiler = FacetCompiler {
        aggregation_suffix: config.aggregation_suffix.as_str(),
        size: config.facet_size,
    };

    RichQuery {
        query: Filtered::new(filter, query),
        facets: facet_compiler.compile(&parsed.facets),
    }
}

/// One exact-match term filter per comparison
pub fn assemble_flat(parsed: &ParsedQuery) -> Result<FlatQuery, QueryError> {
    if let Some(reason) = flat_ineligibility(parsed) {
        return Err(QueryError::IncompatibleOutputMode(reason));
    }

    let mut and = Vec::with_capacity(parsed.expression.terms.len());

    for (_, term) in parsed.expression.terms.iter() {
        let comparison = match term {
            Term::Comparison(comparison) => comparison,
            _ => return Err(QueryError::IncompatibleOutputMode("expected a comparison".to_string()))
        };

        let literal = match &comparison.value {
            Value::Word(literal) | Value::Phrase(literal) => literal,
            Value::Group(_) => return Err(QueryError::IncompatibleOutputMode("value groups need a query_string".to_string()))
        };

        and.push(FilterClause::term(&comparison.key, escape(literal, EscapeContext::Term)));
    }

    Ok(FlatQuery { query: Filtered::new(AndFilter { and }, None) })
}

/// Why `parsed` cannot become a conjunction of term filters, if it can't
pub fn flat_ineligibility(parsed: &ParsedQuery) -> Option<String> {
    if parsed.type_clause.is_some() {
        return Some("type clauses need the rich shape".to_string());
    }

    if !parsed.facets.is_empty() {
        return Some("facets need the rich shape".to_string());
    }

    if !parsed.nested.is_empty() {
        return Some("nested queries need the rich shape".to_string());
    }

    if parsed.expression.is_empty() {
        return Some("there are no comparisons".to_string());
    }

    for (conjunction, term) in parsed.expression.terms.iter() {
        if *conjunction == Conjunction::Or {
            return Some("OR cannot be expressed as a conjunction".to_string());
        }

        match term {
            Term::Comparison(comparison) => {
                if !comparison.operator.is_equality() {
                    return Some(format!("{}{} is not an exact match", comparison.key, comparison.operator));
                }

                if let Value::Group(_) = comparison.value {
                    return Some(format!("{} compares against a group", comparison.key));
                }
            }
            Term::Group(_) => return Some("parenthetical groups need a query_string".to_string()),
            Term::Text(_) | Term::Phrase(_) => return Some("free text needs a query_string".to_string()),
        }
    }

    None
}
