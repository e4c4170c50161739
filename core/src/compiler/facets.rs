use std::collections::BTreeMap;

use crate::ast::FacetSpec;
use crate::compiler::ExpressionCompiler;
use crate::dsl::{FacetDescriptor, FacetFilter, QueryString, TermsAggregation};

/// Expands `facets:[...]` entries into terms-aggregation descriptors
#[derive(Debug, Clone)]
pub struct FacetCompiler<'a> {
    pub aggregation_suffix: &'a str,
    pub size: usize,
}

impl FacetCompiler<'_> {
    pub fn compile(&self, facets: &BTreeMap<String, FacetSpec>) -> BTreeMap<String, FacetDescriptor> {
        facets.iter()
              .map(|(name, spec)| (name.clone(), self.compile_facet(spec)))
              .collect()
    }

    pub fn compile_facet(&self, spec: &FacetSpec) -> FacetDescriptor {
        let (nested_path, leaf_field) = spec.split_path();

        let facet_filter = spec.filter.as_ref().map(|filter| FacetFilter {
            query: QueryString::new(ExpressionCompiler::SUB_FILTER.compile(filter))
        });

        // only a filtered facet is scoped to its nested path
        let nested = match (&facet_filter, nested_path) {
            (Some(_), Some(path)) => Some(path.to_string()),
            _ => None,
        };

        FacetDescriptor {
            terms: TermsAggregation {
                field: format!("{}{}", leaf_field, self.aggregation_suffix),
                size: self.size,
            },
            facet_filter,
            nested,
        }
    }
}


#[cfg(test)]
mod facets_tests {
    use serde_json::json;

    use crate::ast::{Comparison, Conjunction, FacetSpec, LogicalExpression, Operator, Term, Value};
    use crate::compiler::FacetCompiler;

    fn filter(key: &str, value: &str) -> Option<LogicalExpression> {
        Some(LogicalExpression {
            terms: vec![(Conjunction::Implicit, Term::Comparison(Comparison {
                key: key.to_string(),
                operator: Operator::Match,
                value: Value::Word(value.to_string()),
            }))]
        })
    }

    #[test]
    fn plain_and_filtered() {
        let compiler = FacetCompiler { aggregation_suffix: "_nonngram", size: 20 };

        let color = compiler.compile_facet(&FacetSpec { name: "color".to_string(), filter: None });
        assert_eq!(json!({"terms": {"field": "color_nonngram", "size": 20}}), serde_json::to_value(&color).unwrap());

        let brand = compiler.compile_facet(&FacetSpec { name: "brand".to_string(), filter: filter("stock", "true") });
        assert_eq!(json!({
            "terms": {"field": "brand_nonngram", "size": 20},
            "facet_filter": {"query": {"query_string": {"query": "stock:true", "default_operator": "AND"}}}
        }), serde_json::to_value(&brand).unwrap());
    }

    #[test]
    fn dotted_names() {
        let compiler = FacetCompiler { aggregation_suffix: "_raw", size: 5 };

        // no filter, no nested scope
        let unfiltered = compiler.compile_facet(&FacetSpec { name: "comments.author".to_string(), filter: None });
        assert_eq!("author_raw", unfiltered.terms.field);
        assert_eq!(None, unfiltered.nested);

        let filtered = compiler.compile_facet(&FacetSpec { name: "a.b.author".to_string(), filter: filter("x", "y-z") });
        assert_eq!("author_raw", filtered.terms.field);
        assert_eq!(5, filtered.terms.size);
        assert_eq!(Some("a.b".to_string()), filtered.nested);
        assert_eq!(r"x:y\-z", filtered.facet_filter.unwrap().query.text());
    }
}
