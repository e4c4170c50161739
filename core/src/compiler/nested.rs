use crate::ast::NestedSpec;
use crate::compiler::ExpressionCompiler;
use crate::dsl::FilterClause;

/// Turns each `nested:[path(...)]` entry into a nested query_string filter
pub fn compile_nested(nested: &[NestedSpec]) -> Vec<FilterClause> {
    nested.iter()
          .map(|spec| FilterClause::nested(&spec.path, ExpressionCompiler::SUB_FILTER.compile(&spec.query)))
          .collect()
}
