use lazy_static::lazy_static;
use serde_json::Value as JsonValue;

#[allow(unused_imports)]
use crate::logging::{debug, error, info, warn};

use crate::ast::ParsedQuery;
use crate::compiler::assemble;
use crate::config::{OutputMode, TranslatorConfig};
use crate::dsl::QueryDsl;
use crate::error::QueryError;
use crate::query_parser::{check_limits, normalize, parse_query, ParseLimits};

lazy_static! {
    static ref DEFAULT_TRANSLATOR: Translator = Translator::default();
}

/// Turns query strings into filtered-query documents
///
/// A translator holds no state besides its configuration, so one instance can
/// be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct Translator {
    config: TranslatorConfig,
}

impl Translator {
    pub fn new(config: TranslatorConfig) -> anyhow::Result<Self> {
        config.sanity_check()?;

        Ok(Translator { config })
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    fn limits(&self) -> ParseLimits {
        ParseLimits {
            max_length: self.config.max_query_length,
            max_depth: self.config.max_nesting_depth,
        }
    }

    /// Normalizes, checks limits, then parses `query`
    pub fn parse(&self, query: &str) -> Result<ParsedQuery, QueryError> {
        let query = normalize(query)?;

        check_limits(&query, self.limits())?;

        parse_query(&query)
    }

    /// Translates using the configured output mode
    pub fn translate(&self, query: &str) -> Result<QueryDsl, QueryError> {
        self.translate_with_mode(query, self.config.output_mode)
    }

    pub fn translate_with_mode(&self, query: &str, mode: OutputMode) -> Result<QueryDsl, QueryError> {
        let parsed = self.parse(query)?;
        let dsl = assemble(&parsed, mode, &self.config)?;

        debug!("Translated {:?} in {} mode", parsed.query, mode);

        Ok(dsl)
    }
}

/// Translates `query` with the default configuration, straight to JSON
pub fn get_query_dsl(query: &str) -> Result<JsonValue, QueryError> {
    Ok(DEFAULT_TRANSLATOR.translate(query)?.to_json()?)
}
