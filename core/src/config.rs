use std::fmt::{Display, Formatter};
use std::str::FromStr;

use anyhow::{anyhow, bail};
use serde::{Deserialize, Serialize};

#[allow(unused_imports)]
use crate::logging::{debug, error, info, warn};

/// Which document shape a translation produces
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Bool filter with type/nested clauses, query_string and facets
    #[default]
    Rich,
    /// One term filter per comparison; fails on anything richer
    Flat,
    /// Flat when the query is a plain conjunction of equality comparisons, rich otherwise
    Auto,
}

impl Display for OutputMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputMode::Rich => write!(f, "rich"),
            OutputMode::Flat => write!(f, "flat"),
            OutputMode::Auto => write!(f, "auto"),
        }
    }
}

impl FromStr for OutputMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rich" => Ok(OutputMode::Rich),
            "flat" => Ok(OutputMode::Flat),
            "auto" => Ok(OutputMode::Auto),
            _ => Err(anyhow!("Unknown output mode '{}'; expected one of: rich, flat, auto", s))
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TranslatorConfig {
    #[serde(default)]
    pub output_mode: OutputMode,

    /// Appended to a facet's leaf field to pick the field variant that is aggregated
    #[serde(default = "default_aggregation_suffix")]
    pub aggregation_suffix: String,

    /// Number of buckets returned per facet
    #[serde(default = "default_facet_size")]
    pub facet_size: usize,

    /// In bytes, measured after whitespace normalization
    #[serde(default = "default_max_query_length")]
    pub max_query_length: usize,

    /// Parentheses and brackets combined
    #[serde(default = "default_max_nesting_depth")]
    pub max_nesting_depth: usize,
}

pub fn default_aggregation_suffix() -> String {
    "_nonngram".to_string()
}

pub const fn default_facet_size() -> usize { 20 }

pub const fn default_max_query_length() -> usize { 4096 }

pub const fn default_max_nesting_depth() -> usize { 8 }

impl Default for TranslatorConfig {
    fn default() -> Self {
        TranslatorConfig {
            output_mode: OutputMode::default(),
            aggregation_suffix: default_aggregation_suffix(),
            facet_size: default_facet_size(),
            max_query_length: default_max_query_length(),
            max_nesting_depth: default_max_nesting_depth(),
        }
    }
}

impl TranslatorConfig {
    pub fn sanity_check(&self) -> anyhow::Result<()> {
        debug!("{:?}", self);

        if self.facet_size == 0 {
            bail!("Cannot set facet_size to zero");
        }

        if self.max_query_length == 0 {
            bail!("Cannot set max_query_length to zero");
        }

        // a facet with an inline filter already needs two levels
        if self.max_nesting_depth < 2 {
            bail!("max_nesting_depth must be at least 2, found {}", self.max_nesting_depth);
        }

        if self.aggregation_suffix.chars().any(|c| c.is_whitespace()) {
            bail!("The aggregation_suffix '{}' cannot contain whitespace", self.aggregation_suffix);
        }

        Ok( () )
    }
}


#[cfg(test)]
mod config_tests {
    use crate::config::{OutputMode, TranslatorConfig};

    #[test]
    fn defaults() {
        let config = TranslatorConfig::default();

        assert_eq!(OutputMode::Rich, config.output_mode);
        assert_eq!("_nonngram", config.aggregation_suffix);
        assert_eq!(20, config.facet_size);
        assert!(config.sanity_check().is_ok());
    }

    #[test]
    fn from_toml() {
        let config: TranslatorConfig = toml::from_str(r#"
            output_mode = "auto"
            facet_size = 50
        "#).unwrap();

        assert_eq!(OutputMode::Auto, config.output_mode);
        assert_eq!(50, config.facet_size);
        assert_eq!("_nonngram", config.aggregation_suffix);

        let config: TranslatorConfig = toml::from_str("").unwrap();
        assert_eq!(TranslatorConfig::default(), config);
    }

    #[test]
    fn rejects_bad_values() {
        let config = TranslatorConfig { facet_size: 0, ..Default::default() };
        assert!(config.sanity_check().is_err());

        let config = TranslatorConfig { max_nesting_depth: 1, ..Default::default() };
        assert!(config.sanity_check().is_err());

        let config = TranslatorConfig { aggregation_suffix: "_non ngram".to_string(), ..Default::default() };
        assert!(config.sanity_check().is_err());

        // an empty suffix aggregates on the field itself
        let config = TranslatorConfig { aggregation_suffix: String::new(), ..Default::default() };
        assert!(config.sanity_check().is_ok());
    }

    #[test]
    fn mode_names() {
        assert_eq!(OutputMode::Flat, "FLAT".parse::<OutputMode>().unwrap());
        assert_eq!("auto", OutputMode::Auto.to_string());
        assert!("fancy".parse::<OutputMode>().is_err());
    }
}
