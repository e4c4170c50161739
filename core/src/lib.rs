//! Translates a small search query language into filtered-query JSON documents
//!
//! ```
//! let dsl = plasticparser_core::get_query_dsl("title:hello facets:[color]").unwrap();
//!
//! assert_eq!("title:hello", dsl["query"]["filtered"]["query"]["query_string"]["query"]);
//! ```

pub mod ast;
pub mod compiler;
pub mod config;
pub mod dsl;
pub mod error;
pub mod logging;
pub mod query_parser;
pub mod sanitizer;
pub mod translator;

#[cfg(test)]
mod test_utils;

pub use crate::ast::ParsedQuery;
pub use crate::config::{OutputMode, TranslatorConfig};
pub use crate::dsl::QueryDsl;
pub use crate::error::QueryError;
pub use crate::logging::init_test_logger;
pub use crate::query_parser::Rule;
pub use crate::sanitizer::{escape, escape_phrase, escape_text, escape_word, unescape, EscapeContext};
pub use crate::translator::{get_query_dsl, Translator};
