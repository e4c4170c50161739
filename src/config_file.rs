use std::path::PathBuf;

use anyhow::bail;
use serde::{Serialize, Deserialize};

use plasticparser_core::logging::parse_level;
use plasticparser_core::TranslatorConfig;


#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct ConfigFile {
    #[serde(default)]
    pub globals: Globals,

    #[serde(default)]
    pub translator: TranslatorConfig,
}

impl ConfigFile {
    /// Sanity checks the configuration file, and optionally prints it
    pub fn sanity_check(&self, print_config: bool) -> anyhow::Result<()> {
        if let Some(log_file) = &self.globals.log_file {
            if log_file.is_dir() {
                bail!("The log_file {} is a directory", log_file.display());
            }
        }

        if let Some(level) = &self.globals.log_level {
            if parse_level(level).is_none() {
                bail!("Unknown log_level {}; expected one of: trace, debug, info, warn, error", level);
            }
        }

        self.translator.sanity_check()?;

        if print_config {
            println!("{}", toml::to_string_pretty(self)?);
        }

        Ok( () )
    }
}

#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct Globals {
    pub log_file: Option<PathBuf>,

    /// Overridden by --debug
    pub log_level: Option<String>,
}
