#[allow(deprecated)]
use std::env::home_dir;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::de::DeserializeOwned;


/// Looks in the following places for the config file
/// - current directory
/// - user's directory
/// - /etc/
///
/// If it isn't found, returns the list of paths checked
pub fn find_config_file(config_file_name: &str) -> Result<PathBuf, Vec<PathBuf>> {
    #[allow(deprecated)]
    let user_dir = home_dir();

    let mut candidates = vec![PathBuf::from(config_file_name)];

    if let Some(user_dir) = user_dir {
        candidates.push(user_dir.join(config_file_name));
    }

    candidates.push(PathBuf::from("/etc/").join(config_file_name));

    match candidates.iter().find(|path| path.is_file()) {
        Some(path) => Ok(path.clone()),
        None => Err(candidates)
    }
}


/// Reads and deserializes a TOML config file
pub fn parse_config_file<T: DeserializeOwned>(config_file_path: &Path) -> anyhow::Result<T> {
    let toml_str = fs::read_to_string(config_file_path)
        .with_context(|| format!("Error reading config file: {}", config_file_path.display()))?;

    let config_file: T = toml::from_str(toml_str.as_str())
        .with_context(|| format!("Failed parsing config file: {}", config_file_path.display()))?;

    Ok(config_file)
}


#[cfg(test)]
mod config_utils_tests {
    use std::io::Write;

    use serde::Deserialize;
    use tempfile::NamedTempFile;

    use crate::common::config_utils::{find_config_file, parse_config_file};

    #[derive(Deserialize, Debug)]
    struct Sample {
        name: String,
    }

    #[test]
    fn missing_file_lists_checked_paths() {
        let checked = find_config_file("no-such-plasticparser-file.toml").unwrap_err();

        assert!(checked.len() >= 2);
        assert_eq!(std::path::PathBuf::from("/etc/no-such-plasticparser-file.toml"), *checked.last().unwrap());
    }

    #[test]
    fn parse_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "name = \"sample\"").unwrap();

        let sample: Sample = parse_config_file(file.path()).unwrap();
        assert_eq!("sample", sample.name);

        writeln!(file, "name = ").unwrap();
        assert!(parse_config_file::<Sample>(file.path()).is_err());
    }
}
