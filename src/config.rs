// src/config.rs

//! Configuration loading utilities.
//!
//! Thin helpers around [`Config`] for the common "data dir with a
//! config.toml inside" layout used by the CLI.

use std::path::Path;

use crate::error::Result;
use crate::models::Config;

/// Name of the configuration file inside the data directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Load the configuration from `{data_dir}/config.toml`, falling back to
/// defaults with a logged warning when the file is missing or invalid.
pub fn load_from_data_dir(data_dir: &Path) -> Config {
    Config::load_or_default(data_dir.join(CONFIG_FILE))
}

/// Load and validate the configuration, failing on invalid values.
pub fn load_validated(data_dir: &Path) -> Result<Config> {
    let config = load_from_data_dir(data_dir);
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_falls_back_to_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_from_data_dir(tmp.path());
        assert_eq!(config.crawler.max_concurrent, 5);
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            "[crawler]\nmax_concurrent = 9\n",
        )
        .unwrap();
        let config = load_from_data_dir(tmp.path());
        assert_eq!(config.crawler.max_concurrent, 9);
    }

    #[test]
    fn test_invalid_values_rejected_by_validation() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "[crawler]\nbatch_size = 0\n").unwrap();
        assert!(load_validated(tmp.path()).is_err());
    }
}
