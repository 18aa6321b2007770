//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP and crawling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Filesystem layout settings
    #[serde(default)]
    pub paths: PathsConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::config("crawler.user_agent is empty"));
        }
        if !self.crawler.base_url.starts_with("http") {
            return Err(AppError::config("crawler.base_url must be an http(s) URL"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::config("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.max_concurrent == 0 {
            return Err(AppError::config("crawler.max_concurrent must be > 0"));
        }
        if self.crawler.max_retries == 0 {
            return Err(AppError::config("crawler.max_retries must be > 0"));
        }
        if self.crawler.batch_size == 0 {
            return Err(AppError::config("crawler.batch_size must be > 0"));
        }
        Ok(())
    }
}

/// HTTP client and crawling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// Base URL of the module catalog
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Maximum concurrent detail requests
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Delay between requests per worker, in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Retry attempts per URL before the item is marked failed
    #[serde(default = "defaults::max_retries")]
    pub max_retries: u32,

    /// Base delay for exponential retry backoff, in milliseconds
    #[serde(default = "defaults::retry_base_delay")]
    pub retry_base_delay_ms: u64,

    /// Checkpoint is persisted after this many newly completed items
    #[serde(default = "defaults::batch_size")]
    pub batch_size: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_concurrent: defaults::max_concurrent(),
            request_delay_ms: defaults::request_delay(),
            max_retries: defaults::max_retries(),
            retry_base_delay_ms: defaults::retry_base_delay(),
            batch_size: defaults::batch_size(),
        }
    }
}

/// Filesystem layout settings, relative to the data directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// File name of the current snapshot
    #[serde(default = "defaults::snapshot_file")]
    pub snapshot_file: String,

    /// Directory for dated snapshot backups
    #[serde(default = "defaults::backup_dir")]
    pub backup_dir: String,

    /// File name of the crawl checkpoint
    #[serde(default = "defaults::checkpoint_file")]
    pub checkpoint_file: String,
}

impl PathsConfig {
    /// Full path of the current snapshot file under `root`.
    pub fn snapshot_path(&self, root: &Path) -> PathBuf {
        root.join(&self.snapshot_file)
    }

    /// Full path of the backup directory under `root`.
    pub fn backup_path(&self, root: &Path) -> PathBuf {
        root.join(&self.backup_dir)
    }

    /// Full path of the checkpoint file under `root`.
    pub fn checkpoint_path(&self, root: &Path) -> PathBuf {
        root.join(&self.checkpoint_file)
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            snapshot_file: defaults::snapshot_file(),
            backup_dir: defaults::backup_dir(),
            checkpoint_file: defaults::checkpoint_file(),
        }
    }
}

/// Default values for configuration fields.
mod defaults {
    pub fn base_url() -> String {
        "https://www.modulbaukasten.ch".to_string()
    }

    pub fn user_agent() -> String {
        format!("modcrawl/{}", env!("CARGO_PKG_VERSION"))
    }

    pub fn timeout() -> u64 {
        30
    }

    pub fn max_concurrent() -> usize {
        5
    }

    pub fn request_delay() -> u64 {
        1000
    }

    pub fn max_retries() -> u32 {
        3
    }

    pub fn retry_base_delay() -> u64 {
        2000
    }

    pub fn batch_size() -> usize {
        50
    }

    pub fn snapshot_file() -> String {
        "module-master.json".to_string()
    }

    pub fn backup_dir() -> String {
        "backups".to_string()
    }

    pub fn checkpoint_file() -> String {
        ".crawl-checkpoint.json".to_string()
    }
}
