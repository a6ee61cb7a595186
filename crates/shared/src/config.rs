//! Configuration management for the cover importer.
//!
//! Configuration is loaded from a TOML file. Every setting has a default, and
//! a missing file is not an error: the defaults describe the standard setup
//! (local catalog service, polite delays towards the source sites).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Catalog service settings
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// HTTP session settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Mangadex source settings
    #[serde(default)]
    pub mangadex: MangadexConfig,

    /// MyAnimeList source settings
    #[serde(default)]
    pub mal: MalConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Catalog service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Base URL of the catalog HTTP API
    pub base_url: String,
}

/// HTTP session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Maximum retries for GET requests failing at the connection level
    pub max_retries: u32,

    /// Base retry delay in milliseconds (doubled on every attempt)
    pub retry_delay_ms: u64,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

/// Mangadex source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MangadexConfig {
    /// Delay between two image downloads of the same item
    pub image_delay_secs: u64,

    /// Delay between two items
    pub item_delay_secs: u64,
}

/// MyAnimeList source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MalConfig {
    /// Site root used to build detail page URLs
    pub base_url: String,

    /// Delay between two items
    pub item_delay_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log directory path
    pub log_dir: String,

    /// Default log level (trace, debug, info, warn, error)
    pub default_level: String,

    /// Enable console output
    pub console: bool,

    /// Enable file output
    pub file: bool,

    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8088".to_string(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 5,
            retry_delay_ms: 500,
            user_agent: concat!("cover-importer/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for MangadexConfig {
    fn default() -> Self {
        Self {
            image_delay_secs: 3,
            item_delay_secs: 10,
        }
    }
}

impl Default for MalConfig {
    fn default() -> Self {
        Self {
            base_url: "https://myanimelist.net".to_string(),
            item_delay_secs: 5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            default_level: "info".to_string(),
            console: true,
            file: false,
            json_format: false,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// If the file doesn't exist, returns the default configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Config file not found, using defaults"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration saved successfully"
        );

        Ok(())
    }
}
