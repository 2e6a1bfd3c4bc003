//! Configuration management for baserepo
//!
//! This module handles loading, parsing, and validation of configuration files.

use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEBUG_ENV_VAR, DEFAULT_DATABASE_URL, DEFAULT_LOG_LEVEL, DEFAULT_MAX_CONNECTIONS,
    DEFAULT_MIN_CONNECTIONS, DEFAULT_PAGE_NAME, DEFAULT_PER_PAGE,
};
use anyhow::{Context, Result};
use log::LevelFilter;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Process-wide debug flag, read once from `APP_DEBUG`.
static APP_DEBUG: Lazy<bool> = Lazy::new(|| {
    std::env::var(DEBUG_ENV_VAR)
        .map(|value| parse_flag(&value))
        .unwrap_or(false)
});

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Whether `APP_DEBUG` was set when the process first asked.
pub fn debug_from_env() -> bool {
    *APP_DEBUG
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub repository: RepositoryConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

/// Repository behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Record executed statements (see `Repository::sql_dump`)
    pub debug: bool,
    /// Rows per page when `paginate` is called with 0
    pub per_page: u64,
    /// Query-string parameter carrying the page number
    pub page_name: String,
}

/// Database connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Connection URL, e.g. `sqlite::memory:` or `sqlite://data.db?mode=rwc`
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Let sqlx log every statement through the `log` facade
    pub sqlx_logging: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Enable logging
    pub enabled: bool,
    /// Maximum level: off, error, warn, info, debug or trace
    pub level: String,
    /// Write to this file instead of stderr
    pub file: Option<PathBuf>,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            debug: false,
            per_page: DEFAULT_PER_PAGE,
            page_name: DEFAULT_PAGE_NAME.to_string(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            sqlx_logging: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: DEFAULT_LOG_LEVEL.to_string(),
            file: None,
        }
    }
}

impl RepositoryConfig {
    /// Debug mode from the config or from `APP_DEBUG`
    pub fn debug_enabled(&self) -> bool {
        self.debug || debug_from_env()
    }
}

impl DatabaseConfig {
    /// Whether the URL points at an in-memory SQLite database
    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }
}

impl LoggingConfig {
    /// Parse the configured level
    pub fn level_filter(&self) -> Result<LevelFilter> {
        LevelFilter::from_str(self.level.trim()).map_err(|_| anyhow::anyhow!("Invalid log level '{}'", self.level))
    }
}

impl Config {
    /// Load configuration from file or return defaults
    pub fn load() -> Result<Self> {
        let config_path = Self::find_config_file()?;

        if let Some(path) = config_path {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Find configuration file in order of precedence
    fn find_config_file() -> Result<Option<PathBuf>> {
        // 1. Check current directory
        let current_dir_config = PathBuf::from(CONFIG_FILE_NAME);
        if current_dir_config.exists() {
            return Ok(Some(current_dir_config));
        }

        // 2. Check XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join(CONFIG_DIR_NAME).join("config.toml");
            if xdg_config.exists() {
                return Ok(Some(xdg_config));
            }
        }

        Ok(None)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        // Validate pagination
        if self.repository.per_page == 0 {
            anyhow::bail!("per_page must be at least 1");
        }

        let page_name = &self.repository.page_name;
        if page_name.is_empty() {
            anyhow::bail!("page_name cannot be empty");
        }
        if !page_name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            anyhow::bail!("page_name '{}' must only contain letters, digits, '_' or '-'", page_name);
        }

        // Validate database settings
        if self.database.url.trim().is_empty() {
            anyhow::bail!("database url cannot be empty");
        }
        if self.database.max_connections == 0 {
            anyhow::bail!("max_connections must be at least 1");
        }
        if self.database.min_connections > self.database.max_connections {
            anyhow::bail!(
                "min_connections ({}) cannot exceed max_connections ({})",
                self.database.min_connections,
                self.database.max_connections
            );
        }

        // Validate logging
        self.logging.level_filter()?;

        Ok(())
    }
}
