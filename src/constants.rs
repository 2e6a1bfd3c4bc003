//! Constants used throughout the crate
//!
//! Defaults, file names and environment variables live here so the
//! configuration and repository layers agree on them.

// Pagination defaults
/// Rows per page when a caller passes 0
pub const DEFAULT_PER_PAGE: u64 = 10;
/// Query-string parameter carrying the page number
pub const DEFAULT_PAGE_NAME: &str = "p";

// Database defaults
pub const DEFAULT_DATABASE_URL: &str = "sqlite::memory:";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 4;
pub const DEFAULT_MIN_CONNECTIONS: u32 = 1;

// Configuration lookup
pub const CONFIG_FILE_NAME: &str = "baserepo.toml";
pub const CONFIG_DIR_NAME: &str = "baserepo";

/// Environment variable that turns on the statement log for every repository
pub const DEBUG_ENV_VAR: &str = "APP_DEBUG";

// Logging
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const LOG_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";
