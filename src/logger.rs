//! Logging setup.
//!
//! Everything in the crate logs through the `log` facade; [`init`] installs a
//! `fern` dispatcher that writes to stderr or to a log file.

use crate::config::LoggingConfig;
use crate::constants::LOG_TIMESTAMP_FORMAT;
use anyhow::{Context, Result};
use chrono::Local;
use log::LevelFilter;

/// Install the global logger described by `config`.
///
/// Does nothing when logging is disabled. Fails if a global logger is
/// already installed.
pub fn init(config: &LoggingConfig) -> Result<()> {
    if !config.enabled {
        return Ok(());
    }

    let dispatch = dispatch(config.level_filter()?);
    let dispatch = match &config.file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
            }
            let file = fern::log_file(path).with_context(|| format!("Failed to open log file: {}", path.display()))?;
            dispatch.chain(file)
        }
        None => dispatch.chain(std::io::stderr()),
    };

    dispatch.apply().context("A global logger is already installed")?;
    log::info!("Logging initialised");
    Ok(())
}

/// Formatter and level filters shared by every output.
///
/// sqlx and sea-orm are capped at `warn` unless the configured level is
/// `trace`, so statement logging does not drown repository output.
pub fn dispatch(level: LevelFilter) -> fern::Dispatch {
    let library_level = if level == LevelFilter::Trace { level } else { level.min(LevelFilter::Warn) };

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {:<5} {}] {}",
                Local::now().format(LOG_TIMESTAMP_FORMAT),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .level_for("sqlx", library_level)
        .level_for("sea_orm", library_level)
}
