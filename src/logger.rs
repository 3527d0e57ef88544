//! Logging setup for notion-habitica-sync.
//!
//! Log lines carry a timestamp, level, and target. Other crates are held at `warn`
//! while this crate logs at the configured level.

use anyhow::{Context, Result};
use log::LevelFilter;

use crate::config::LoggingConfig;

/// Parse a level name from the config file.
pub fn parse_level(level: &str) -> Result<LevelFilter> {
    level
        .trim()
        .parse::<LevelFilter>()
        .map_err(|_| anyhow::anyhow!("Invalid logging.level '{}': expected off, error, warn, info, debug or trace", level))
}

/// Build the log dispatcher: timestamped lines to stderr and optionally to a file.
pub fn dispatch(config: &LoggingConfig) -> Result<fern::Dispatch> {
    let level = parse_level(&config.level)?;

    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {:<5} {}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(LevelFilter::Warn)
        .level_for("notion_habitica_sync", level)
        .chain(std::io::stderr());

    if let Some(path) = &config.file {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
        }
        let file = fern::log_file(path).with_context(|| format!("Failed to open log file: {}", path.display()))?;
        dispatch = dispatch.chain(file);
    }

    Ok(dispatch)
}

/// Install the global logger. Call once, before anything logs.
pub fn init(config: &LoggingConfig) -> Result<()> {
    dispatch(config)?
        .apply()
        .map_err(|e| anyhow::anyhow!("Failed to install logger: {e}"))?;
    Ok(())
}
