//! Diagnostic file logging.
//!
//! The terminal belongs to the display, so all diagnostics go to an
//! append-only log file through a non-blocking writer. The returned guard
//! must be held until exit; dropping it flushes pending lines.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Environment variable that overrides the configured log filter.
pub const LOG_ENV: &str = "OCTODISPLAY_LOG";

/// Installs the global tracing subscriber writing to the configured log file.
///
/// # Errors
/// Returns an error if the log directory cannot be created, the filter is
/// invalid, or a global subscriber is already installed.
pub fn init(config: &Config) -> Result<WorkerGuard> {
    let path = config.log_path();
    let (dir, file_name) = split_log_path(&path)?;
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let directive = std::env::var(LOG_ENV).unwrap_or_else(|_| config.log_level.clone());
    let filter = filter_from(&directive)?;

    let appender = tracing_appender::rolling::never(&dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_thread_names(true)
        .try_init()
        .map_err(|e| anyhow!("Failed to install log subscriber: {e}"))?;

    Ok(guard)
}

fn filter_from(directive: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(directive).with_context(|| format!("Invalid log filter '{directive}'"))
}

fn split_log_path(path: &Path) -> Result<(PathBuf, &OsStr)> {
    let file_name = path
        .file_name()
        .with_context(|| format!("Log path has no file name: {}", path.display()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, file_name))
}
