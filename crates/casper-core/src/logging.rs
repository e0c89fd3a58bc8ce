//! Tracing subscriber setup.
//!
//! The login screen owns the terminal while it runs, so interactive hosts log
//! to a file (`init_to_file`); headless hosts can log to stderr (`init`).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub const LOG_FILE_NAME: &str = "casper-login.log";

/// Installs a global subscriber writing to stderr.
///
/// `RUST_LOG` wins when set; otherwise `level` (from config) is used, falling
/// back to `info`.
///
/// # Errors
/// Returns an error if a global subscriber is already installed.
pub fn init(level: Option<&str>) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(env_filter(level))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {e}"))
}

/// Installs a global subscriber appending to `<dir>/casper-login.log`.
///
/// Keep the returned guard alive until exit so buffered lines are flushed.
///
/// # Errors
/// Returns an error if the directory cannot be created or a global subscriber
/// is already installed.
pub fn init_to_file(level: Option<&str>, dir: &Path) -> Result<WorkerGuard> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    let appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer),
        )
        .with(env_filter(level))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {e}"))?;
    Ok(guard)
}

fn env_filter(level: Option<&str>) -> EnvFilter {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    filter_from(rust_log.as_deref(), level)
}

/// `RUST_LOG` when set and valid, the configured level otherwise.
fn filter_from(rust_log: Option<&str>, level: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default_directive(level)))
}

fn default_directive(level: Option<&str>) -> String {
    match level.map(str::trim) {
        Some(level) if !level.is_empty() => level.to_string(),
        _ => "info".to_string(),
    }
}
