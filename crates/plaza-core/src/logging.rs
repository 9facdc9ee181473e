//! Tracing subscriber setup shared by the Plaza binaries.
//!
//! Events go to stderr (compact, no target) and to a daily-rolling file under
//! `$PLAZA_HOME/logs`. `RUST_LOG` takes precedence over the requested level.

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::paths;

pub const DEFAULT_LEVEL: &str = "warn";
const LOG_FILE_PREFIX: &str = "plaza.log";

/// Installs the global subscriber writing to stderr and `paths::logs_dir()`.
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// lifetime of the process.
///
/// # Errors
/// Returns an error if the log directory cannot be created or a subscriber is
/// already installed.
pub fn init(level: Option<&str>) -> Result<WorkerGuard> {
    init_in(&paths::logs_dir(), level)
}

/// Same as [`init`], with an explicit log directory.
///
/// # Errors
/// See [`init`].
pub fn init_in(dir: &Path, level: Option<&str>) -> Result<WorkerGuard> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}

fn env_filter(level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        level
            .and_then(|level| EnvFilter::try_new(level).ok())
            .unwrap_or_else(|| EnvFilter::new(DEFAULT_LEVEL))
    })
}
