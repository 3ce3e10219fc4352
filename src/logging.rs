//! Tracing setup.
//!
//! Logs always go to a daily-rolling file under the cache directory. The
//! terminal UI owns the screen and the relay host owns stdout, so a console
//! layer (stderr) is only added for the plain command-line modes.

use std::fs;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::Layer;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::utils::get_log_dir;

/// Environment variable holding the filter directives
pub const LOG_ENV_VAR: &str = "CODESCOPE_LOG";

const DEFAULT_FILTER: &str = "info";
const MAX_LOG_FILES: usize = 7;

// Flushes buffered file output when the process exits
static GUARD: OnceLock<WorkerGuard> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// Log file only
    FileOnly,
    /// Log file plus warnings and errors on stderr
    FileAndStderr,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Calling it twice is an error.
pub fn init_tracing(target: LogTarget) -> Result<()> {
    let log_dir = get_log_dir()?;
    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("codescope")
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(&log_dir)
        .context("Failed to create log file appender")?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = GUARD.set(guard);

    let stderr_layer = (target == LogTarget::FileAndStderr).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(LevelFilter::WARN)
    });

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .with(stderr_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}
