//! Logging for companion
//!
//! The terminal belongs to the conversation, so diagnostics go to a daily
//! rolling file under `$XDG_STATE_HOME/companion/`. `RUST_LOG` replaces the
//! configured level entirely when set.

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, LoggingConfig};
use crate::error::{Error, Result};

const LOG_FILE_PREFIX: &str = "companion.log";

/// HTTP internals log every connection at debug; keep them out of the file
const QUIET_DEPENDENCIES: &[&str] = &[
    "hyper=warn",
    "hyper_util=warn",
    "reqwest=warn",
    "rustls=warn",
];

/// Keeps the background writer alive; pending lines are flushed on drop.
#[must_use = "logging stops when the guard is dropped"]
pub struct LoggingGuard {
    _worker: WorkerGuard,
}

/// Install the file subscriber described by `config`.
pub fn init(config: &LoggingConfig) -> Result<LoggingGuard> {
    let log_dir = Config::state_dir();
    std::fs::create_dir_all(&log_dir)?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .max_log_files(config.max_files.max(1))
        .build(&log_dir)
        .map_err(|e| Error::Config(format!("failed to create log appender: {}", e)))?;
    let (writer, worker) = tracing_appender::non_blocking(appender);

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => configured_filter(&config.level)?,
    };

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    if tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .is_err()
    {
        // Only the first subscriber in a process takes effect
        tracing::debug!("Global subscriber already installed");
    }

    tracing::info!(
        log_dir = %log_dir.display(),
        level = %config.level,
        max_files = config.max_files,
        "Logging initialized"
    );

    Ok(LoggingGuard { _worker: worker })
}

/// Filter for a configured level with noisy dependencies capped at warn
fn configured_filter(level: &str) -> Result<EnvFilter> {
    let mut directives = vec![level.trim().to_string()];
    directives.extend(QUIET_DEPENDENCIES.iter().map(|d| d.to_string()));

    EnvFilter::try_new(directives.join(","))
        .map_err(|e| Error::Config(format!("invalid logging.level {:?}: {}", level, e)))
}

/// Log to the test harness output instead of a file
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Base path of the log file; the appender adds a date suffix
pub fn log_file_path() -> PathBuf {
    Config::log_path()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_path() {
        assert!(log_file_path().ends_with(LOG_FILE_PREFIX));
    }

    #[test]
    fn test_configured_filter() {
        let filter = configured_filter("debug").unwrap();
        let rendered = filter.to_string();
        assert!(rendered.contains("debug"));
        assert!(rendered.contains("hyper=warn"));

        let err = configured_filter("companion=chatty").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
