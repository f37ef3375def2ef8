//! Logging setup.
//!
//! Always logs to stdout. With a log directory, also writes a daily rolling
//! file; the returned guard must stay alive until exit so buffered lines are
//! flushed.

use std::env;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEBUG_ENV: &str = "SIGNON_DEBUG_LOG";
const LOG_FILE_PREFIX: &str = "signon-monitor.log";

pub fn init(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = env_filter();

    let Some(dir) = log_dir else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
        return None;
    };

    if let Err(err) = fs_err::create_dir_all(dir) {
        tracing_subscriber::fmt().with_env_filter(filter).init();
        tracing::warn!(error = %err, "Failed to create log directory; logging to stdout only");
        return None;
    }

    let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .init();
    Some(guard)
}

fn env_filter() -> EnvFilter {
    let debug_enabled = env::var(DEBUG_ENV)
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false);
    if debug_enabled {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}
