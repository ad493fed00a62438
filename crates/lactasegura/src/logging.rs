//! Logging configuration for the lactasegura core.
//!
//! This module provides initialization and configuration for the tracing-based
//! logging system used throughout the crate, plus the crash-file writer used
//! for unrecoverable startup errors.

use std::path::Path;

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Verbosity level for logging output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Suppress all output except errors.
    Quiet,
    /// Normal output level (info and above).
    #[default]
    Normal,
    /// Verbose output (debug and above).
    Verbose,
    /// Very verbose output (trace level).
    Trace,
}

impl Verbosity {
    /// Convert verbosity to tracing level filter.
    #[must_use]
    pub fn to_level_filter(&self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }
}

/// Initialize the logging system.
///
/// This should be called once at application startup. The logging level can be
/// controlled via:
/// 1. The `verbosity` parameter
/// 2. The `RUST_LOG` environment variable (takes precedence)
pub fn init_logging(verbosity: Verbosity) {
    // Build the default filter based on verbosity
    let default_filter = format!("lactasegura={}", verbosity.to_level_filter());

    // Allow RUST_LOG to override
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    // Configure the subscriber
    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false),
    );

    // Install the subscriber (ignore error if already set)
    let _ = subscriber.try_init();
}

/// Write an unrecoverable startup error to a crash file.
///
/// Virtually every runtime failure in this crate degrades to a safe default;
/// startup failures are the exception. They are written to `crash_log.txt`
/// in the given directory so the host can surface them after the process
/// terminates. Failure to write the crash file itself is only logged.
pub fn write_crash_log(dir: impl AsRef<Path>, error: &crate::Error) {
    let path = dir.as_ref().join("crash_log.txt");
    let body = format!(
        "lactasegura startup failure at {}\n\n{error}\n",
        chrono::Utc::now().to_rfc3339()
    );
    if let Err(io_err) = std::fs::write(&path, body) {
        tracing::error!("failed to write crash log {}: {io_err}", path.display());
    }
}

/// Initialize logging for tests.
///
/// This sets up a minimal logging configuration suitable for tests.
/// It only logs warnings and errors by default to keep test output clean.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}
