//! Error types for the lactasegura core.
//!
//! This module defines all error types used throughout the crate. Most read
//! paths deliberately degrade to safe defaults instead of returning errors
//! (see the store module); the variants here cover the write paths, input
//! validation, networking, and the sync session gate.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for lactasegura operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Validation Errors ===
    /// A calculator input was out of range or not a finite number.
    #[error("{field} must be between {min} and {max} (got {value})")]
    Validation {
        /// Name of the offending input field.
        field: &'static str,
        /// Lower bound of the accepted range.
        min: f64,
        /// Upper bound of the accepted range.
        max: f64,
        /// The rejected value, as entered.
        value: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Store Errors ===
    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A whole-file store rewrite failed.
    #[error("failed to write store file {path}: {source}")]
    StoreWrite {
        /// Path to the store file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Network Errors ===
    /// A remote article fetch failed (transport error or non-200 response).
    #[error("remote fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The remote payload was not a JSON array of articles.
    #[error("remote payload is not an article list: {message}")]
    FetchPayload {
        /// Description of the payload problem.
        message: String,
    },

    /// No remote articles URL is configured.
    #[error("no remote articles URL configured")]
    RemoteUrlMissing,

    // === Sync Errors ===
    /// A sync operation was attempted before a successful authenticate.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The backup file is missing or unreadable.
    #[error("no backup available at {path}")]
    BackupMissing {
        /// Expected backup file path.
        path: PathBuf,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for lactasegura operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a validation error for an out-of-range input.
    #[must_use]
    pub fn validation(field: &'static str, min: f64, max: f64, value: f64) -> Self {
        Self::Validation {
            field,
            min,
            max,
            value: value.to_string(),
        }
    }

    /// Create a payload-shape fetch error.
    #[must_use]
    pub fn fetch_payload(message: impl Into<String>) -> Self {
        Self::FetchPayload {
            message: message.into(),
        }
    }

    /// Check if this error is a user-input validation failure.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Check if this error is a network failure (transport or payload shape).
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Fetch(_) | Self::FetchPayload { .. })
    }

    /// Check if this error indicates a missing authentication step.
    #[must_use]
    pub fn is_not_authenticated(&self) -> bool {
        matches!(self, Self::NotAuthenticated)
    }
}
