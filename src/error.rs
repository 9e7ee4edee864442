//! Centralized error types for bouncelog.
//!
//! Parsing never fails; only reading the input and writing the bounce log can.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the bouncelog library.
#[derive(Error, Debug)]
pub enum BounceError {
    /// I/O error with the associated path (`<stdin>` for standard input).
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A report could not be serialized into a log line.
    #[error("Failed to serialize bounce record: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The configuration file exists but could not be used.
    #[error("Invalid configuration '{path}': {reason}")]
    InvalidConfig { path: PathBuf, reason: String },
}

/// Convenience alias for `Result<T, BounceError>`.
pub type Result<T> = std::result::Result<T, BounceError>;

impl BounceError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
