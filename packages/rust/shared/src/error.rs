//! Error types for jobwatch.
//!
//! Library crates use [`JobWatchError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all jobwatch operations.
#[derive(Debug, thiserror::Error)]
pub enum JobWatchError {
    /// Configuration loading or validation error. Fatal at startup.
    #[error("config error: {message}")]
    Config { message: String },

    /// Source page unreachable or returned a non-success status.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Source document could not be interpreted as a job listing.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Novelty store query or insert failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// Notification could not be delivered.
    #[error("delivery error: {0}")]
    Delivery(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, JobWatchError>;

impl JobWatchError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error aborts a whole pipeline run (as opposed to a single record).
    pub fn is_run_fatal(&self) -> bool {
        matches!(self, Self::Fetch(_) | Self::Parse { .. })
    }
}
