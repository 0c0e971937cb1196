//! Error types for askbase.
//!
//! Library crates use [`AskbaseError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! Note the asymmetry baked into the snapshot artifact: *writing* it can fail
//! loudly ([`AskbaseError::Snapshot`], [`AskbaseError::Serialize`]), but
//! *reading* it never produces an error — a missing or corrupt artifact
//! degrades to an empty record set so the query path stays usable.

use std::path::PathBuf;

/// Top-level error type for all askbase operations.
#[derive(Debug, thiserror::Error)]
pub enum AskbaseError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while fetching a single source.
    #[error("network error: {0}")]
    Network(String),

    /// Content extraction error for a single source.
    #[error("extract error: {0}")]
    Extract(String),

    /// Filesystem I/O error against the snapshot artifact.
    #[error("snapshot I/O error at {path:?}: {source}")]
    Snapshot {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Snapshot serialization error.
    #[error("serialize error: {0}")]
    Serialize(String),

    /// Completion service unreachable or returned malformed output.
    #[error("completion error: {0}")]
    Completion(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, AskbaseError>;

impl AskbaseError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create an extraction error from any displayable message.
    pub fn extract(msg: impl Into<String>) -> Self {
        Self::Extract(msg.into())
    }

    /// Wrap a `std::io::Error` with the snapshot path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Snapshot {
            path: path.into(),
            source,
        }
    }
}
