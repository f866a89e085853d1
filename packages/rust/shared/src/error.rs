//! Error types for UserDB.
//!
//! Library crates use [`UserDbError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all UserDB operations.
#[derive(Debug, thiserror::Error)]
pub enum UserDbError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Transport failure: connect, TLS, timeout, or body read.
    #[error("network error: {url}: {message}")]
    Network { url: String, message: String },

    /// The registry answered with a non-success HTTP status.
    #[error("unexpected HTTP status from {url}: {status}")]
    Status { url: String, status: String },

    /// A large registry returned suspiciously little data.
    #[error("too few {source_name} users database entries: {url}: {count} (expected at least {min})")]
    TooFewEntries {
        source_name: String,
        url: String,
        count: usize,
        min: usize,
    },

    /// The special-registry directory did not decode.
    #[error("decode error: {url}: {message}")]
    Decode { url: String, message: String },

    /// A record identifier is not a 24-bit unsigned decimal number.
    #[error("invalid user id: {id:?}")]
    InvalidId { id: String },

    /// The progress observer asked to stop.
    #[error("operation cancelled")]
    Cancelled,

    /// A fetch worker ended without reporting a result.
    #[error("fetch worker failed: {0}")]
    Worker(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, UserDbError>;

impl UserDbError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a transport error for `url`.
    pub fn network(url: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Network {
            url: url.into(),
            message: msg.into(),
        }
    }

    /// Create a decode error for `url`.
    pub fn decode(url: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Decode {
            url: url.into(),
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
}
