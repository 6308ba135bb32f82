//! Error types and Result aliases for dirmon.
//!
//! Callers only ever see an explicit failure for registration mistakes
//! (`InvalidArgument`, `WatchSetupFailed`) or for a sink that failed while
//! an event was being dispatched (`SinkDeliveryFailed`). Lost or overwritten
//! events never produce an error.

use thiserror::Error;

/// Result type alias using dirmon's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for dirmon operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Caller passed an unusable path or an unknown watch handle.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The OS watcher refused to watch the path.
    #[error("failed to watch path '{path}': {reason}")]
    WatchSetupFailed { path: String, reason: String },

    /// The event sink raised an error while an event was being dispatched.
    #[error("sink delivery failed: {0}")]
    SinkDeliveryFailed(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid-argument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a watch-setup error for `path`.
    pub fn watch_setup(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::WatchSetupFailed {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a sink-delivery error.
    pub fn sink(msg: impl Into<String>) -> Self {
        Self::SinkDeliveryFailed(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error is a caller mistake that should not be retried.
    #[must_use]
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}

#[cfg(test)]
mod tests;
