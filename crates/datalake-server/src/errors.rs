//! Server error types.

use thiserror::Error;

/// Errors raised while starting the server.
///
/// Per-connection failures never surface here; they end their own session.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listening socket could not be bound (port in use, permission denied).
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address that was requested.
        addr: String,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },
    /// The Prometheus recorder could not be installed.
    #[error("failed to install metrics recorder: {0}")]
    Metrics(String),
    /// Other I/O failure during startup.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;
