//! Connectivity error definitions.

use thiserror::Error;

/// Errors raised by a database driver.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The target cannot be turned into an endpoint.
    #[error("invalid dial target: {0}")]
    InvalidTarget(String),

    /// HTTP transport failure (connect, timeout, body read).
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server rejected the query.
    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },

    /// The server answered with something unexpected.
    #[error("unexpected response: {0}")]
    Protocol(String),

    /// The session was evicted and closed.
    #[error("session is closed")]
    Closed,
}

/// Failure to obtain a live session for a host.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("failed to open session to {host}: {source}")]
    Open {
        host: String,
        #[source]
        source: DriverError,
    },

    #[error("session to {host} failed liveness probe: {source}")]
    Ping {
        host: String,
        #[source]
        source: DriverError,
    },
}

impl ConnectError {
    /// Host the failed attempt was made against.
    pub fn host(&self) -> &str {
        match self {
            ConnectError::Open { host, .. } | ConnectError::Ping { host, .. } => host,
        }
    }
}

/// Result type for connection operations.
pub type ConnectResult<T> = Result<T, ConnectError>;
