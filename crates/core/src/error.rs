//! Error types shared by the portsync crates.

use thiserror::Error;

/// Top-level error type for all portsync operations.
#[derive(Debug, Error)]
pub enum PortSyncError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("authentication error: {0}")]
    Auth(String),

    /// The Port API answered with a non-success status code.
    #[error("{context} failed ({status}): {body}")]
    Status {
        context: String,
        status: u16,
        body: String,
    },

    /// The Port API answered 2xx but flagged the request as unsuccessful (`ok: false`).
    #[error("Port rejected request for {kind}: {message}")]
    Rejected { kind: String, message: String },
}

impl PortSyncError {
    /// HTTP status code carried by this error, if it came from a response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// A convenience Result alias that defaults to [`PortSyncError`].
pub type Result<T> = std::result::Result<T, PortSyncError>;
