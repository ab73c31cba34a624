//! Error types for storage and the reply service.

use thiserror::Error;

/// Failure reading or writing the key/value store.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Underlying file operation failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored document could not be encoded or decoded.
    #[error("storage JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure of one exchange with the remote reply service.
///
/// All variants are handled identically by the exchange controller (error
/// notice with retry); the distinction only matters for logging.
#[derive(Error, Debug)]
pub enum ExchangeError {
    /// Connection, TLS or protocol failure below HTTP status level.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// Service answered with a non-success status.
    #[error("service returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as far as it could be read.
        body: String,
    },

    /// Success status but the body was not `{"reply": "..."}`.
    #[error("malformed reply: {0}")]
    MalformedReply(#[from] serde_json::Error),

    /// The configured service URL could not be parsed.
    #[error("invalid service URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(err)
        }
    }
}

impl ExchangeError {
    /// HTTP status of the failed response, if the service answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
