//! Remote rewriting service errors.

use thiserror::Error;

/// Failure of a call to the remote rewriting service.
///
/// Every variant is recoverable: the coordinator answers with the local
/// fallback instead.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("Remote error: {status} - {message}")]
    Status { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Remote service unavailable")]
    Unavailable,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl RemoteError {
    /// HTTP status code, if the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
