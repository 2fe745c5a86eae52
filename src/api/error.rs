//! Error taxonomy for the REST client.
//!
//! Mirrors how failures are handled upstream: validation problems never reach
//! the network, HTTP errors carry the server's `detail` message verbatim, 401
//! tears down the session, and 404 is surfaced as its own variant because the
//! progress poller treats it as benign cleanup rather than a failure.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// No usable token, or the server rejected the one we sent. The session
    /// has already been torn down by the time this is returned.
    #[error("Not signed in. Run `ttt auth login` first.")]
    Unauthorized,

    /// The resource is gone server-side (HTTP 404).
    #[error("Not found")]
    NotFound,

    /// Any other non-2xx response, carrying the server's `detail` field.
    #[error("{detail}")]
    Api { status: u16, detail: String },

    /// Transport-level failure (connect, TLS, decode).
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Local I/O failure while preparing a request body.
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// The message shown to the user for a failed operation: the server's
    /// words when it gave any, a generic fallback otherwise.
    pub fn user_detail(&self, fallback: &str) -> String {
        match self {
            ApiError::Api { detail, .. } => detail.clone(),
            ApiError::Unauthorized => self.to_string(),
            _ => fallback.to_string(),
        }
    }
}
