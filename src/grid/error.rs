//! Error types for remote fetches

use thiserror::Error;

/// Errors that can occur while loading a page
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The request never reached the backend or the connection dropped
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The backend answered with an error status
    #[error("Backend returned {code}: {message}")]
    Backend { code: u16, message: String },

    /// The response body could not be decoded
    #[error("Could not decode response: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
