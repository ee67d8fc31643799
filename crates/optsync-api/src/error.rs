//! API client error types.

use thiserror::Error;

/// Errors raised by the API client.
///
/// Non-2xx responses are not errors at this level; they come back as an
/// [`ApiResponse`](crate::ApiResponse) carrying the opaque error body.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Failed to get token: {status} - {body}")]
    TokenFetch { status: u16, body: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for API client operations.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
