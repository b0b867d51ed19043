//! Client error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid IP address: {0}")]
    InvalidAddress(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Access token rejected (HTTP {0})")]
    Unauthorized(u16),

    #[error("Lookup failed with HTTP {code}: {message}")]
    Status { code: u16, message: String },

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ClientError {
    /// Whether retrying the same request later could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RateLimited | Self::Http(_) => true,
            Self::Status { code, .. } => *code >= 500,
            Self::InvalidAddress(_) | Self::Unauthorized(_) | Self::Decode(_) => false,
        }
    }
}
