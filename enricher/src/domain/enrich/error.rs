//! Enrichment error types

use ipinfo_client::ClientError;
use thiserror::Error;

/// Fatal configuration errors; the stage does not start.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: fields must contain at least one non-blank name")]
    EmptyWishlist,

    #[error("Failed to initialize geolocation client: {0}")]
    Client(#[source] ClientError),
}

/// Per-event resolution failures; logged and the event passes through unchanged.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("invalid IP address: {0}")]
    InvalidAddress(String),

    #[error("malformed lookup response: {0}")]
    Malformed(String),

    #[error("geolocation lookup failed: {0}")]
    Client(#[from] ClientError),
}

impl LookupError {
    /// Whether the same address could resolve on a later attempt
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Client(e) => e.is_transient(),
            Self::InvalidAddress(_) | Self::Malformed(_) => false,
        }
    }
}
