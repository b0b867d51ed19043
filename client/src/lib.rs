//! # ipinfo-client
//!
//! Minimal async client for the [ipinfo.io](https://ipinfo.io) IP geolocation API.
//!
//! The client performs one `GET /{ip}` per call and returns the decoded JSON
//! object, augmented with the derived attributes the official clients add:
//!
//! | Attribute | Source |
//! |-----------|--------|
//! | `country_name` | ISO 3166 name for `country` |
//! | `is_eu` | `country` is an EU member state |
//! | `latitude` | first half of `loc` |
//! | `longitude` | second half of `loc` |
//!
//! Caching is left to the caller.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ipinfo_client::{ClientConfig, IpinfoClient};
//!
//! let client = IpinfoClient::new(ClientConfig {
//!     token: Some("my-token".to_string()),
//!     ..Default::default()
//! })?;
//! let details = client.details("8.8.8.8").await?;
//! assert_eq!(details["city"], "Mountain View");
//! ```

mod client;
mod countries;
mod error;

pub use client::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, Details, IpinfoClient};
pub use countries::{country_name, is_eu};
pub use error::ClientError;
