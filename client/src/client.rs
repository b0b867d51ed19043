//! HTTP client for the ipinfo.io lookup endpoint

use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use serde_json::{Map, Value};

use crate::countries::{country_name, is_eu};
use crate::error::ClientError;

/// Public ipinfo.io endpoint
pub const DEFAULT_BASE_URL: &str = "https://ipinfo.io";

/// Request timeout applied when none is configured
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const USER_AGENT: &str = concat!("ipinfo-client-rust/", env!("CARGO_PKG_VERSION"));

/// Longest slice of an error body echoed back in `ClientError::Status`
const ERROR_BODY_MAX_LEN: usize = 200;

/// Decoded lookup response: the JSON object returned by the API plus derived attributes.
pub type Details = Map<String, Value>;

/// Client construction options
#[derive(Clone)]
pub struct ClientConfig {
    /// API access token. `None` runs in anonymous mode (rate limited, fewer fields).
    pub token: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// ipinfo.io API client
///
/// Cheap to share behind an `Arc`; the inner `reqwest::Client` pools connections.
pub struct IpinfoClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl fmt::Debug for IpinfoClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IpinfoClient")
            .field("base_url", &self.base_url)
            .field("anonymous", &self.is_anonymous())
            .finish()
    }
}

impl IpinfoClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        let token = config.token.filter(|t| !t.trim().is_empty());
        let base_url = config.base_url.trim_end_matches('/').to_string();

        tracing::debug!(
            base_url = %base_url,
            anonymous = token.is_none(),
            timeout_ms = config.timeout.as_millis() as u64,
            "ipinfo client initialized"
        );

        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    /// True when no access token is configured
    pub fn is_anonymous(&self) -> bool {
        self.token.is_none()
    }

    /// Fetch geolocation details for a single IP address.
    ///
    /// The address is validated locally first; malformed input never reaches the network.
    pub async fn details(&self, ip: &str) -> Result<Details, ClientError> {
        let addr: IpAddr = ip
            .trim()
            .parse()
            .map_err(|_| ClientError::InvalidAddress(ip.to_string()))?;

        let url = format!("{}/{}", self.base_url, addr);
        let mut request = self.http.get(&url).header(ACCEPT, "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        tracing::trace!(ip = %addr, "ipinfo lookup");
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ClientError::RateLimited);
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ClientError::Unauthorized(status.as_u16()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                code: status.as_u16(),
                message: error_message(status, &body),
            });
        }

        let body = response.bytes().await?;
        let mut details: Details =
            serde_json::from_slice(&body).map_err(|e| ClientError::Decode(e.to_string()))?;

        add_derived_fields(&mut details);
        Ok(details)
    }
}

/// Add `country_name`, `is_eu`, `latitude` and `longitude` derived from the raw response.
fn add_derived_fields(details: &mut Details) {
    let country = details
        .get("country")
        .and_then(Value::as_str)
        .map(str::to_string);
    if let Some(code) = country {
        if let Some(name) = country_name(&code) {
            details.insert("country_name".to_string(), Value::from(name));
        }
        details.insert("is_eu".to_string(), Value::Bool(is_eu(&code)));
    }

    let loc = details
        .get("loc")
        .and_then(Value::as_str)
        .and_then(|loc| loc.split_once(','))
        .map(|(lat, lon)| (lat.trim().to_string(), lon.trim().to_string()));
    if let Some((lat, lon)) = loc {
        details.insert("latitude".to_string(), Value::String(lat));
        details.insert("longitude".to_string(), Value::String(lon));
    }
}

/// Extract a human-readable message from an API error body.
///
/// ipinfo answers with `{"error": {"title": ..., "message": ...}}` or `{"error": "..."}`.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        match map.get("error") {
            Some(Value::Object(err)) => {
                if let Some(msg) = err.get("message").and_then(Value::as_str) {
                    return msg.to_string();
                }
                if let Some(title) = err.get("title").and_then(Value::as_str) {
                    return title.to_string();
                }
            }
            Some(Value::String(msg)) => return msg.clone(),
            _ => {}
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string();
    }
    trimmed.chars().take(ERROR_BODY_MAX_LEN).collect()
}
