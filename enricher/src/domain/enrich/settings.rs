//! Stage configuration and its validation
//!
//! [`StageConfig`] is the raw option map handed over by the host;
//! [`Settings`] is the cleaned, immutable result of [`Settings::validate`].

use std::fmt;

use serde::Deserialize;

use super::error::ConfigError;
use crate::core::constants::{DEFAULT_FIELDS, DEFAULT_INPUT_KEY, DEFAULT_OUTPUT_KEY};

/// Raw stage options as provided by the host pipeline.
///
/// Accepts camelCase names (`accessToken`, `inputKey`, `outputKey`) and the
/// snake_case aliases used by older configs (`access_token`, `key_name`, `out_key`).
#[derive(Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StageConfig {
    #[serde(alias = "access_token")]
    pub access_token: Option<String>,
    #[serde(alias = "key_name", alias = "input_key")]
    pub input_key: Option<String>,
    #[serde(alias = "out_key", alias = "output_key")]
    pub output_key: Option<String>,
    pub fields: Option<Vec<String>>,
}

impl fmt::Debug for StageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageConfig")
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("input_key", &self.input_key)
            .field("output_key", &self.output_key)
            .field("fields", &self.fields)
            .finish()
    }
}

/// API access token. Never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Returns `None` for blank input
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        let trimmed = token.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

/// Ordered set of distinct, non-blank attribute names to extract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wishlist(Vec<String>);

impl Wishlist {
    /// Trim names, drop blanks and later duplicates, keep first-seen order.
    pub fn clean<I, S>(fields: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names: Vec<String> = Vec::new();
        for field in fields {
            let name = field.as_ref().trim();
            if name.is_empty() {
                continue;
            }
            if names.iter().any(|n| n == name) {
                tracing::debug!(field = %name, "Dropping duplicate field from wishlist");
                continue;
            }
            names.push(name.to_string());
        }

        if names.is_empty() {
            return Err(ConfigError::EmptyWishlist);
        }
        Ok(Self(names))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Validated, immutable stage configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    access_token: Option<AccessToken>,
    input_key: String,
    output_key: String,
    wishlist: Wishlist,
}

impl Settings {
    /// Validate and normalize raw options.
    ///
    /// - blank `access_token` is treated as absent
    /// - blank `input_key` / `output_key` fall back to their defaults with a warning
    /// - absent `fields` defaults to the standard geolocation fields
    /// - `fields` that clean down to nothing is rejected
    pub fn validate(config: StageConfig) -> Result<Self, ConfigError> {
        let access_token = config.access_token.and_then(AccessToken::new);
        let input_key = key_or_default(config.input_key, "inputKey", DEFAULT_INPUT_KEY);
        let output_key = key_or_default(config.output_key, "outputKey", DEFAULT_OUTPUT_KEY);

        let wishlist = match config.fields {
            Some(fields) => Wishlist::clean(fields)?,
            None => Wishlist::clean(DEFAULT_FIELDS)?,
        };

        tracing::debug!(
            input_key = %input_key,
            output_key = %output_key,
            fields = ?wishlist.as_slice(),
            anonymous = access_token.is_none(),
            "Stage configuration validated"
        );

        Ok(Self {
            access_token,
            input_key,
            output_key,
            wishlist,
        })
    }

    pub fn access_token(&self) -> Option<&AccessToken> {
        self.access_token.as_ref()
    }

    pub fn input_key(&self) -> &str {
        &self.input_key
    }

    pub fn output_key(&self) -> &str {
        &self.output_key
    }

    pub fn wishlist(&self) -> &Wishlist {
        &self.wishlist
    }
}

fn key_or_default(value: Option<String>, option: &str, default: &str) -> String {
    match value {
        Some(key) if !key.trim().is_empty() => key,
        Some(_) => {
            tracing::warn!(
                option = %option,
                default = %default,
                "Blank key configured, falling back to default"
            );
            default.to_string()
        }
        None => default.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(names: &[&str]) -> Option<Vec<String>> {
        Some(names.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::validate(StageConfig::default()).unwrap();

        assert!(settings.access_token().is_none());
        assert_eq!(settings.input_key(), "ip_address");
        assert_eq!(settings.output_key(), "ipinfo");
        assert_eq!(
            settings.wishlist().as_slice(),
            ["country_name", "region", "city", "latitude", "longitude"]
        );
    }

    #[test]
    fn test_custom_config() {
        let settings = Settings::validate(StageConfig {
            access_token: Some("token".to_string()),
            input_key: Some("key".to_string()),
            output_key: Some("out".to_string()),
            fields: fields(&["field1", "field2"]),
        })
        .unwrap();

        assert_eq!(settings.access_token().unwrap().expose(), "token");
        assert_eq!(settings.input_key(), "key");
        assert_eq!(settings.output_key(), "out");
        assert_eq!(settings.wishlist().as_slice(), ["field1", "field2"]);
    }

    #[test]
    fn test_wishlist_cleaning() {
        let wishlist = Wishlist::clean(["a", "a", "", "b"]).unwrap();
        assert_eq!(wishlist.as_slice(), ["a", "b"]);
        assert_eq!(wishlist.len(), 2);
    }

    #[test]
    fn test_wishlist_trims_and_keeps_first_occurrence_order() {
        let wishlist = Wishlist::clean([" city ", "region", "city", "  "]).unwrap();
        assert_eq!(wishlist.as_slice(), ["city", "region"]);
    }

    #[test]
    fn test_blank_only_fields_rejected() {
        let err = Settings::validate(StageConfig {
            fields: fields(&[""]),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::EmptyWishlist));
    }

    #[test]
    fn test_empty_fields_rejected() {
        let err = Settings::validate(StageConfig {
            fields: Some(Vec::new()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::EmptyWishlist));
    }

    #[test]
    fn test_blank_keys_fall_back_to_defaults() {
        let settings = Settings::validate(StageConfig {
            input_key: Some("  ".to_string()),
            output_key: Some(String::new()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(settings.input_key(), "ip_address");
        assert_eq!(settings.output_key(), "ipinfo");
    }

    #[test]
    fn test_blank_token_treated_as_absent() {
        let settings = Settings::validate(StageConfig {
            access_token: Some("   ".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert!(settings.access_token().is_none());
    }

    #[test]
    fn test_deserialize_camel_case() {
        let json = r#"{
            "accessToken": "t",
            "inputKey": "ip",
            "outputKey": "geo",
            "fields": ["country_name", "city"]
        }"#;
        let config: StageConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.access_token.as_deref(), Some("t"));
        assert_eq!(config.input_key.as_deref(), Some("ip"));
        assert_eq!(config.output_key.as_deref(), Some("geo"));
        assert_eq!(config.fields, fields(&["country_name", "city"]));
    }

    #[test]
    fn test_deserialize_snake_case_aliases() {
        let json = r#"{ "access_token": "t", "key_name": "ip", "out_key": "geo" }"#;
        let config: StageConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.access_token.as_deref(), Some("t"));
        assert_eq!(config.input_key.as_deref(), Some("ip"));
        assert_eq!(config.output_key.as_deref(), Some("geo"));
        assert!(config.fields.is_none());
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = StageConfig {
            access_token: Some("super-secret".to_string()),
            ..Default::default()
        };
        assert!(!format!("{:?}", config).contains("super-secret"));

        let settings = Settings::validate(config).unwrap();
        assert!(!format!("{:?}", settings).contains("super-secret"));
    }
}
