use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use ipinfo_client::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use serde::Deserialize;

use super::cli::CliConfig;
use super::constants::{CACHE_MAX_ENTRIES, CACHE_TTL_SECS, CONFIG_FILE_NAME};
use crate::data::cache::CacheConfig;
use crate::domain::enrich::StageConfig;

// =============================================================================
// File Config Sections
// =============================================================================

/// Lookup client section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ClientFileConfig {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Attribute cache section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CacheFileConfig {
    pub max_entries: Option<usize>,
    pub ttl_secs: Option<u64>,
}

/// File-based configuration (JSON)
///
/// ```json
/// {
///   "stage": { "accessToken": "...", "inputKey": "ip_address", "fields": ["city"] },
///   "client": { "base_url": "https://ipinfo.io", "timeout_secs": 10 },
///   "cache": { "max_entries": 4096, "ttl_secs": 604800 }
/// }
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub stage: Option<StageConfig>,
    pub client: Option<ClientFileConfig>,
    pub cache: Option<CacheFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }
}

// =============================================================================
// Final Config
// =============================================================================

/// Final merged application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Raw stage options; validated when the stage is configured
    pub stage: StageConfig,
    pub client: ClientConfig,
    pub cache: CacheConfig,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. CLI-specified config path OR `geoenrich.json` in the working directory
    /// 3. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let config_path = match &cli.config {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                Some(path.clone())
            }
            None => {
                let local = PathBuf::from(CONFIG_FILE_NAME);
                if local.exists() { Some(local) } else { None }
            }
        };

        let file_config = match &config_path {
            Some(path) => {
                let file_config = FileConfig::load_from_file(path)?;
                file_config.warn_unknown_fields();
                tracing::debug!(path = %path.display(), "Config file loaded");
                file_config
            }
            None => FileConfig::default(),
        };

        Self::layer(cli, file_config)
    }

    /// Layer configs: defaults -> file config -> CLI/env overrides
    fn layer(cli: &CliConfig, file_config: FileConfig) -> Result<Self> {
        let file_stage = file_config.stage.unwrap_or_default();
        let file_client = file_config.client.unwrap_or_default();
        let file_cache = file_config.cache.unwrap_or_default();

        let stage = StageConfig {
            access_token: cli.access_token.clone().or(file_stage.access_token),
            input_key: cli.input_key.clone().or(file_stage.input_key),
            output_key: cli.output_key.clone().or(file_stage.output_key),
            fields: cli.fields.clone().or(file_stage.fields),
        };

        let base_url = cli
            .base_url
            .clone()
            .or(file_client.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout_secs = cli
            .timeout_secs
            .or(file_client.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let max_entries = cli
            .cache_max_entries
            .or(file_cache.max_entries)
            .unwrap_or(CACHE_MAX_ENTRIES);
        let ttl_secs = cli
            .cache_ttl_secs
            .or(file_cache.ttl_secs)
            .unwrap_or(CACHE_TTL_SECS);

        let config = Self {
            stage,
            client: ClientConfig {
                // Filled from the validated stage settings
                token: None,
                base_url,
                timeout: Duration::from_secs(timeout_secs),
            },
            cache: CacheConfig {
                max_entries,
                ttl: Duration::from_secs(ttl_secs),
            },
        };

        config.validate()?;
        tracing::debug!(config = ?config, "Configuration loaded");
        Ok(config)
    }

    /// Validate the configuration for consistency and correctness
    fn validate(&self) -> Result<()> {
        let base_url = self.client.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            anyhow::bail!(
                "Configuration error: client.base_url must be an http(s) URL, got '{}'",
                self.client.base_url
            );
        }

        if self.client.timeout.is_zero() {
            anyhow::bail!("Configuration error: client.timeout_secs must be greater than 0");
        }

        if self.cache.max_entries == 0 {
            anyhow::bail!("Configuration error: cache.max_entries must be greater than 0");
        }

        if self.cache.ttl.is_zero() {
            anyhow::bail!("Configuration error: cache.ttl_secs must be greater than 0");
        }

        Ok(())
    }
}
