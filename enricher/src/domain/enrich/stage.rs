//! The enrichment stage
//!
//! Reads an IP address from each event, resolves it through the cached
//! geolocation lookup and writes the wishlisted attributes back under the
//! output key. Per-event problems are reported through [`Diagnostics`] and
//! never abort the stream: the event is always handed back.

use std::sync::Arc;

use ipinfo_client::{ClientConfig, IpinfoClient};
use serde_json::Value;

use super::diagnostics::{Diagnostics, TracingDiagnostics};
use super::error::{ConfigError, LookupError};
use super::reconcile::{Reconciled, reconcile};
use super::resolver::{GeoLookup, GeoResolver};
use super::settings::{Settings, StageConfig};
use crate::data::cache::{AttributeCache, CacheConfig, CacheStats, TtlLruCache};
use crate::data::types::{AttributeSet, Event};
use crate::utils::json::json_type;

/// What happened to an event in [`EnrichmentStage::process`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Output key written; `missing` lists wishlist fields the lookup did not return
    Enriched { missing: Vec<String> },
    /// Input key absent; event unchanged
    MissingInputField,
    /// Input value is null; event unchanged
    NullInputValue,
    /// Address invalid or lookup failed; event unchanged
    LookupFailed,
}

impl Outcome {
    pub fn is_enriched(&self) -> bool {
        matches!(self, Outcome::Enriched { .. })
    }
}

pub struct EnrichmentStage {
    settings: Settings,
    resolver: GeoResolver,
    diagnostics: Arc<dyn Diagnostics>,
}

impl std::fmt::Debug for EnrichmentStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnrichmentStage")
            .field("settings", &self.settings)
            .field("resolver", &self.resolver)
            .finish()
    }
}

impl EnrichmentStage {
    /// Validate options and build the production stage against ipinfo.io.
    pub fn configure(config: StageConfig) -> Result<Self, ConfigError> {
        Self::configure_with(config, ClientConfig::default(), CacheConfig::default())
    }

    /// Like [`configure`](Self::configure) with explicit client and cache options.
    ///
    /// The access token always comes from the stage options; any token in
    /// `client` is replaced.
    pub fn configure_with(
        config: StageConfig,
        client: ClientConfig,
        cache: CacheConfig,
    ) -> Result<Self, ConfigError> {
        let settings = Settings::validate(config)?;

        let client = IpinfoClient::new(ClientConfig {
            token: settings.access_token().map(|t| t.expose().to_string()),
            ..client
        })
        .map_err(ConfigError::Client)?;

        if client.is_anonymous() {
            tracing::warn!("No access token configured, using anonymous lookups (rate limited)");
        }

        let cache = TtlLruCache::new(&cache);
        tracing::info!(
            input_key = %settings.input_key(),
            output_key = %settings.output_key(),
            fields = settings.wishlist().len(),
            cache_capacity = cache.capacity(),
            cache_ttl_secs = cache.ttl().as_secs(),
            "Enrichment stage configured"
        );

        Ok(Self::new(
            settings,
            Arc::new(client),
            Arc::new(cache),
            Arc::new(TracingDiagnostics),
        ))
    }

    /// Compose a stage from explicit collaborators.
    pub fn new(
        settings: Settings,
        lookup: Arc<dyn GeoLookup>,
        cache: Arc<dyn AttributeCache>,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Self {
        Self {
            settings,
            resolver: GeoResolver::new(lookup, cache),
            diagnostics,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.resolver.cache_stats()
    }

    /// Resolve the full attribute set for one address, bypassing reconciliation.
    pub async fn resolve(&self, ip: &str) -> Result<AttributeSet, LookupError> {
        self.resolver.resolve(ip).await
    }

    /// Enrich one event in place.
    pub async fn process(&self, event: &mut Event) -> Outcome {
        let input_key = self.settings.input_key();

        let ip = match event.get(input_key) {
            None => {
                self.diagnostics
                    .error(&format!("key \"{input_key}\" not present in the record"), None);
                return Outcome::MissingInputField;
            }
            Some(Value::Null) => return Outcome::NullInputValue,
            Some(Value::String(ip)) => ip.clone(),
            Some(other) => {
                let err = LookupError::InvalidAddress(format!(
                    "expected text under \"{input_key}\", got {}",
                    json_type(other)
                ));
                self.diagnostics
                    .error("skipping geolocation lookup", Some(&err));
                return Outcome::LookupFailed;
            }
        };

        let attributes = match self.resolver.resolve(&ip).await {
            Ok(attributes) => attributes,
            Err(err) => {
                self.diagnostics.error(
                    &format!("geolocation lookup for \"{ip}\" failed"),
                    Some(&err),
                );
                return Outcome::LookupFailed;
            }
        };

        let Reconciled { subset, missing } =
            reconcile(&attributes, self.settings.wishlist().as_slice());
        for field in &missing {
            self.diagnostics.warn(&format!(
                "field \"{field}\" not present in geolocation data, ignoring it"
            ));
        }

        event.insert(self.settings.output_key().to_string(), Value::Object(subset));
        Outcome::Enriched { missing }
    }

    /// Owned-event form of [`process`](Self::process).
    pub async fn filter(&self, mut event: Event) -> Event {
        self.process(&mut event).await;
        event
    }
}
