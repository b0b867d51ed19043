//! Geolocation resolver: cache in front of the remote lookup

use std::sync::Arc;

use async_trait::async_trait;
use ipinfo_client::IpinfoClient;
use serde_json::Value;

use super::error::LookupError;
use super::normalize::normalize_attributes;
use crate::data::cache::{AttributeCache, CacheStats};
use crate::data::types::AttributeSet;

/// Remote geolocation lookup
///
/// Returns the backend's raw response tree; the resolver normalizes it.
#[async_trait]
pub trait GeoLookup: Send + Sync {
    async fn details(&self, ip: &str) -> Result<Value, LookupError>;

    /// Backend name for debugging/logging
    fn name(&self) -> &'static str;
}

#[async_trait]
impl GeoLookup for IpinfoClient {
    async fn details(&self, ip: &str) -> Result<Value, LookupError> {
        let details = IpinfoClient::details(self, ip).await?;
        Ok(Value::Object(details))
    }

    fn name(&self) -> &'static str {
        "ipinfo"
    }
}

/// Fetch-or-lookup with caching.
///
/// Only successful resolutions are cached; a failed lookup is retried the
/// next time the same address is seen.
pub struct GeoResolver {
    lookup: Arc<dyn GeoLookup>,
    cache: Arc<dyn AttributeCache>,
}

impl std::fmt::Debug for GeoResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeoResolver")
            .field("lookup", &self.lookup.name())
            .field("cache", &self.cache.backend_name())
            .finish()
    }
}

impl GeoResolver {
    pub fn new(lookup: Arc<dyn GeoLookup>, cache: Arc<dyn AttributeCache>) -> Self {
        Self { lookup, cache }
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub async fn resolve(&self, ip: &str) -> Result<AttributeSet, LookupError> {
        if let Some(cached) = self.cache.get(ip) {
            tracing::trace!(ip = %ip, "Attribute cache hit");
            return Ok(cached);
        }

        tracing::debug!(ip = %ip, lookup = self.lookup.name(), "Attribute cache miss, resolving");
        let raw = match self.lookup.details(ip).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::debug!(
                    ip = %ip,
                    transient = e.is_transient(),
                    "Lookup failed, nothing cached"
                );
                return Err(e);
            }
        };
        let attributes = normalize_attributes(&raw)?;

        self.cache.put(ip, attributes.clone());
        Ok(attributes)
    }
}
