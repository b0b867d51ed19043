//! Attribute cache trait definition

use crate::data::types::AttributeSet;

/// Point-in-time cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Entries dropped on read because they outlived the TTL
    pub expirations: u64,
    /// Entries dropped on write to stay within capacity
    pub evictions: u64,
}

/// Cache of resolved attribute sets keyed by IP address
///
/// Injected into the resolver so tests can substitute a double that
/// simulates hits, misses and expiry without a network dependency.
///
/// Implementations must serialize their own bookkeeping: the stage may be
/// shared across tasks, and LRU recency updates happen on every `get`.
pub trait AttributeCache: Send + Sync {
    /// Return the cached attributes for `ip`, or `None` when absent or expired.
    fn get(&self, ip: &str) -> Option<AttributeSet>;

    /// Store attributes for `ip`, evicting as needed to respect capacity.
    fn put(&self, ip: &str, attributes: AttributeSet);

    /// Hit, miss, expiry and eviction counters since creation
    fn stats(&self) -> CacheStats;

    /// Backend name for debugging/logging
    fn backend_name(&self) -> &'static str;
}
