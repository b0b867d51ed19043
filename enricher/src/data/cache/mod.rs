//! Cache module
//!
//! Bounded, TTL-expiring store of resolved attribute sets keyed by IP
//! address. The resolver talks to it through the [`AttributeCache`] trait;
//! [`TtlLruCache`] is the in-memory implementation used in production.

mod backend;
mod memory;

use std::time::Duration;

pub use backend::{AttributeCache, CacheStats};
pub use memory::TtlLruCache;

use crate::core::constants::{CACHE_MAX_ENTRIES, CACHE_TTL_SECS};

/// Cache sizing and expiry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of entries before LRU eviction kicks in
    pub max_entries: usize,
    /// Maximum age of an entry before it is treated as absent
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: CACHE_MAX_ENTRIES,
            ttl: Duration::from_secs(CACHE_TTL_SECS),
        }
    }
}
