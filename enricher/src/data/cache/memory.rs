//! In-memory cache implementation using lru + parking_lot
//!
//! Entries are kept in strict least-recently-used order and carry their
//! insertion time; an entry older than the TTL is treated as absent and
//! dropped on the next `get`.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use lru::LruCache;
use parking_lot::Mutex;

use super::CacheConfig;
use super::backend::{AttributeCache, CacheStats};
use crate::data::types::AttributeSet;

/// Cache entry with data and metadata
struct CacheEntry {
    attributes: AttributeSet,
    inserted_at: Instant,
}

/// Bounded, TTL-expiring LRU cache
///
/// Uses:
/// - `lru::LruCache` - recency ordering and capacity-bound eviction
/// - `parking_lot::Mutex` - a single lock around every get/put, since an LRU
///   `get` mutates recency order
/// - atomics for the stats counters, readable without taking the lock
pub struct TtlLruCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
    expirations: AtomicU64,
    evictions: AtomicU64,
}

impl std::fmt::Debug for TtlLruCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlLruCache")
            .field("capacity", &self.capacity())
            .field("ttl", &self.ttl)
            .field("len", &self.len())
            .finish()
    }
}

impl TtlLruCache {
    /// Create a new cache with the given configuration
    ///
    /// A `max_entries` of zero is raised to one.
    pub fn new(config: &CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl: config.ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            expirations: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of entries currently held, including expired ones not yet read
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get_at(&self, ip: &str, now: Instant) -> Option<AttributeSet> {
        let mut entries = self.entries.lock();

        // Outer None: absent. Inner None: present but expired.
        let lookup = entries.get(ip).map(|entry| {
            let age = now.saturating_duration_since(entry.inserted_at);
            (age <= self.ttl).then(|| entry.attributes.clone())
        });

        match lookup {
            Some(Some(attributes)) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(attributes)
            }
            Some(None) => {
                entries.pop(ip);
                self.expirations.fetch_add(1, Ordering::Relaxed);
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(ip = %ip, "Cache entry expired");
                None
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    fn put_at(&self, ip: &str, attributes: AttributeSet, now: Instant) {
        let entry = CacheEntry {
            attributes,
            inserted_at: now,
        };

        // `push` hands back either the replaced value for the same key or the evicted LRU entry
        let displaced = self.entries.lock().push(ip.to_string(), entry);
        if let Some((key, _)) = displaced
            && key != ip
        {
            self.evictions.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(evicted = %key, "Cache at capacity, evicted least recently used entry");
        }
    }
}

impl AttributeCache for TtlLruCache {
    fn get(&self, ip: &str) -> Option<AttributeSet> {
        self.get_at(ip, Instant::now())
    }

    fn put(&self, ip: &str, attributes: AttributeSet) {
        self.put_at(ip, attributes, Instant::now());
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_config() -> CacheConfig {
        CacheConfig {
            max_entries: 4096,
            ttl: Duration::from_secs(604_800),
        }
    }

    fn attrs(city: &str) -> AttributeSet {
        match json!({ "city": city, "country": "US" }) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_put_get_within_ttl() {
        let cache = TtlLruCache::new(&test_config());

        cache.put("8.8.8.8", attrs("Mountain View"));
        assert_eq!(cache.get("8.8.8.8"), Some(attrs("Mountain View")));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 0);
    }

    #[test]
    fn test_get_nonexistent() {
        let cache = TtlLruCache::new(&test_config());

        assert_eq!(cache.get("1.1.1.1"), None);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_put_replaces_without_eviction() {
        let cache = TtlLruCache::new(&test_config());

        cache.put("8.8.8.8", attrs("Old"));
        cache.put("8.8.8.8", attrs("New"));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("8.8.8.8"), Some(attrs("New")));
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_expired_entry_is_absent_and_removed() {
        let cache = TtlLruCache::new(&test_config());
        let start = Instant::now();

        cache.put_at("8.8.8.8", attrs("Mountain View"), start);
        let later = start + cache.ttl() + Duration::from_secs(1);

        assert_eq!(cache.get_at("8.8.8.8", later), None);
        assert!(cache.is_empty());
        assert_eq!(cache.stats().expirations, 1);
    }

    #[test]
    fn test_entry_at_exact_ttl_is_still_fresh() {
        let cache = TtlLruCache::new(&test_config());
        let start = Instant::now();

        cache.put_at("8.8.8.8", attrs("Mountain View"), start);
        let boundary = start + cache.ttl();

        assert_eq!(
            cache.get_at("8.8.8.8", boundary),
            Some(attrs("Mountain View"))
        );
    }

    #[test]
    fn test_overflow_evicts_exactly_one_least_recently_used() {
        let cache = TtlLruCache::new(&test_config());
        let capacity = cache.capacity();
        assert_eq!(capacity, 4096);

        for i in 0..capacity {
            cache.put(&format!("10.0.{}.{}", i / 256, i % 256), attrs("x"));
        }
        assert_eq!(cache.stats().evictions, 0);

        // Touch the oldest entry so the second-oldest becomes least recently used
        assert!(cache.get("10.0.0.0").is_some());

        cache.put("192.168.0.1", attrs("y"));

        assert_eq!(cache.len(), capacity);
        assert_eq!(cache.stats().evictions, 1);
        assert!(cache.get("10.0.0.1").is_none());
        assert!(cache.get("10.0.0.0").is_some());
        assert!(cache.get("192.168.0.1").is_some());
    }

    #[test]
    fn test_zero_capacity_raised_to_one() {
        let cache = TtlLruCache::new(&CacheConfig {
            max_entries: 0,
            ttl: Duration::from_secs(60),
        });
        assert_eq!(cache.capacity(), 1);

        cache.put("1.1.1.1", attrs("a"));
        cache.put("2.2.2.2", attrs("b"));
        assert_eq!(cache.len(), 1);
        assert!(cache.get("2.2.2.2").is_some());
    }

    #[test]
    fn test_backend_name() {
        let cache = TtlLruCache::new(&test_config());
        assert_eq!(cache.backend_name(), "memory");
    }
}
