//! Cache entry, key, and statistics types

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Digest identifying a cacheable request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey(pub(crate) String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Controls which request facets participate in key derivation.
#[derive(Debug, Clone, Copy)]
pub struct KeyOptions {
    /// Include user-supplied key/value input in the digest. On by default:
    /// user input reaches the provider, so requests differing only in it
    /// are distinct. Opt out only for page-level results.
    pub include_user_context: bool,
    /// Include the context capture timestamp (bucketed to the minute) so
    /// entries age out with the page snapshot.
    pub include_timestamp: bool,
}

impl Default for KeyOptions {
    fn default() -> Self {
        Self {
            include_user_context: true,
            include_timestamp: false,
        }
    }
}

/// One cached value with its expiry.
#[derive(Debug, Clone)]
pub(crate) struct CacheEntry<T> {
    pub value: T,
    pub expires_at: Instant,
    pub last_accessed: Instant,
}

impl<T> CacheEntry<T> {
    pub fn new(value: T, ttl: Duration) -> Self {
        let now = Instant::now();
        Self {
            value,
            expires_at: now + ttl,
            last_accessed: now,
        }
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    pub fn mark_accessed(&mut self) {
        self.last_accessed = Instant::now();
    }
}

/// Lock-free hit/miss counters for the hot path.
#[derive(Debug, Default)]
pub(crate) struct AtomicCacheStats {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub evictions: AtomicU64,
}

impl AtomicCacheStats {
    pub fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.evictions.store(0, Ordering::Relaxed);
    }
}

/// Point-in-time view of cache effectiveness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
