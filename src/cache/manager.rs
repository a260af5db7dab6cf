//! Two-tier response cache

use super::types::{AtomicCacheStats, CacheEntry, CacheKey, CacheStats, KeyOptions};
use crate::config::CacheConfig;
use crate::types::{AIRequest, AIResponse};
use dashmap::DashMap;
use lru::LruCache;
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use std::num::NonZeroUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// L1 holds a tenth of the configured capacity, with a floor.
const L1_FLOOR: usize = 32;

/// In-memory response cache with an LRU hot tier over a TTL map.
pub struct ResponseCache {
    l1: RwLock<LruCache<CacheKey, CacheEntry<AIResponse>>>,
    l2: DashMap<CacheKey, CacheEntry<AIResponse>>,
    config: CacheConfig,
    stats: Arc<AtomicCacheStats>,
}

impl ResponseCache {
    pub fn new(config: CacheConfig) -> Self {
        let l1_capacity = NonZeroUsize::new((config.max_entries / 10).max(L1_FLOOR))
            .unwrap_or(NonZeroUsize::MIN);

        Self {
            l1: RwLock::new(LruCache::new(l1_capacity)),
            l2: DashMap::new(),
            config,
            stats: Arc::new(AtomicCacheStats::default()),
        }
    }

    /// Derives the cache key from a request's semantic fields.
    ///
    /// Prompt, task type, output format, domain, and (by default) user
    /// input participate; `options` can exclude user input or add a
    /// minute-bucketed context timestamp.
    pub fn generate_key(&self, request: &AIRequest, options: KeyOptions) -> CacheKey {
        let mut hasher = Sha256::new();
        hasher.update(request.prompt.as_bytes());
        hasher.update([0]);
        hasher.update(request.task_type.as_str().as_bytes());
        hasher.update([0]);
        hasher.update(request.output_format.as_str().as_bytes());
        hasher.update([0]);
        hasher.update(request.context.domain.as_bytes());

        if options.include_user_context {
            if let Some(input) = &request.user_input {
                let mut keys: Vec<_> = input.keys().collect();
                keys.sort();
                for key in keys {
                    hasher.update([0]);
                    hasher.update(key.as_bytes());
                    hasher.update([1]);
                    hasher.update(input[key].as_bytes());
                }
            }
        }

        if options.include_timestamp {
            let minute = request.context.timestamp.timestamp() / 60;
            hasher.update(minute.to_be_bytes());
        }

        CacheKey(hex::encode(hasher.finalize()))
    }

    /// Looks up a response, promoting L2 hits into L1.
    pub fn get(&self, key: &CacheKey) -> Option<AIResponse> {
        {
            let mut l1 = self.l1.write();
            if let Some(entry) = l1.get_mut(key) {
                if !entry.is_expired() {
                    entry.mark_accessed();
                    self.stats.hits.fetch_add(1, Ordering::Relaxed);
                    debug!(key = %key.as_str(), "l1 cache hit");
                    return Some(entry.value.clone());
                }
                l1.pop(key);
            }
        }

        if let Some(mut entry) = self.l2.get_mut(key) {
            if !entry.is_expired() {
                entry.mark_accessed();
                self.l1.write().put(key.clone(), entry.clone());
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key.as_str(), "l2 cache hit");
                return Some(entry.value.clone());
            }
            drop(entry);
            self.l2.remove(key);
        }

        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Stores a response under the given key.
    pub fn set(&self, key: CacheKey, response: AIResponse, ttl: Option<Duration>) {
        if !self.config.enabled {
            return;
        }

        let ttl = ttl.unwrap_or_else(|| self.config.default_ttl());
        self.l2.insert(key, CacheEntry::new(response, ttl));

        if self.l2.len() > self.config.max_entries {
            self.evict();
        }
    }

    /// Drops expired entries, then the least recently accessed survivors if
    /// the map is still over capacity.
    fn evict(&self) {
        let mut removed = 0u64;
        self.l2.retain(|_, entry| {
            if entry.is_expired() {
                removed += 1;
                false
            } else {
                true
            }
        });

        let over = self.l2.len().saturating_sub(self.config.max_entries);
        if over > 0 {
            let mut by_access: Vec<(CacheKey, std::time::Instant)> = self
                .l2
                .iter()
                .map(|e| (e.key().clone(), e.value().last_accessed))
                .collect();
            by_access.sort_by_key(|(_, at)| *at);
            for (key, _) in by_access.into_iter().take(over) {
                self.l2.remove(&key);
                removed += 1;
            }
        }

        if removed > 0 {
            self.stats.evictions.fetch_add(removed, Ordering::Relaxed);
            debug!(
                removed,
                hit_rate = self.stats.snapshot().hit_rate(),
                "cache eviction pass"
            );
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    pub fn clear(&self) {
        self.l1.write().clear();
        self.l2.clear();
        self.stats.reset();
    }
}
