//! Response caching
//!
//! Two-tier cache (L1 LRU for hot entries, L2 TTL map) keyed by a digest of
//! the request's semantic fields. Caching optimizes latency, not
//! correctness: reads happen before dispatch and writes after success with
//! no lock spanning the call, so rare duplicate computation on races is
//! accepted.

mod manager;
mod types;


pub use manager::ResponseCache;
pub use types::{CacheKey, CacheStats, KeyOptions};
