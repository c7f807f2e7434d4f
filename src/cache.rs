//! Freshness cache
//!
//! TTL-keyed store of accepted snapshots. Entries expire lazily: an
//! expired entry is treated as a miss (and evicted) on the next lookup,
//! no background eviction task. The cache makes no freshness judgment
//! of its own; that lives in the engine.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::types::RateSnapshot;

/// Cache key for an auto-selected fetch
pub fn generic_key(base: &str) -> String {
    base.to_string()
}

/// Cache key for a source-pinned fetch
pub fn pinned_key(base: &str, source: &str) -> String {
    format!("{base}_{source}")
}

struct CacheEntry {
    snapshot: Arc<RateSnapshot>,
    expires_at: DateTime<Utc>,
}

/// Shared TTL cache; last write wins for concurrent puts on one key
pub struct FreshnessCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl FreshnessCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Look up a snapshot; expired entries are misses and get evicted
    pub async fn get(&self, key: &str) -> Option<Arc<RateSnapshot>> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.expires_at > Utc::now() => {
                    return Some(Arc::clone(&entry.snapshot))
                }
                Some(_) => {}
                None => return None,
            }
        }

        // Entry was expired under the read lock; evict it unless a
        // concurrent put refreshed the key in between.
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get(key) {
            if entry.expires_at > Utc::now() {
                return Some(Arc::clone(&entry.snapshot));
            }
            entries.remove(key);
        }
        None
    }

    /// Store a snapshot, overwriting any existing entry unconditionally
    pub async fn put(&self, key: String, snapshot: Arc<RateSnapshot>, ttl: Duration) {
        let entry = CacheEntry {
            snapshot,
            expires_at: Utc::now() + ttl,
        };
        self.entries.write().await.insert(key, entry);
    }
}

impl Default for FreshnessCache {
    fn default() -> Self {
        Self::new()
    }
}
