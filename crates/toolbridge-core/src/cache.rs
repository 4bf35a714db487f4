//! In-process key-value cache with TTL-based expiration.
//!
//! Backend clients use this to avoid re-fetching slow-changing data
//! (project lists, organization lookups, GET responses) on every tool call.
//! Nothing is persisted; the cache lives and dies with the process.
//!
//! # Usage
//!
//! ```rust
//! use std::time::Duration;
//! use toolbridge_core::TtlCache;
//!
//! let cache: TtlCache<String, u32> = TtlCache::new(Duration::from_secs(60));
//! cache.insert("answer".to_string(), 42);
//! assert_eq!(cache.get(&"answer".to_string()), Some(42));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// Thread-safe TTL cache.
///
/// Expired entries are invisible to readers and are dropped lazily, on
/// a read of the same key or by the sweep in [`TtlCache::insert`].
pub struct TtlCache<K, V> {
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
    default_ttl: Duration,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Create a cache whose entries live for `default_ttl`.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get a cached value if it exists and has not expired.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if Instant::now() < entry.expires_at => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Insert or replace a value. Expired entries are swept first, so keys
    /// that are never read again do not accumulate.
    pub fn insert(&self, key: K, value: V) {
        let now = Instant::now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| now < entry.expires_at);
        let swept = before - entries.len();
        if swept > 0 {
            tracing::trace!(swept, "cache sweep");
        }
        let expires_at = now + self.default_ttl;
        entries.insert(key, CacheEntry { value, expires_at });
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of live (non-expired) entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.lock()
            .values()
            .filter(|entry| now < entry.expires_at)
            .count()
    }

    /// Returns `true` if there are no live entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> fmt::Debug for TtlCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let size = self
            .entries
            .lock()
            .map(|entries| entries.len())
            .unwrap_or_default();
        f.debug_struct("TtlCache")
            .field("default_ttl", &self.default_ttl)
            .field("entries", &size)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
