//! Capacity- and TTL-bounded cache with LRU eviction.
//!
//! Entries expire on a sliding window: every successful `get` resets the
//! entry's clock. Expired entries are removed lazily on access or in bulk by
//! [`BoundedCache::sweep_expired`].

use std::hash::Hash;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use lru::LruCache;
use tokio::sync::Mutex;

use courtside_core::cache::{CacheConfig, CacheError};

/// A cached value and the last time it was read or written.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    last_accessed: Instant,
}

impl<V> CacheEntry<V> {
    fn new(value: V) -> Self {
        Self {
            value,
            last_accessed: Instant::now(),
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.last_accessed.elapsed() >= ttl
    }
}

/// Thread-safe key/value cache holding at most `max_entries` values.
///
/// A single mutex guards the LRU map. Callers never hold it across I/O, so a
/// slow repository on a cache miss does not block other readers.
#[derive(Debug)]
pub struct BoundedCache<K: Hash + Eq, V> {
    entries: Mutex<LruCache<K, CacheEntry<V>>>,
    capacity: NonZeroUsize,
    ttl: Duration,
}

impl<K, V> BoundedCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Creates an empty cache, rejecting a zero capacity.
    pub fn new(config: CacheConfig) -> Result<Self, CacheError> {
        let capacity = NonZeroUsize::new(config.max_entries).ok_or(CacheError::ZeroCapacity)?;
        Ok(Self {
            entries: Mutex::new(LruCache::new(capacity)),
            capacity,
            ttl: config.ttl,
        })
    }

    /// Returns the value for `key` and resets its TTL.
    ///
    /// An expired entry is removed and reported as absent.
    pub async fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.lock().await;

        if entries.peek(key)?.is_expired(self.ttl) {
            entries.pop(key);
            return None;
        }

        let entry = entries.get_mut(key)?;
        entry.last_accessed = Instant::now();
        Some(entry.value.clone())
    }

    /// Inserts or overwrites `key`, evicting the least recently used entry
    /// when the cache is full.
    pub async fn put(&self, key: K, value: V) {
        let mut entries = self.entries.lock().await;
        entries.put(key, CacheEntry::new(value));
    }

    /// Removes `key`, returning its value if it was cached and still live.
    pub async fn invalidate(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.lock().await;
        entries
            .pop(key)
            .filter(|entry| !entry.is_expired(self.ttl))
            .map(|entry| entry.value)
    }

    /// Drops every entry.
    #[cfg(test)]
    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    #[cfg(test)]
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Replaces the whole contents with `items` if `still_current` holds.
    ///
    /// The new map is built before the lock is taken and swapped in with a
    /// single assignment, so readers see either the old or the new snapshot.
    /// `still_current` runs under the lock; when it returns `false` the
    /// snapshot is dropped and the cache is left as is. When `items` exceeds
    /// the capacity, later items win.
    pub async fn replace_all_if<I, F>(&self, items: I, still_current: F) -> bool
    where
        I: IntoIterator<Item = (K, V)>,
        F: FnOnce() -> bool,
    {
        let mut fresh = LruCache::new(self.capacity);
        for (key, value) in items {
            fresh.put(key, CacheEntry::new(value));
        }

        let mut entries = self.entries.lock().await;
        if !still_current() {
            return false;
        }
        *entries = fresh;
        true
    }

    /// Drops every expired entry, returning how many were removed.
    pub async fn sweep_expired(&self) -> usize {
        let mut entries = self.entries.lock().await;
        let expired: Vec<K> = entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(self.ttl))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            entries.pop(key);
        }
        expired.len()
    }
}
