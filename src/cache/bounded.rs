//! Bounded Cache Module
//!
//! Concurrent key-value map with explicit eviction. The map knows nothing about
//! entry sizes; admission and accounting live in [`AccountedCache`].
//!
//! [`AccountedCache`]: crate::cache::AccountedCache

use std::collections::HashMap;
use std::hash::Hash;

use parking_lot::RwLock;

// == Bounded Cache ==
/// Thread-safe map from `K` to `V`.
///
/// Every operation takes the map lock exactly once, so single-key mutations are
/// atomic and `clear` is atomic with respect to concurrent `get`/`put`.
#[derive(Debug)]
pub struct BoundedCache<K, V> {
    entries: RwLock<HashMap<K, V>>,
}

impl<K, V> Default for BoundedCache<K, V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V> BoundedCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    // == Constructor ==
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    // == Get ==
    /// Returns a copy of the cached value, if any. Never touches a backing store.
    pub fn get(&self, key: &K) -> Option<V> {
        self.entries.read().get(key).cloned()
    }

    // == Put ==
    /// Inserts or overwrites `key`, returning the replaced value.
    pub fn put(&self, key: K, value: V) -> Option<V> {
        self.entries.write().insert(key, value)
    }

    // == Evict ==
    /// Removes `key` if present. Evicting a missing key is a no-op.
    pub fn evict(&self, key: &K) -> Option<V> {
        self.entries.write().remove(key)
    }

    // == Clear ==
    /// Drops every entry and returns how many were removed.
    pub fn clear(&self) -> usize {
        let mut entries = self.entries.write();
        let removed = entries.len();
        entries.clear();
        removed
    }

    /// Runs `f` against the cached value without cloning it.
    pub fn peek<R>(&self, key: &K, f: impl FnOnce(&V) -> R) -> Option<R> {
        self.entries.read().get(key).map(f)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.read().contains_key(key)
    }

    // == Length ==
    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
