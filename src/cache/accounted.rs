//! Accounted Cache Module
//!
//! Binds a [`BoundedCache`] to a [`MemoryAccountant`] so that admission,
//! insertion and removal are recorded together.

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info, warn};

use crate::cache::{
    BoundedCache, CacheStats, EstimateSize, Ledger, MemoryAccountant, StatsRecorder,
};

/// Outcome of offering a value to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The value is now cached
    Admitted,
    /// The ceiling would be exceeded; the value was not cached
    Rejected,
    /// A write landed after the value was read; the value was not cached
    Stale,
}

// == Accounted Cache ==
/// A named cache whose memory usage is bounded by its accountant.
///
/// Reads go straight to the map. Every mutation runs while holding the
/// accountant's ledger, which keeps the running total equal to the sum of the
/// estimated sizes of the cached values.
///
/// The generation moves on every write-path mutation. A reader that fetched a
/// value from the store before the generation moved must not cache it.
#[derive(Debug)]
pub struct AccountedCache<K, V> {
    name: &'static str,
    entries: BoundedCache<K, V>,
    accountant: MemoryAccountant,
    stats: StatsRecorder,
    generation: AtomicU64,
}

impl<K, V> AccountedCache<K, V>
where
    K: Eq + Hash + Copy + Debug,
    V: Clone + EstimateSize,
{
    // == Constructor ==
    /// Creates an empty cache bounded to `ceiling` bytes.
    pub fn new(name: &'static str, ceiling: u64) -> Self {
        Self {
            name,
            entries: BoundedCache::new(),
            accountant: MemoryAccountant::new(ceiling),
            stats: StatsRecorder::new(),
            generation: AtomicU64::new(0),
        }
    }

    /// Current write generation. Read it before fetching from the store and
    /// hand it to [`admit_if_unchanged`](Self::admit_if_unchanged).
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    fn bump(&self, _ledger: &Ledger<'_>) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    // == Get ==
    /// Returns the cached value and records a hit or a miss.
    pub fn get(&self, key: &K) -> Option<V> {
        let cached = self.entries.get(key);
        match cached {
            Some(_) => {
                self.stats.record_hit();
                debug!(cache = self.name, ?key, "retrieved from cache");
            }
            None => self.stats.record_miss(),
        }
        cached
    }

    // == Admit ==
    /// Offers `value` for `key` on a write path, replacing any cached value.
    ///
    /// The replaced entry's bytes are released before the ceiling is checked.
    /// A rejected replacement evicts the old entry so no stale value survives.
    pub fn admit(&self, key: K, value: V) -> Admission {
        let mut ledger = self.accountant.lock();
        self.bump(&ledger);
        self.admit_locked(&mut ledger, key, value)
    }

    /// Offers a value read from the store, unless a write-path mutation
    /// happened since `generation` was observed.
    pub fn admit_if_unchanged(&self, key: K, value: V, generation: u64) -> Admission {
        let mut ledger = self.accountant.lock();
        if self.generation.load(Ordering::Acquire) != generation {
            drop(ledger);
            debug!(cache = self.name, ?key, "skipped caching, a write landed since the read");
            return Admission::Stale;
        }
        self.admit_locked(&mut ledger, key, value)
    }

    fn admit_locked(&self, ledger: &mut Ledger<'_>, key: K, value: V) -> Admission {
        let size = value.estimated_size();
        let released = self.entries.peek(&key, |old| old.estimated_size()).unwrap_or(0);

        if ledger.try_replace(released, size) {
            self.entries.put(key, value);
            info!(cache = self.name, ?key, size, "added to cache");
            return Admission::Admitted;
        }

        if self.entries.evict(&key).is_some() {
            ledger.record_remove(released);
        }

        self.stats.record_rejection();
        warn!(cache = self.name, ?key, size, "cannot cache value - memory limit would be exceeded");
        Admission::Rejected
    }

    // == Evict ==
    /// Removes `key` and releases its bytes. No-op if absent.
    pub fn evict(&self, key: &K) -> Option<V> {
        let mut ledger = self.accountant.lock();
        self.bump(&ledger);
        let removed = self.entries.evict(key)?;
        ledger.record_remove(removed.estimated_size());
        drop(ledger);

        self.stats.record_eviction();
        info!(cache = self.name, ?key, "evicted from cache");
        Some(removed)
    }

    // == Clear ==
    /// Drops every entry and resets the running total.
    pub fn clear(&self) -> usize {
        let mut ledger = self.accountant.lock();
        self.bump(&ledger);
        let removed = self.entries.clear();
        ledger.reset();
        drop(ledger);

        self.stats.record_sweep();
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn memory_used(&self) -> u64 {
        self.accountant.used()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
            .snapshot(self.entries.len(), self.accountant.used(), self.accountant.ceiling())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[derive(Debug, Clone, PartialEq)]
    struct Blob(u64);

    impl EstimateSize for Blob {
        fn estimated_size(&self) -> u64 {
            self.0
        }
    }

    #[test]
    fn test_admit_records_size() {
        let cache = AccountedCache::new("blobs", 1000);

        assert_eq!(cache.admit(1, Blob(300)), Admission::Admitted);
        assert_eq!(cache.admit(2, Blob(200)), Admission::Admitted);

        assert_eq!(cache.memory_used(), 500);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_admit_over_ceiling_is_rejected() {
        let cache = AccountedCache::new("blobs", 100);

        assert_eq!(cache.admit(1, Blob(101)), Admission::Rejected);

        assert!(cache.is_empty());
        assert_eq!(cache.memory_used(), 0);
        assert_eq!(cache.stats().rejected, 1);
    }

    #[test]
    fn test_overwrite_releases_previous_bytes() {
        let cache = AccountedCache::new("blobs", 1000);
        cache.admit(1, Blob(600));

        // would not fit on top of the old 600, fits once it is released
        assert_eq!(cache.admit(1, Blob(900)), Admission::Admitted);
        assert_eq!(cache.memory_used(), 900);
        assert_eq!(cache.get(&1), Some(Blob(900)));
    }

    #[test]
    fn test_rejected_overwrite_evicts_stale_value() {
        let cache = AccountedCache::new("blobs", 1000);
        cache.admit(1, Blob(400));

        assert_eq!(cache.admit(1, Blob(2000)), Admission::Rejected);

        assert!(cache.get(&1).is_none());
        assert_eq!(cache.memory_used(), 0);
    }

    #[test]
    fn test_evict_releases_bytes() {
        let cache = AccountedCache::new("blobs", 1000);
        cache.admit(1, Blob(250));

        assert_eq!(cache.evict(&1), Some(Blob(250)));
        assert_eq!(cache.evict(&1), None);
        assert_eq!(cache.memory_used(), 0);
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_clear_resets_accounting() {
        let cache = AccountedCache::new("blobs", 1000);
        cache.admit(1, Blob(100));
        cache.admit(2, Blob(100));

        assert_eq!(cache.clear(), 2);
        assert!(cache.is_empty());
        assert_eq!(cache.memory_used(), 0);
        assert_eq!(cache.stats().sweeps, 1);
    }

    #[test]
    fn test_admit_if_unchanged_skips_after_write() {
        let cache = AccountedCache::new("blobs", 1000);
        let seen = cache.generation();

        cache.evict(&1);

        assert_eq!(cache.admit_if_unchanged(1, Blob(10), seen), Admission::Stale);
        assert!(cache.is_empty());
        assert_eq!(cache.memory_used(), 0);
        assert_eq!(cache.stats().rejected, 0);
    }

    #[test]
    fn test_admit_if_unchanged_caches_when_quiet() {
        let cache = AccountedCache::new("blobs", 1000);
        cache.admit(2, Blob(10));
        let seen = cache.generation();

        // reads and read-path fills do not move the generation
        cache.get(&1);
        assert_eq!(cache.admit_if_unchanged(1, Blob(20), seen), Admission::Admitted);
        assert_eq!(cache.generation(), seen);
        assert_eq!(cache.memory_used(), 30);
    }

    #[test]
    fn test_write_paths_move_generation() {
        let cache = AccountedCache::new("blobs", 1000);
        let start = cache.generation();

        cache.admit(1, Blob(10));
        cache.evict(&1);
        cache.clear();

        assert_eq!(cache.generation(), start + 3);
    }

    #[test]
    fn test_get_records_hits_and_misses() {
        let cache = AccountedCache::new("blobs", 1000);
        cache.admit(1, Blob(10));

        assert!(cache.get(&1).is_some());
        assert!(cache.get(&2).is_none());

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_concurrent_put_evict_cycles_keep_exact_total() {
        const CALLERS: u32 = 100;
        const CYCLES: u32 = 1000;
        const SIZE: u64 = 128;

        let cache = Arc::new(AccountedCache::new("blobs", u64::MAX));
        let handles: Vec<_> = (0..CALLERS)
            .map(|caller| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    let key = caller;
                    for _ in 0..CYCLES {
                        assert_eq!(cache.admit(key, Blob(SIZE)), Admission::Admitted);
                        cache.evict(&key);
                    }
                    // every caller leaves exactly one entry behind
                    cache.admit(key, Blob(SIZE));
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), CALLERS as usize);
        assert_eq!(cache.memory_used(), CALLERS as u64 * SIZE);
    }

    #[test]
    fn test_concurrent_admission_never_exceeds_ceiling() {
        let cache = Arc::new(AccountedCache::new("blobs", 1000));
        let handles: Vec<_> = (0..50u32)
            .map(|key| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || cache.admit(key, Blob(100)))
            })
            .collect();

        let admitted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|a| *a == Admission::Admitted)
            .count();

        assert_eq!(admitted, 10);
        assert_eq!(cache.memory_used(), 1000);
        assert_eq!(cache.len(), 10);
    }
}
