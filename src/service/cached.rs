//! Cached Repository Module
//!
//! Read-through/write-through facade placing one [`AccountedCache`] in front of
//! a durable [`Repository`].

use std::marker::PhantomData;
use std::sync::Arc;

use tracing::{debug, info};

use crate::cache::{AccountedCache, Admission, CacheStats, EstimateSize};
use crate::repository::{Entity, EntityId, Repository, StoreError, StoreResult};
use crate::tasks::{PeriodicSweeper, SweeperHandle};

// == Cached Repository ==
/// Facade over a store with a bounded side-cache keyed by entity id.
///
/// The store stays authoritative: every mutation is persisted before the
/// cache is touched, and a failed store call leaves the cache as it was.
/// Cache conditions (miss, rejected admission) never surface as errors.
pub struct CachedRepository<V, R>
where
    V: Entity + EstimateSize,
{
    store: R,
    cache: Arc<AccountedCache<EntityId, V>>,
    sweeper: Option<SweeperHandle>,
    _entity: PhantomData<fn() -> V>,
}

impl<V, R> CachedRepository<V, R>
where
    V: Entity + EstimateSize,
    R: Repository<V>,
{
    // == Constructor ==
    /// Wraps `store` with a fresh cache named `name`, bounded to `ceiling` bytes.
    pub fn new(name: &'static str, store: R, ceiling: u64) -> Self {
        Self {
            store,
            cache: Arc::new(AccountedCache::new(name, ceiling)),
            sweeper: None,
            _entity: PhantomData,
        }
    }

    /// Starts `sweeper` against this facade's cache. The sweeper runs until
    /// [`shutdown`](Self::shutdown) or until the facade is dropped.
    pub fn with_sweeper(mut self, sweeper: &PeriodicSweeper) -> Self {
        if let Some(previous) = self.sweeper.take() {
            previous.stop();
        }
        self.sweeper = Some(sweeper.start(self.cache.clone()));
        self
    }

    pub fn name(&self) -> &'static str {
        self.cache.name()
    }

    pub fn store(&self) -> &R {
        &self.store
    }

    pub fn cache(&self) -> &Arc<AccountedCache<EntityId, V>> {
        &self.cache
    }

    pub fn sweeper(&self) -> Option<&SweeperHandle> {
        self.sweeper.as_ref()
    }

    // == Lookup ==
    /// Returns the entity with `id`, reading through to the store on a miss.
    ///
    /// A value found in the store is offered to the cache; if the memory
    /// ceiling refuses it, it is still returned. It is not cached when a write
    /// reached this cache while the store was being read.
    pub fn lookup_by_id(&self, id: EntityId) -> StoreResult<Option<V>> {
        if let Some(cached) = self.cache.get(&id) {
            return Ok(Some(cached));
        }

        let generation = self.cache.generation();
        let found = self.store.find_by_id(id)?;
        if let Some(value) = &found {
            self.cache.admit_if_unchanged(id, value.clone(), generation);
        }
        Ok(found)
    }

    /// Like [`lookup_by_id`](Self::lookup_by_id), with absence as an error.
    pub fn require(&self, id: EntityId) -> StoreResult<V> {
        self.lookup_by_id(id)?
            .ok_or(StoreError::NotFound { kind: V::KIND, id })
    }

    /// Every stored entity, straight from the store.
    pub fn find_all(&self) -> StoreResult<Vec<V>> {
        self.store.find_all()
    }

    // == Create ==
    /// Persists a new entity and caches the saved copy.
    pub fn create(&self, value: V) -> StoreResult<V> {
        let saved = self.store.save(value)?;
        if let Some(id) = saved.id() {
            self.cache.admit(id, saved.clone());
        }
        Ok(saved)
    }

    // == Update ==
    /// Replaces the entity with `id` by `value`.
    ///
    /// The cached copy is replaced by the persisted one, or evicted if the new
    /// value does not fit.
    pub fn update(&self, id: EntityId, mut value: V) -> StoreResult<V> {
        self.require(id)?;

        value.set_id(id);
        let saved = self.store.save(value)?;
        if self.cache.admit(id, saved.clone()) == Admission::Admitted {
            info!(cache = self.name(), id, "updated in cache");
        }
        Ok(saved)
    }

    // == Delete ==
    /// Deletes the entity with `id` from the store, then from the cache.
    ///
    /// Returns the removed entity.
    pub fn delete(&self, id: EntityId) -> StoreResult<V> {
        let existing = self.require(id)?;
        self.store.delete(&existing)?;
        self.cache.evict(&id);
        Ok(existing)
    }

    // == Invalidate All ==
    /// Clears the whole cache and resets its accounting.
    pub fn invalidate_all(&self) -> usize {
        let removed = self.cache.clear();
        info!("{} cache cleared: {} entries dropped", self.name(), removed);
        removed
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Stops the sweeper, if any, and waits for it to exit.
    pub async fn shutdown(&self) {
        if let Some(sweeper) = &self.sweeper {
            sweeper.shutdown().await;
            debug!("Sweeper for {} cache shut down", sweeper.name());
        }
    }
}

impl<V, R> std::fmt::Debug for CachedRepository<V, R>
where
    V: Entity + EstimateSize,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedRepository")
            .field("cache", &self.cache.name())
            .field("entries", &self.cache.len())
            .field("sweeping", &self.sweeper.is_some())
            .finish()
    }
}
