//! Repository Module
//!
//! The durable store contract consumed by the cached facades, plus an in-memory
//! implementation used by the server and the tests.

mod memory;

pub use memory::InMemoryRepository;

use thiserror::Error;

/// Identifier of every persisted entity.
pub type EntityId = u32;

// == Entity ==
/// A record the durable store can persist.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Human readable type name used in messages
    const KIND: &'static str;

    /// Returns the id, or `None` for a record that was never saved.
    fn id(&self) -> Option<EntityId>;

    fn set_id(&mut self, id: EntityId);
}

// == Store Error ==
/// Failures reported by a durable store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The record does not exist
    #[error("{kind} not found with id: {id}")]
    NotFound { kind: &'static str, id: EntityId },

    /// Any other backend failure
    #[error("Store failure: {0}")]
    Backend(String),
}

/// Result type of the store contract.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

// == Repository ==
/// Synchronous repository contract.
///
/// Implementations are treated as reliable; the cache layer never retries.
pub trait Repository<V: Entity>: Send + Sync {
    fn find_by_id(&self, id: EntityId) -> StoreResult<Option<V>>;

    /// Inserts a new record (assigning its id) or replaces an existing one.
    fn save(&self, value: V) -> StoreResult<V>;

    fn delete(&self, value: &V) -> StoreResult<()>;

    fn find_all(&self) -> StoreResult<Vec<V>>;
}

impl<V: Entity, R: Repository<V> + ?Sized> Repository<V> for std::sync::Arc<R> {
    fn find_by_id(&self, id: EntityId) -> StoreResult<Option<V>> {
        (**self).find_by_id(id)
    }

    fn save(&self, value: V) -> StoreResult<V> {
        (**self).save(value)
    }

    fn delete(&self, value: &V) -> StoreResult<()> {
        (**self).delete(value)
    }

    fn find_all(&self) -> StoreResult<Vec<V>> {
        (**self).find_all()
    }
}
