//! In-memory durable store.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use super::{Entity, EntityId, Repository, StoreError, StoreResult};

#[derive(Debug)]
struct Table<V> {
    rows: BTreeMap<EntityId, V>,
    next_id: EntityId,
}

/// Id-assigning table of records, ordered by id.
#[derive(Debug)]
pub struct InMemoryRepository<V> {
    table: RwLock<Table<V>>,
}

impl<V> Default for InMemoryRepository<V> {
    fn default() -> Self {
        Self {
            table: RwLock::new(Table {
                rows: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }
}

impl<V: Entity> InMemoryRepository<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.table.read().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.read().rows.is_empty()
    }
}

impl<V: Entity> Repository<V> for InMemoryRepository<V> {
    fn find_by_id(&self, id: EntityId) -> StoreResult<Option<V>> {
        Ok(self.table.read().rows.get(&id).cloned())
    }

    fn save(&self, mut value: V) -> StoreResult<V> {
        let mut table = self.table.write();
        let id = match value.id() {
            Some(id) => id,
            None => {
                let id = table.next_id;
                value.set_id(id);
                id
            }
        };
        table.next_id = table.next_id.max(id.saturating_add(1));
        table.rows.insert(id, value.clone());
        Ok(value)
    }

    fn delete(&self, value: &V) -> StoreResult<()> {
        let id = value.id().ok_or_else(|| {
            StoreError::Backend(format!("cannot delete an unsaved {}", V::KIND))
        })?;
        self.table
            .write()
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound { kind: V::KIND, id })
    }

    fn find_all(&self) -> StoreResult<Vec<V>> {
        Ok(self.table.read().rows.values().cloned().collect())
    }
}
