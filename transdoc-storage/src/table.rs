//! Generic in-memory entity table with versioned records.

use crate::error::{StorageError, StorageResult};
use crate::ops::{EntityOps, StoredEntity, VersionedRecord};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

struct Inner<T> {
    records: HashMap<String, VersionedRecord<T>>,
    /// Insertion order of live record ids; `get_list` replays it.
    order: Vec<String>,
}

/// In-memory reference implementation of [`EntityOps`].
///
/// All mutations run under the write lock, which makes the
/// compare-and-swap in [`EntityOps::update`] atomic per table: of two
/// conflicting writers racing on the same id, the loser observes a bumped
/// version and gets [`StorageError::Conflict`].
#[derive(Clone)]
pub struct MemTable<T> {
    inner: Arc<RwLock<Inner<T>>>,
}

impl<T: StoredEntity> MemTable<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                records: HashMap::new(),
                order: Vec::new(),
            })),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: StoredEntity> Default for MemTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: StoredEntity> EntityOps for MemTable<T> {
    type Record = T;

    async fn create(&self, record: T) -> StorageResult<T> {
        let id = record.id();
        let mut inner = self.inner.write().unwrap();
        if inner.records.contains_key(&id) {
            return Err(StorageError::DuplicateId { id });
        }
        inner.order.push(id.clone());
        inner.records.insert(
            id,
            VersionedRecord {
                record: record.clone(),
                version: 1,
            },
        );
        Ok(record)
    }

    async fn get(&self, id: &str) -> StorageResult<Option<VersionedRecord<T>>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.records.get(id).cloned())
    }

    async fn update(&self, expected_version: u64, record: T) -> StorageResult<T> {
        let id = record.id();
        let mut inner = self.inner.write().unwrap();
        let stored = inner
            .records
            .get_mut(&id)
            .ok_or(StorageError::NotFound { id: id.clone() })?;
        if stored.version != expected_version {
            return Err(StorageError::Conflict {
                id,
                expected: expected_version,
                actual: stored.version,
            });
        }
        stored.record = record.clone();
        stored.version += 1;
        Ok(record)
    }

    async fn delete(&self, id: &str) -> StorageResult<()> {
        let mut inner = self.inner.write().unwrap();
        if inner.records.remove(id).is_none() {
            return Err(StorageError::NotFound { id: id.to_string() });
        }
        inner.order.retain(|o| o != id);
        Ok(())
    }

    async fn get_list(&self, filter: &T::Filter) -> StorageResult<Vec<T>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .order
            .iter()
            .filter_map(|id| inner.records.get(id))
            .filter(|v| v.record.matches(filter))
            .map(|v| v.record.clone())
            .collect())
    }
}
