use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use antiwaste_core::AggregateId;

use super::{Document, Repository, RepositoryError};

/// In-memory repository for tests/dev.
///
/// Keys are the raw UUIDs; ids are v7, so iteration order is creation order.
#[derive(Debug)]
pub struct InMemoryRepository<T> {
    inner: RwLock<BTreeMap<Uuid, T>>,
}

impl<T> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<T> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> RepositoryError {
    RepositoryError::Storage("in-memory repository lock poisoned".to_string())
}

#[async_trait]
impl<T: Document> Repository<T> for InMemoryRepository<T> {
    async fn get(&self, id: AggregateId) -> Result<Option<T>, RepositoryError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(id.as_uuid()).cloned())
    }

    async fn add(&self, doc: &T) -> Result<(), RepositoryError> {
        let id = doc.document_id();
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        if map.contains_key(id.as_uuid()) {
            return Err(RepositoryError::Duplicate {
                collection: T::COLLECTION,
                id,
            });
        }
        map.insert(*id.as_uuid(), doc.clone());
        Ok(())
    }

    async fn update(&self, doc: &T) -> Result<(), RepositoryError> {
        let id = doc.document_id();
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        match map.get_mut(id.as_uuid()) {
            Some(slot) => {
                *slot = doc.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound {
                collection: T::COLLECTION,
                id,
            }),
        }
    }

    async fn delete(&self, id: AggregateId) -> Result<(), RepositoryError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        map.remove(id.as_uuid())
            .map(|_| ())
            .ok_or(RepositoryError::NotFound {
                collection: T::COLLECTION,
                id,
            })
    }

    async fn list(&self) -> Result<Vec<T>, RepositoryError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.values().cloned().collect())
    }
}
