//! Persistence gateway for aggregate snapshots.
//!
//! Each aggregate is stored as a whole serialized document keyed by its id,
//! grouped by collection. The latest state wins; there is no version check.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use antiwaste_core::AggregateId;

mod documents;
pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryRepository;
pub use postgres::{PostgresRepository, ensure_schema};

/// An aggregate that can be persisted as a document.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection (table partition) the documents live in.
    const COLLECTION: &'static str;

    fn document_id(&self) -> AggregateId;
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{collection} {id} already exists")]
    Duplicate { collection: &'static str, id: AggregateId },

    #[error("{collection} {id} does not exist")]
    NotFound { collection: &'static str, id: AggregateId },

    /// A unique index other than the primary key rejected the write.
    #[error("unique constraint violated: {0}")]
    Unique(String),

    #[error("document (de)serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage failure: {0}")]
    Storage(String),
}

/// CRUD gateway for one aggregate type.
#[async_trait]
pub trait Repository<T: Document>: Send + Sync {
    async fn get(&self, id: AggregateId) -> Result<Option<T>, RepositoryError>;

    /// Insert a new document. Fails with `Duplicate` if the id is taken.
    async fn add(&self, doc: &T) -> Result<(), RepositoryError>;

    /// Replace an existing document. Fails with `NotFound` if absent.
    async fn update(&self, doc: &T) -> Result<(), RepositoryError>;

    async fn delete(&self, id: AggregateId) -> Result<(), RepositoryError>;

    /// All documents, oldest id first.
    async fn list(&self) -> Result<Vec<T>, RepositoryError>;
}
