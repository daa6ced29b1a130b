//! Postgres-backed document repository.
//!
//! All aggregates share one `documents` table keyed by `(collection, id)`
//! with the serialized aggregate in a JSONB `body` column. Schema lives in
//! `crates/infra/migrations/`.
//!
//! ## Error Mapping
//!
//! | Situation | RepositoryError |
//! |-----------|-----------------|
//! | `INSERT` conflicts on the primary key | `Duplicate` |
//! | another unique index rejects the row (one seller per user) | `Unique` |
//! | `UPDATE`/`DELETE` touched no row | `NotFound` |
//! | body does not decode into the aggregate | `Serialization` |
//! | any other sqlx error | `Storage` |

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tracing::instrument;

use antiwaste_core::AggregateId;

use super::{Document, Repository, RepositoryError};

const SCHEMA: &str = include_str!("../../migrations/0001_documents.sql");

/// Create the `documents` table if it does not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), RepositoryError> {
    sqlx::raw_sql(SCHEMA)
        .execute(pool)
        .await
        .map_err(|e| map_sqlx_error("ensure_schema", e))?;
    Ok(())
}

/// Postgres repository for one document collection.
///
/// Cheap to clone; the pool is shared.
#[derive(Debug)]
pub struct PostgresRepository<T> {
    pool: Arc<PgPool>,
    _doc: PhantomData<fn() -> T>,
}

impl<T> Clone for PostgresRepository<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _doc: PhantomData,
        }
    }
}

impl<T> PostgresRepository<T> {
    pub fn new(pool: PgPool) -> Self {
        Self::from_shared(Arc::new(pool))
    }

    pub fn from_shared(pool: Arc<PgPool>) -> Self {
        Self {
            pool,
            _doc: PhantomData,
        }
    }
}

fn decode<T: Document>(row: &sqlx::postgres::PgRow) -> Result<T, RepositoryError> {
    let Json(body): Json<JsonValue> = row
        .try_get("body")
        .map_err(|e| map_sqlx_error("decode_body", e))?;
    Ok(serde_json::from_value(body)?)
}

#[async_trait]
impl<T: Document> Repository<T> for PostgresRepository<T> {
    #[instrument(skip(self), fields(collection = T::COLLECTION, id = %id), err)]
    async fn get(&self, id: AggregateId) -> Result<Option<T>, RepositoryError> {
        let row = sqlx::query("SELECT body FROM documents WHERE collection = $1 AND id = $2")
            .bind(T::COLLECTION)
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get", e))?;

        row.as_ref().map(decode::<T>).transpose()
    }

    #[instrument(skip(self, doc), fields(collection = T::COLLECTION, id = %doc.document_id()), err)]
    async fn add(&self, doc: &T) -> Result<(), RepositoryError> {
        let id = doc.document_id();
        let body = serde_json::to_value(doc)?;

        let result = sqlx::query(
            r#"
            INSERT INTO documents (collection, id, body)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id) DO NOTHING
            "#,
        )
        .bind(T::COLLECTION)
        .bind(id.as_uuid())
        .bind(Json(body))
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("add", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::Duplicate {
                collection: T::COLLECTION,
                id,
            });
        }
        Ok(())
    }

    #[instrument(skip(self, doc), fields(collection = T::COLLECTION, id = %doc.document_id()), err)]
    async fn update(&self, doc: &T) -> Result<(), RepositoryError> {
        let id = doc.document_id();
        let body = serde_json::to_value(doc)?;

        let result = sqlx::query(
            r#"
            UPDATE documents
            SET body = $3, updated_at = now()
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(T::COLLECTION)
        .bind(id.as_uuid())
        .bind(Json(body))
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound {
                collection: T::COLLECTION,
                id,
            });
        }
        Ok(())
    }

    #[instrument(skip(self), fields(collection = T::COLLECTION, id = %id), err)]
    async fn delete(&self, id: AggregateId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(T::COLLECTION)
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound {
                collection: T::COLLECTION,
                id,
            });
        }
        Ok(())
    }

    #[instrument(skip(self), fields(collection = T::COLLECTION), err)]
    async fn list(&self) -> Result<Vec<T>, RepositoryError> {
        let rows = sqlx::query("SELECT body FROM documents WHERE collection = $1 ORDER BY id ASC")
            .bind(T::COLLECTION)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list", e))?;

        rows.iter().map(decode::<T>).collect()
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => RepositoryError::Unique(
            db_err
                .constraint()
                .map(str::to_string)
                .unwrap_or_else(|| format!("{} in {}", db_err.message(), operation)),
        ),
        sqlx::Error::Database(db_err) => {
            RepositoryError::Storage(format!("database error in {}: {}", operation, db_err.message()))
        }
        sqlx::Error::PoolClosed => {
            RepositoryError::Storage(format!("connection pool closed in {}", operation))
        }
        _ => RepositoryError::Storage(format!("sqlx error in {}: {}", operation, err)),
    }
}
