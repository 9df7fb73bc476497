//! Storage-access layer.
//!
//! # Layout
//!
//! - [`Store`] - the backing store: `PostgreSQL` (JSONB documents) or memory
//! - [`registry`] - [`ModelRegistry`], the name-keyed map of [`Model`] handles
//! - repositories - typed access per entity on top of the handles
//!
//! # Collections
//!
//! Each entity schema names a collection. On `PostgreSQL` a collection is a
//! table created on first use:
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS "users" (
//!     id SERIAL PRIMARY KEY,
//!     doc JSONB NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
//! );
//! CREATE UNIQUE INDEX IF NOT EXISTS "users_email_key" ON "users" ((doc->>'email'));
//! ```

pub mod addresses;
pub mod memory;
pub mod orders;
pub mod postgres;
pub mod products;
pub mod registry;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use quickcart_core::schema::Schema;
use quickcart_core::{Document, Entity, ValidationError};

pub use addresses::AddressRepository;
pub use memory::MemoryStore;
pub use orders::{OrderDetails, OrderRepository, ResolvedItem};
pub use products::ProductRepository;
pub use registry::{Model, ModelRegistry};
pub use users::UserRepository;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The document does not satisfy its schema.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Constraint violation (e.g., duplicate email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Requested document was not found.
    #[error("not found")]
    NotFound,

    /// A payload could not be turned into a JSON object.
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// Data in the store does not decode into its entity.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Backing store for every collection.
#[derive(Debug, Clone)]
pub enum Store {
    /// Documents in `PostgreSQL` JSONB tables.
    Postgres(PgPool),
    /// Documents in process memory.
    Memory(MemoryStore),
}

impl Store {
    /// A fresh, empty in-memory store.
    #[must_use]
    pub fn memory() -> Self {
        Self::Memory(MemoryStore::default())
    }

    /// Create the collection (and unique indexes) if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the DDL fails.
    pub async fn ensure_collection(&self, schema: &'static Schema) -> Result<(), RepositoryError> {
        match self {
            Self::Postgres(pool) => postgres::ensure_collection(pool, schema).await,
            Self::Memory(_) => Ok(()),
        }
    }

    /// Insert an already validated document.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a unique field is taken.
    pub async fn insert(
        &self,
        schema: &'static Schema,
        fields: Map<String, Value>,
    ) -> Result<Document, RepositoryError> {
        match self {
            Self::Postgres(pool) => postgres::insert(pool, schema, fields).await,
            Self::Memory(store) => store.insert(schema, fields).await,
        }
    }

    /// Load a document by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_id(
        &self,
        schema: &'static Schema,
        id: i32,
    ) -> Result<Option<Document>, RepositoryError> {
        match self {
            Self::Postgres(pool) => postgres::find_by_id(pool, schema, id).await,
            Self::Memory(store) => Ok(store.find_by_id(schema, id).await),
        }
    }

    /// All documents matching every key of `filter`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find(
        &self,
        schema: &'static Schema,
        filter: &Map<String, Value>,
    ) -> Result<Vec<Document>, RepositoryError> {
        match self {
            Self::Postgres(pool) => postgres::find(pool, schema, filter).await,
            Self::Memory(store) => Ok(store.find(schema, filter).await),
        }
    }

    /// Overwrite a document's fields and bump `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a unique field is taken.
    pub async fn replace(
        &self,
        schema: &'static Schema,
        id: i32,
        fields: Map<String, Value>,
    ) -> Result<Option<Document>, RepositoryError> {
        match self {
            Self::Postgres(pool) => postgres::replace(pool, schema, id, fields).await,
            Self::Memory(store) => store.replace(schema, id, fields).await,
        }
    }

    /// Remove a document; `true` if one was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, schema: &'static Schema, id: i32) -> Result<bool, RepositoryError> {
        match self {
            Self::Postgres(pool) => postgres::delete(pool, schema, id).await,
            Self::Memory(store) => Ok(store.delete(schema, id).await),
        }
    }

    /// Check the store is reachable.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if `PostgreSQL` does not answer.
    pub async fn ping(&self) -> Result<(), RepositoryError> {
        match self {
            Self::Postgres(pool) => {
                sqlx::query("SELECT 1").execute(pool).await?;
                Ok(())
            }
            Self::Memory(_) => Ok(()),
        }
    }
}

/// Serialize a payload into a JSON object.
fn to_object(value: &impl Serialize) -> Result<Map<String, Value>, RepositoryError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(RepositoryError::InvalidDocument(format!(
            "expected an object, got {other}"
        ))),
        Err(e) => Err(RepositoryError::InvalidDocument(e.to_string())),
    }
}

/// Decode a stored document into its entity.
fn decode<E: Entity>(doc: &Document) -> Result<E, RepositoryError> {
    doc.decode::<E>().map_err(|e| {
        RepositoryError::DataCorruption(format!(
            "invalid {} document {}: {e}",
            E::schema().name,
            doc.id
        ))
    })
}
