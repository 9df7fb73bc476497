//! `PostgreSQL` document backend.
//!
//! One table per collection, the validated document in a JSONB column.
//! Table and index names come from static schemas, never from requests.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::PgPool;
use sqlx::types::Json;

use quickcart_core::Document;
use quickcart_core::schema::Schema;

use super::RepositoryError;

#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: i32,
    doc: Json<Map<String, Value>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Self {
            id: row.id,
            fields: row.doc.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Map a write error, turning unique violations into `Conflict`.
fn write_error(schema: &Schema, e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("duplicate {} key", schema.name));
    }
    RepositoryError::Database(e)
}

pub(super) async fn ensure_collection(
    pool: &PgPool,
    schema: &'static Schema,
) -> Result<(), RepositoryError> {
    let table = schema.collection;
    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS "{table}" (
            id SERIAL PRIMARY KEY,
            doc JSONB NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#
    ))
    .execute(pool)
    .await?;

    for field in schema.unique_fields() {
        let name = field.name;
        sqlx::query(&format!(
            r#"CREATE UNIQUE INDEX IF NOT EXISTS "{table}_{name}_key" ON "{table}" ((doc->>'{name}'))"#
        ))
        .execute(pool)
        .await?;
    }

    tracing::info!(collection = table, "collection ready");
    Ok(())
}

pub(super) async fn insert(
    pool: &PgPool,
    schema: &'static Schema,
    fields: Map<String, Value>,
) -> Result<Document, RepositoryError> {
    let row: DocumentRow = sqlx::query_as(&format!(
        r#"
        INSERT INTO "{}" (doc)
        VALUES ($1)
        RETURNING id, doc, created_at, updated_at
        "#,
        schema.collection
    ))
    .bind(Json(&fields))
    .fetch_one(pool)
    .await
    .map_err(|e| write_error(schema, e))?;

    Ok(row.into())
}

pub(super) async fn find_by_id(
    pool: &PgPool,
    schema: &'static Schema,
    id: i32,
) -> Result<Option<Document>, RepositoryError> {
    let row: Option<DocumentRow> = sqlx::query_as(&format!(
        r#"SELECT id, doc, created_at, updated_at FROM "{}" WHERE id = $1"#,
        schema.collection
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(Document::from))
}

pub(super) async fn find(
    pool: &PgPool,
    schema: &'static Schema,
    filter: &Map<String, Value>,
) -> Result<Vec<Document>, RepositoryError> {
    let rows: Vec<DocumentRow> = sqlx::query_as(&format!(
        r#"
        SELECT id, doc, created_at, updated_at
        FROM "{}"
        WHERE doc @> $1
        ORDER BY id
        "#,
        schema.collection
    ))
    .bind(Json(filter))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Document::from).collect())
}

pub(super) async fn replace(
    pool: &PgPool,
    schema: &'static Schema,
    id: i32,
    fields: Map<String, Value>,
) -> Result<Option<Document>, RepositoryError> {
    let row: Option<DocumentRow> = sqlx::query_as(&format!(
        r#"
        UPDATE "{}"
        SET doc = $2, updated_at = now()
        WHERE id = $1
        RETURNING id, doc, created_at, updated_at
        "#,
        schema.collection
    ))
    .bind(id)
    .bind(Json(&fields))
    .fetch_optional(pool)
    .await
    .map_err(|e| write_error(schema, e))?;

    Ok(row.map(Document::from))
}

pub(super) async fn delete(
    pool: &PgPool,
    schema: &'static Schema,
    id: i32,
) -> Result<bool, RepositoryError> {
    let result = sqlx::query(&format!(
        r#"DELETE FROM "{}" WHERE id = $1"#,
        schema.collection
    ))
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
