//! In-process document store.
//!
//! Used by the test suites and for local runs without `PostgreSQL`. Unique
//! fields are checked by scanning the collection on every write.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use quickcart_core::Document;
use quickcart_core::schema::Schema;

use super::RepositoryError;

/// Cheaply cloneable handle to a set of in-memory collections.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<&'static str, Collection>>>,
}

#[derive(Debug, Default)]
struct Collection {
    last_id: i32,
    docs: BTreeMap<i32, Document>,
}

impl Collection {
    /// Name of the first unique field whose value is already used by
    /// another document.
    fn conflicting_field(
        &self,
        schema: &Schema,
        fields: &Map<String, Value>,
        skip_id: Option<i32>,
    ) -> Option<&'static str> {
        schema.unique_fields().find_map(|field| {
            let value = fields.get(field.name)?;
            self.docs
                .values()
                .filter(|doc| Some(doc.id) != skip_id)
                .any(|doc| doc.get(field.name) == Some(value))
                .then_some(field.name)
        })
    }
}

impl MemoryStore {
    pub(super) async fn insert(
        &self,
        schema: &'static Schema,
        fields: Map<String, Value>,
    ) -> Result<Document, RepositoryError> {
        let mut collections = self.collections.write().await;
        let collection = collections.entry(schema.collection).or_default();

        if let Some(field) = collection.conflicting_field(schema, &fields, None) {
            return Err(RepositoryError::Conflict(format!(
                "{} {field} already exists",
                schema.name
            )));
        }

        collection.last_id += 1;
        let now = Utc::now();
        let doc = Document {
            id: collection.last_id,
            fields,
            created_at: now,
            updated_at: now,
        };
        collection.docs.insert(doc.id, doc.clone());
        Ok(doc)
    }

    pub(super) async fn find_by_id(&self, schema: &'static Schema, id: i32) -> Option<Document> {
        let collections = self.collections.read().await;
        collections
            .get(schema.collection)
            .and_then(|collection| collection.docs.get(&id))
            .cloned()
    }

    pub(super) async fn find(
        &self,
        schema: &'static Schema,
        filter: &Map<String, Value>,
    ) -> Vec<Document> {
        let collections = self.collections.read().await;
        collections
            .get(schema.collection)
            .map(|collection| {
                collection
                    .docs
                    .values()
                    .filter(|doc| doc.matches(filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(super) async fn replace(
        &self,
        schema: &'static Schema,
        id: i32,
        fields: Map<String, Value>,
    ) -> Result<Option<Document>, RepositoryError> {
        let mut collections = self.collections.write().await;
        let Some(collection) = collections.get_mut(schema.collection) else {
            return Ok(None);
        };

        if let Some(field) = collection.conflicting_field(schema, &fields, Some(id)) {
            return Err(RepositoryError::Conflict(format!(
                "{} {field} already exists",
                schema.name
            )));
        }

        Ok(collection.docs.get_mut(&id).map(|doc| {
            doc.fields = fields;
            doc.updated_at = Utc::now();
            doc.clone()
        }))
    }

    pub(super) async fn delete(&self, schema: &'static Schema, id: i32) -> bool {
        let mut collections = self.collections.write().await;
        collections
            .get_mut(schema.collection)
            .is_some_and(|collection| collection.docs.remove(&id).is_some())
    }
}
