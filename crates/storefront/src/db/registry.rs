//! Model registry.
//!
//! The registry maps entity names to [`Model`] handles. It is built once at
//! startup, owned by the application state, and never cleared. Asking for a
//! name that is already registered returns the existing handle, so code that
//! runs its setup more than once (tests, reloads) shares one handle per
//! entity.

use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::OnceCell;

use quickcart_core::schema::Schema;
use quickcart_core::{Document, Entity};

use super::{RepositoryError, Store, to_object};

/// Handle for reading and writing one entity's documents.
///
/// The backing collection is created on the first operation, not when the
/// handle is registered.
#[derive(Debug)]
pub struct Model {
    schema: &'static Schema,
    store: Store,
    ready: OnceCell<()>,
}

impl Model {
    fn new(schema: &'static Schema, store: Store) -> Self {
        Self {
            schema,
            store,
            ready: OnceCell::new(),
        }
    }

    /// The schema this handle validates against.
    #[must_use]
    pub const fn schema(&self) -> &'static Schema {
        self.schema
    }

    /// Entity name, the registry key.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.schema.name
    }

    async fn ready(&self) -> Result<(), RepositoryError> {
        self.ready
            .get_or_try_init(|| self.store.ensure_collection(self.schema))
            .await?;
        Ok(())
    }

    /// Validate and insert a new document.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` if the payload breaks the schema,
    /// `RepositoryError::Conflict` if a unique field is taken.
    pub async fn create(&self, payload: &impl Serialize) -> Result<Document, RepositoryError> {
        let fields = self.schema.validate(to_object(payload)?)?;
        self.ready().await?;

        let doc = self.store.insert(self.schema, fields).await?;
        tracing::debug!(entity = self.name(), id = doc.id, "document created");
        Ok(doc)
    }

    /// Load a document by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the store fails.
    pub async fn find_by_id(&self, id: i32) -> Result<Option<Document>, RepositoryError> {
        self.ready().await?;
        self.store.find_by_id(self.schema, id).await
    }

    /// All documents containing `filter`, oldest first.
    ///
    /// Containment is JSONB `@>`: nested objects match on a subset of keys
    /// and arrays on a subset of elements.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidDocument` if `filter` is not an object.
    pub async fn find(&self, filter: &impl Serialize) -> Result<Vec<Document>, RepositoryError> {
        let filter = to_object(filter)?;
        self.ready().await?;
        self.store.find(self.schema, &filter).await
    }

    /// First document matching `filter`.
    ///
    /// # Errors
    ///
    /// Same as [`Model::find`].
    pub async fn find_one(
        &self,
        filter: &impl Serialize,
    ) -> Result<Option<Document>, RepositoryError> {
        Ok(self.find(filter).await?.into_iter().next())
    }

    /// Merge the top-level keys of `patch` into a stored document and
    /// re-validate it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no document has this id,
    /// `RepositoryError::Validation` if the merged document breaks the schema.
    pub async fn update(
        &self,
        id: i32,
        patch: &impl Serialize,
    ) -> Result<Document, RepositoryError> {
        let patch = to_object(patch)?;
        let mut merged = self
            .find_by_id(id)
            .await?
            .ok_or(RepositoryError::NotFound)?
            .fields;
        merged.extend(patch);

        let fields = self.schema.validate(merged)?;
        let doc = self
            .store
            .replace(self.schema, id, fields)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        tracing::debug!(entity = self.name(), id, "document updated");
        Ok(doc)
    }

    /// Delete a document; `true` if one was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the store fails.
    pub async fn delete(&self, id: i32) -> Result<bool, RepositoryError> {
        self.ready().await?;
        self.store.delete(self.schema, id).await
    }
}

/// Name-keyed registry of model handles.
///
/// Cheaply cloneable; clones share the same handles.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    inner: Arc<RegistryInner>,
}

#[derive(Debug)]
struct RegistryInner {
    store: Store,
    models: DashMap<&'static str, Arc<Model>>,
}

impl ModelRegistry {
    /// Create an empty registry whose handles all use `store`.
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                store,
                models: DashMap::new(),
            }),
        }
    }

    /// Return the handle registered under `schema.name`, registering one
    /// first if needed.
    ///
    /// A second schema under an existing name does not replace the first:
    /// the original handle is returned.
    #[must_use]
    pub fn get_or_register(&self, schema: &'static Schema) -> Arc<Model> {
        let entry = self
            .inner
            .models
            .entry(schema.name)
            .or_insert_with(|| {
                tracing::debug!(entity = schema.name, "registering model");
                Arc::new(Model::new(schema, self.inner.store.clone()))
            });

        if !std::ptr::eq(entry.schema(), schema) {
            tracing::warn!(
                entity = schema.name,
                "model already registered with a different schema; keeping the first"
            );
        }

        Arc::clone(entry.value())
    }

    /// Typed shorthand for [`ModelRegistry::get_or_register`].
    #[must_use]
    pub fn model<E: Entity>(&self) -> Arc<Model> {
        self.get_or_register(E::schema())
    }

    /// The handle registered under `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<Model>> {
        self.inner
            .models
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Number of registered entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.models.len()
    }

    /// Whether nothing has been registered yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.models.is_empty()
    }

    /// The backing store shared by every handle.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.inner.store
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use quickcart_core::models::{Order, User, order, user};
    use quickcart_core::schema::{Field, FieldKind};
    use serde_json::json;

    use super::*;

    static OTHER_USER: Schema = Schema {
        name: "User",
        collection: "other_users",
        fields: &[Field::new("handle", FieldKind::String)],
    };

    #[test]
    fn test_same_name_returns_identical_handle() {
        let registry = ModelRegistry::new(Store::memory());
        let first = registry.get_or_register(&user::SCHEMA);
        let second = registry.get_or_register(&user::SCHEMA);
        let typed = registry.model::<User>();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&first, &typed));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_first_definition_wins() {
        let registry = ModelRegistry::new(Store::memory());
        let first = registry.get_or_register(&user::SCHEMA);
        let again = registry.get_or_register(&OTHER_USER);

        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(again.schema().collection, "users");
    }

    #[test]
    fn test_clones_share_handles() {
        let registry = ModelRegistry::new(Store::memory());
        let clone = registry.clone();
        let a = registry.model::<Order>();
        let b = clone.get("Order").unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert!(clone.get("Address").is_none());
    }

    #[tokio::test]
    async fn test_update_merges_and_bumps_timestamp() {
        let registry = ModelRegistry::new(Store::memory());
        let users = registry.get_or_register(&user::SCHEMA);
        let created = users.create(&json!({ "email": "a@x.io" })).await.unwrap();

        let updated = users
            .update(created.id, &json!({ "isSeller": true }))
            .await
            .unwrap();

        assert_eq!(updated.get("email"), Some(&json!("a@x.io")));
        assert_eq!(updated.get("isSeller"), Some(&json!(true)));
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_update_revalidates() {
        let registry = ModelRegistry::new(Store::memory());
        let orders = registry.get_or_register(&order::SCHEMA);
        let created = orders
            .create(&json!({ "userId": "u1", "amount": 10, "address": 1 }))
            .await
            .unwrap();

        let err = orders
            .update(created.id, &json!({ "amount": "ten" }))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Validation(ref e) if e.has_field("amount")));

        let missing = orders.update(999, &json!({ "amount": 1 })).await.unwrap_err();
        assert!(matches!(missing, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_raw_email_is_normalized_or_rejected() {
        let registry = ModelRegistry::new(Store::memory());
        let users = registry.model::<User>();

        let err = users.create(&json!({ "email": "Foo" })).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Validation(ref e) if e.has_field("email")));

        let doc = users.create(&json!({ "email": " Foo@X.io " })).await.unwrap();
        assert_eq!(doc.get("email"), Some(&json!("foo@x.io")));
        let user: User = doc.decode().unwrap();
        assert_eq!(user.email.as_str(), "foo@x.io");

        let dup = users.create(&json!({ "email": "FOO@x.io" })).await.unwrap_err();
        assert!(matches!(dup, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_find_one_and_delete() {
        let registry = ModelRegistry::new(Store::memory());
        let users = registry.model::<User>();
        let doc = users.create(&json!({ "email": "a@x.io" })).await.unwrap();

        let found = users.find_one(&json!({ "email": "a@x.io" })).await.unwrap();
        assert_eq!(found.map(|d| d.id), Some(doc.id));
        assert!(users.delete(doc.id).await.unwrap());
        assert!(users.find_by_id(doc.id).await.unwrap().is_none());
    }
}
