//! Address repository.

use std::sync::Arc;

use serde_json::json;

use quickcart_core::models::{Address, NewAddress, Owned};
use quickcart_core::{AddressId, OwnerId};

use super::registry::{Model, ModelRegistry};
use super::{RepositoryError, decode};

/// Repository for shipping addresses.
pub struct AddressRepository {
    model: Arc<Model>,
}

impl AddressRepository {
    /// Create a new address repository.
    #[must_use]
    pub fn new(registry: &ModelRegistry) -> Self {
        Self {
            model: registry.model::<Address>(),
        }
    }

    /// Store an address for `owner`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` if a field is missing.
    pub async fn create(
        &self,
        owner: &OwnerId,
        address: &NewAddress,
    ) -> Result<Address, RepositoryError> {
        let doc = self.model.create(&Owned::new(owner, address)).await?;
        decode(&doc)
    }

    /// Get an address by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: AddressId) -> Result<Option<Address>, RepositoryError> {
        self.model
            .find_by_id(id.as_i32())
            .await?
            .map(|doc| decode(&doc))
            .transpose()
    }

    /// All addresses owned by `owner`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_owner(&self, owner: &OwnerId) -> Result<Vec<Address>, RepositoryError> {
        self.model
            .find(&json!({ "userId": owner }))
            .await?
            .iter()
            .map(decode)
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::db::Store;

    fn home() -> NewAddress {
        NewAddress {
            full_name: "Ada Lovelace".to_owned(),
            phone_number: "5550100".to_owned(),
            pincode: "10001".to_owned(),
            area: "12 Analytical Way".to_owned(),
            city: "London".to_owned(),
            state: "Greater London".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_addresses_are_listed_per_owner() {
        let registry = ModelRegistry::new(Store::memory());
        let addresses = AddressRepository::new(&registry);
        let ada = OwnerId::new("user_ada");
        let bob = OwnerId::new("user_bob");

        let created = addresses.create(&ada, &home()).await.unwrap();
        addresses.create(&bob, &home()).await.unwrap();

        let listed = addresses.list_for_owner(&ada).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, created.id);
        assert_eq!(listed[0].user_id, ada);
    }

    #[tokio::test]
    async fn test_every_field_is_required() {
        let registry = ModelRegistry::new(Store::memory());
        let err = registry
            .model::<Address>()
            .create(&json!({ "userId": "u", "fullName": "Ada" }))
            .await
            .unwrap_err();

        let RepositoryError::Validation(err) = err else {
            panic!("expected validation error, got {err:?}");
        };
        for field in ["phoneNumber", "pincode", "area", "city", "state"] {
            assert!(err.has_field(field), "{field} should be required");
        }
    }
}
