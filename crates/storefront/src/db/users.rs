//! User repository.

use std::sync::Arc;

use serde_json::json;

use quickcart_core::models::{NewUser, User};
use quickcart_core::{CartItems, Email, UserId};

use super::registry::{Model, ModelRegistry};
use super::{RepositoryError, decode};

/// Repository for user documents.
pub struct UserRepository {
    model: Arc<Model>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub fn new(registry: &ModelRegistry) -> Self {
        Self {
            model: registry.model::<User>(),
        }
    }

    /// Create a user. The seller flag and cart take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    pub async fn create(&self, new_user: &NewUser) -> Result<User, RepositoryError> {
        let doc = self.model.create(new_user).await?;
        decode(&doc)
    }

    /// Get a user by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        self.model
            .find_by_id(id.as_i32())
            .await?
            .map(|doc| decode(&doc))
            .transpose()
    }

    /// Get a user by their identity key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        self.model
            .find_one(&json!({ "email": email }))
            .await?
            .map(|doc| decode(&doc))
            .transpose()
    }

    /// Get the user with this email, creating it from `new_user` if absent.
    ///
    /// A concurrent create of the same email is resolved by re-reading.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the store fails.
    pub async fn get_or_create(&self, new_user: &NewUser) -> Result<User, RepositoryError> {
        if let Some(user) = self.get_by_email(&new_user.email).await? {
            return Ok(user);
        }

        match self.create(new_user).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "user created");
                Ok(user)
            }
            Err(RepositoryError::Conflict(_)) => self
                .get_by_email(&new_user.email)
                .await?
                .ok_or(RepositoryError::NotFound),
            Err(e) => Err(e),
        }
    }

    /// Grant or revoke seller access.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn set_seller(&self, id: UserId, is_seller: bool) -> Result<User, RepositoryError> {
        let doc = self
            .model
            .update(id.as_i32(), &json!({ "isSeller": is_seller }))
            .await?;
        decode(&doc)
    }

    /// Replace the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn update_cart(
        &self,
        id: UserId,
        cart_items: &CartItems,
    ) -> Result<User, RepositoryError> {
        let doc = self
            .model
            .update(id.as_i32(), &json!({ "cartItems": cart_items }))
            .await?;
        decode(&doc)
    }
}
