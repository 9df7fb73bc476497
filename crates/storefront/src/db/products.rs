//! Product repository.

use std::sync::Arc;

use serde_json::json;

use quickcart_core::models::{NewProduct, Owned, Product};
use quickcart_core::{OwnerId, ProductId};

use super::registry::{Model, ModelRegistry};
use super::{RepositoryError, decode};

/// Repository for catalog products.
pub struct ProductRepository {
    model: Arc<Model>,
}

impl ProductRepository {
    /// Create a new product repository.
    #[must_use]
    pub fn new(registry: &ModelRegistry) -> Self {
        Self {
            model: registry.model::<Product>(),
        }
    }

    /// List a product under `owner`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` if a required field is missing.
    pub async fn create(
        &self,
        owner: &OwnerId,
        product: &NewProduct,
    ) -> Result<Product, RepositoryError> {
        let doc = self.model.create(&Owned::new(owner, product)).await?;
        decode(&doc)
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        self.model
            .find_by_id(id.as_i32())
            .await?
            .map(|doc| decode(&doc))
            .transpose()
    }

    /// Every product, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        self.model.find(&json!({})).await?.iter().map(decode).collect()
    }

    /// Products listed by `owner`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_owner(&self, owner: &OwnerId) -> Result<Vec<Product>, RepositoryError> {
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
    use quickcart_core::Price;

    use super::*;
    use crate::db::Store;

    fn lamp() -> NewProduct {
        NewProduct {
            name: "Desk Lamp".to_owned(),
            description: None,
            price: Price::from_cents(5000),
            offer_price: Price::from_cents(4500),
            category: "Home".to_owned(),
            image: vec!["https://img.example/1.png".to_owned(), "https://img.example/2.png".to_owned()],
        }
    }

    #[tokio::test]
    async fn test_create_keeps_image_order() {
        let registry = ModelRegistry::new(Store::memory());
        let products = ProductRepository::new(&registry);
        let seller = OwnerId::new("seller_1");

        let product = products.create(&seller, &lamp()).await.unwrap();
        assert_eq!(product.image.first().map(String::as_str), Some("https://img.example/1.png"));
        assert_eq!(product.offer_price, Price::from_cents(4500));

        let fetched = products.get_by_id(product.id).await.unwrap().unwrap();
        assert_eq!(fetched, product);
    }

    #[tokio::test]
    async fn test_offer_price_above_price_is_accepted() {
        let registry = ModelRegistry::new(Store::memory());
        let products = ProductRepository::new(&registry);
        let mut odd = lamp();
        odd.offer_price = Price::from_cents(9000);

        let product = products.create(&OwnerId::new("s"), &odd).await.unwrap();
        assert!(product.offer_price > product.price);
    }

    #[tokio::test]
    async fn test_list_for_owner() {
        let registry = ModelRegistry::new(Store::memory());
        let products = ProductRepository::new(&registry);
        products.create(&OwnerId::new("a"), &lamp()).await.unwrap();
        products.create(&OwnerId::new("b"), &lamp()).await.unwrap();
        products.create(&OwnerId::new("a"), &lamp()).await.unwrap();

        assert_eq!(products.list_all().await.unwrap().len(), 3);
        assert_eq!(products.list_for_owner(&OwnerId::new("a")).await.unwrap().len(), 2);
    }
}
