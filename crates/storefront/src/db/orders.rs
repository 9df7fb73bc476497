//! Order repository and reference resolution.
//!
//! Orders hold typed ids for their address and products. Loading the
//! referenced documents is an explicit step ([`OrderRepository::details`]);
//! a reference whose target is gone resolves to `None`.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;

use quickcart_core::models::{Address, NewOrder, Order, Owned, Product};
use quickcart_core::{OrderId, OwnerId, ProductId};

use super::registry::{Model, ModelRegistry};
use super::{AddressRepository, ProductRepository, RepositoryError, decode};

/// An order line with its product loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedItem {
    /// `None` if the product was deleted.
    pub product: Option<Product>,
    pub quantity: i64,
}

/// An order with its references loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderDetails {
    pub order: Order,
    /// `None` if the address was deleted.
    pub address: Option<Address>,
    pub items: Vec<ResolvedItem>,
}

/// Repository for orders.
pub struct OrderRepository {
    model: Arc<Model>,
    addresses: AddressRepository,
    products: ProductRepository,
}

impl OrderRepository {
    /// Create a new order repository.
    #[must_use]
    pub fn new(registry: &ModelRegistry) -> Self {
        Self {
            model: registry.model::<Order>(),
            addresses: AddressRepository::new(registry),
            products: ProductRepository::new(registry),
        }
    }

    /// Store an order for `owner`. The amount is taken as given.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` if a required field is missing.
    pub async fn create(&self, owner: &OwnerId, order: &NewOrder) -> Result<Order, RepositoryError> {
        let doc = self.model.create(&Owned::new(owner, order)).await?;
        decode(&doc)
    }

    /// Get an order by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        self.model
            .find_by_id(id.as_i32())
            .await?
            .map(|doc| decode(&doc))
            .transpose()
    }

    /// Orders placed by `owner`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_owner(&self, owner: &OwnerId) -> Result<Vec<Order>, RepositoryError> {
        self.model
            .find(&json!({ "userId": owner }))
            .await?
            .iter()
            .map(decode)
            .collect()
    }

    /// Every order, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        self.model.find(&json!({})).await?.iter().map(decode).collect()
    }

    /// Load the address and products an order refers to.
    ///
    /// Each distinct product is fetched once.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a lookup fails.
    pub async fn details(&self, order: Order) -> Result<OrderDetails, RepositoryError> {
        let address = self.addresses.get_by_id(order.address).await?;

        let mut products: HashMap<ProductId, Option<Product>> = HashMap::new();
        for item in &order.items {
            if !products.contains_key(&item.product) {
                let product = self.products.get_by_id(item.product).await?;
                products.insert(item.product, product);
            }
        }

        let items = order
            .items
            .iter()
            .map(|item| ResolvedItem {
                product: products.get(&item.product).cloned().flatten(),
                quantity: item.quantity,
            })
            .collect();

        Ok(OrderDetails {
            order,
            address,
            items,
        })
    }

    /// [`OrderRepository::details`] for each order, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a lookup fails.
    pub async fn details_newest_first(
        &self,
        orders: Vec<Order>,
    ) -> Result<Vec<OrderDetails>, RepositoryError> {
        let mut details = Vec::with_capacity(orders.len());
        for order in orders.into_iter().rev() {
            details.push(self.details(order).await?);
        }
        Ok(details)
    }
}
