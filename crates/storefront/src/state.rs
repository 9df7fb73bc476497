//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::db::{
    AddressRepository, ModelRegistry, OrderRepository, ProductRepository, Store, UserRepository,
};
use crate::middleware::route_guard::{PatternError, RouteGuard};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the model registry, the repositories built on it, and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    registry: ModelRegistry,
    guard: RouteGuard,
    users: UserRepository,
    addresses: AddressRepository,
    products: ProductRepository,
    orders: OrderRepository,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Every entity is registered here, once, before the first request.
    ///
    /// # Errors
    ///
    /// Returns an error if a public-route pattern is invalid.
    pub fn new(config: StorefrontConfig, store: Store) -> Result<Self, PatternError> {
        let guard = RouteGuard::new(&config.guard)?;
        let registry = ModelRegistry::new(store);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                users: UserRepository::new(&registry),
                addresses: AddressRepository::new(&registry),
                products: ProductRepository::new(&registry),
                orders: OrderRepository::new(&registry),
                config,
                registry,
                guard,
            }),
        })
    }

    /// State with default configuration and an empty in-memory store.
    ///
    /// # Panics
    ///
    /// Never in practice: the default public routes are valid patterns.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(StorefrontConfig::default(), Store::memory())
            .expect("default public routes are valid")
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the model registry.
    #[must_use]
    pub fn registry(&self) -> &ModelRegistry {
        &self.inner.registry
    }

    /// Get a reference to the route guard.
    #[must_use]
    pub fn guard(&self) -> &RouteGuard {
        &self.inner.guard
    }

    /// User repository.
    #[must_use]
    pub fn users(&self) -> &UserRepository {
        &self.inner.users
    }

    /// Address repository.
    #[must_use]
    pub fn addresses(&self) -> &AddressRepository {
        &self.inner.addresses
    }

    /// Product repository.
    #[must_use]
    pub fn products(&self) -> &ProductRepository {
        &self.inner.products
    }

    /// Order repository.
    #[must_use]
    pub fn orders(&self) -> &OrderRepository {
        &self.inner.orders
    }
}
