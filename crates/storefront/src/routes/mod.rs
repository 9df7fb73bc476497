//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                   - Liveness (outside the guard)
//! GET  /health/ready             - Readiness, pings the store (outside the guard)
//!
//! # Public
//! GET  /                         - Latest products
//! GET  /all-products             - Every product
//! GET  /product/{id}             - One product
//!
//! # Signed in
//! GET  /cart                     - Cart with products resolved
//! GET  /api/user/data            - Current user document
//! POST /api/cart/update          - Replace cart items
//! GET  /api/cart/get             - Cart items
//! POST /api/user/add-address     - Save an address
//! GET  /api/user/get-address     - Saved addresses
//! GET  /api/product/list         - Every product
//! POST /api/order/create         - Place an order
//! GET  /api/order/list           - Own orders
//!
//! # Sellers
//! POST /api/product/add          - List a product
//! GET  /api/product/seller-list  - Own products
//! GET  /api/order/seller-orders  - Every order
//! ```

pub mod cart;
pub mod health;
pub mod home;
pub mod orders;
pub mod products;
pub mod user;

use axum::{
    Router,
    routing::{get, post},
};

use crate::error::AppError;
use crate::state::AppState;

/// Health probes. Mounted outside the session layer and guard.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
}

/// Public catalogue pages.
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/all-products", get(products::all_products))
        .route("/product/{id}", get(products::show))
        .route("/cart", get(cart::show))
}

/// Create the JSON API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/user/data", get(user::data))
        .route("/user/add-address", post(user::add_address))
        .route("/user/get-address", get(user::get_addresses))
        .route("/cart/update", post(cart::update))
        .route("/cart/get", get(cart::get))
        .route("/product/list", get(products::list))
        .route("/product/add", post(products::add))
        .route("/product/seller-list", get(products::seller_list))
        .route("/order/create", post(orders::create))
        .route("/order/list", get(orders::list))
        .route("/order/seller-orders", get(orders::seller_orders))
}

/// Create all guarded routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(page_routes())
        .nest("/api", api_routes())
        .fallback(not_found)
}

async fn not_found() -> AppError {
    AppError::NotFound("no such route".to_string())
}
