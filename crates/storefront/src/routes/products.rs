//! Product routes.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;

use quickcart_core::ProductId;
use quickcart_core::models::{NewProduct, Product};

use crate::error::{AppError, Result};
use crate::middleware::{RequireAuth, RequireSeller};
use crate::state::AppState;

/// A list of products.
#[derive(Debug, Serialize)]
pub struct ProductList {
    pub products: Vec<Product>,
}

/// Every product, oldest first.
///
/// GET /all-products
///
/// # Errors
///
/// Returns `AppError::Database` if products cannot be loaded.
pub async fn all_products(State(state): State<AppState>) -> Result<Json<ProductList>> {
    let products = state.products().list_all().await?;
    Ok(Json(ProductList { products }))
}

/// Display one product.
///
/// GET /product/{id}
///
/// # Errors
///
/// Returns `AppError::NotFound` if there is no such product.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    state
        .products()
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

/// Every product, for signed-in callers.
///
/// GET /api/product/list
///
/// # Errors
///
/// Returns `AppError::Database` if products cannot be loaded.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(_): RequireAuth,
) -> Result<Json<ProductList>> {
    all_products(State(state)).await
}

/// List a new product owned by the calling seller.
///
/// POST /api/product/add
///
/// # Errors
///
/// Returns `AppError::BadRequest` if no image is given, or
/// `AppError::Database` (400) if a required field is missing.
pub async fn add(
    State(state): State<AppState>,
    RequireSeller(current, _): RequireSeller,
    Json(product): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>)> {
    if product.image.is_empty() {
        return Err(AppError::BadRequest("at least one image is required".to_string()));
    }

    let product = state.products().create(&current.subject, &product).await?;

    tracing::info!(product_id = %product.id, seller = %current.subject, "product listed");
    Ok((StatusCode::CREATED, Json(product)))
}

/// Products owned by the calling seller.
///
/// GET /api/product/seller-list
///
/// # Errors
///
/// Returns `AppError::Database` if products cannot be loaded.
pub async fn seller_list(
    State(state): State<AppState>,
    RequireSeller(current, _): RequireSeller,
) -> Result<Json<ProductList>> {
    let products = state.products().list_for_owner(&current.subject).await?;
    Ok(Json(ProductList { products }))
}
