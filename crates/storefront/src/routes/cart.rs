//! Cart endpoints.
//!
//! The cart lives on the user document as `cartItems`, a map from product
//! id to quantity. Updates replace the whole map.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use quickcart_core::models::{Product, amount_for};
use quickcart_core::{CartItems, Price, ProductId};

use super::user::current_account;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Cart contents as stored.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub cart_items: CartItems,
}

/// Request to replace the cart.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartUpdateRequest {
    pub cart_data: CartItems,
}

/// Replace the current user's cart.
///
/// POST /api/cart/update
///
/// # Errors
///
/// Returns `AppError::Database` if the user cannot be updated.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Json(request): Json<CartUpdateRequest>,
) -> Result<Json<CartResponse>> {
    let user = current_account(&state, &current).await?;
    let user = state.users().update_cart(user.id, &request.cart_data).await?;

    tracing::debug!(user_id = %user.id, lines = user.cart_items.len(), "cart updated");
    Ok(Json(CartResponse {
        cart_items: user.cart_items,
    }))
}

/// Get the current user's cart.
///
/// GET /api/cart/get
///
/// # Errors
///
/// Returns `AppError::Database` if the user cannot be loaded.
pub async fn get(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<CartResponse>> {
    let user = current_account(&state, &current).await?;
    Ok(Json(CartResponse {
        cart_items: user.cart_items,
    }))
}

/// A cart entry with its product.
#[derive(Debug, Serialize)]
pub struct CartLine {
    pub product: Product,
    pub quantity: i64,
}

/// The cart page payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartPage {
    pub lines: Vec<CartLine>,
    pub total_quantity: i64,
    /// Sum of offer price times quantity over `lines`.
    pub subtotal: Price,
}

/// Show the cart with products loaded.
///
/// Entries whose key is not a product id, or whose product no longer
/// exists, are left out.
///
/// GET /cart
///
/// # Errors
///
/// Returns `AppError::Database` if the cart cannot be loaded, or
/// `AppError::BadRequest` if the quantities or subtotal overflow.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<CartPage>> {
    let user = current_account(&state, &current).await?;

    let mut lines = Vec::with_capacity(user.cart_items.len());
    for (key, quantity) in user.cart_items.iter() {
        let Ok(id) = key.parse::<i32>() else {
            continue;
        };
        if let Some(product) = state.products().get_by_id(ProductId::new(id)).await? {
            lines.push(CartLine { product, quantity });
        }
    }

    let subtotal = amount_for(lines.iter().map(|line| (&line.product, line.quantity)))
        .ok_or_else(|| AppError::BadRequest("cart subtotal is too large".to_string()))?;
    let total_quantity = lines
        .iter()
        .try_fold(0_i64, |total, line| total.checked_add(line.quantity))
        .ok_or_else(|| AppError::BadRequest("cart quantity is too large".to_string()))?;

    Ok(Json(CartPage {
        lines,
        total_quantity,
        subtotal,
    }))
}
