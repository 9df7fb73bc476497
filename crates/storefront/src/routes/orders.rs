//! Order routes.

use std::collections::HashMap;

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use quickcart_core::models::{NewOrder, Order, OrderItem, Product, amount_for};
use quickcart_core::{AddressId, CartItems, ProductId};

use super::user::current_account;
use crate::db::OrderDetails;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::{RequireAuth, RequireSeller};
use crate::state::AppState;

/// Request to place an order.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub address: AddressId,
    pub items: Vec<OrderItem>,
}

/// Place an order for the current user.
///
/// The amount is the sum of offer price times quantity. On success the
/// user's cart is emptied; the two writes are independent.
///
/// POST /api/order/create
///
/// # Errors
///
/// Returns `AppError::BadRequest` for an empty order, a non-positive
/// quantity, an unknown product or address, or a total that overflows.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    if request.items.is_empty() {
        return Err(AppError::BadRequest("order has no items".to_string()));
    }
    if let Some(item) = request.items.iter().find(|item| item.quantity <= 0) {
        return Err(AppError::BadRequest(format!(
            "quantity for product {} must be positive",
            item.product
        )));
    }

    let address = state
        .addresses()
        .get_by_id(request.address)
        .await?
        .filter(|address| address.user_id == current.subject)
        .ok_or_else(|| AppError::BadRequest(format!("unknown address {}", request.address)))?;

    let mut products: HashMap<ProductId, Product> = HashMap::new();
    for item in &request.items {
        if products.contains_key(&item.product) {
            continue;
        }
        let product = state
            .products()
            .get_by_id(item.product)
            .await?
            .ok_or_else(|| AppError::BadRequest(format!("unknown product {}", item.product)))?;
        products.insert(item.product, product);
    }

    let amount = amount_for(
        request
            .items
            .iter()
            .filter_map(|item| products.get(&item.product).map(|p| (p, item.quantity))),
    )
    .ok_or_else(|| AppError::BadRequest("order total is too large".to_string()))?;

    let order = state
        .orders()
        .create(
            &current.subject,
            &NewOrder {
                items: request.items,
                amount,
                address: address.id,
                status: None,
            },
        )
        .await?;

    let user = current_account(&state, &current).await?;
    state.users().update_cart(user.id, &CartItems::new()).await?;

    let order_id = order.id.to_string();
    let amount = order.amount.to_string();
    add_breadcrumb(
        "order",
        "Order placed",
        Some(&[("order_id", order_id.as_str()), ("amount", amount.as_str())]),
    );
    tracing::info!(order_id = %order.id, amount = %order.amount, "order placed");

    Ok((StatusCode::CREATED, Json(order)))
}

/// Orders with their references resolved.
#[derive(Debug, Serialize)]
pub struct OrderList {
    pub orders: Vec<OrderDetails>,
}

/// The current user's orders, newest first.
///
/// GET /api/order/list
///
/// # Errors
///
/// Returns `AppError::Database` if orders cannot be loaded.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<OrderList>> {
    let orders = state.orders().list_for_owner(&current.subject).await?;
    let orders = state.orders().details_newest_first(orders).await?;
    Ok(Json(OrderList { orders }))
}

/// Every order, newest first, for sellers.
///
/// GET /api/order/seller-orders
///
/// # Errors
///
/// Returns `AppError::Database` if orders cannot be loaded.
pub async fn seller_orders(
    State(state): State<AppState>,
    RequireSeller(..): RequireSeller,
) -> Result<Json<OrderList>> {
    let orders = state.orders().list_all().await?;
    let orders = state.orders().details_newest_first(orders).await?;
    Ok(Json(OrderList { orders }))
}
