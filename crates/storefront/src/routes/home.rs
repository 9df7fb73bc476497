//! Home page.

use axum::{Json, extract::State};
use serde::Serialize;

use quickcart_core::models::Product;

use crate::error::Result;
use crate::state::AppState;

/// Number of products shown on the home page.
const HOME_PRODUCT_LIMIT: usize = 8;

/// Home page payload.
#[derive(Debug, Serialize)]
pub struct HomePage {
    /// Newest products first.
    pub products: Vec<Product>,
}

/// Display the home page.
///
/// GET /
///
/// # Errors
///
/// Returns `AppError::Database` if products cannot be loaded.
pub async fn home(State(state): State<AppState>) -> Result<Json<HomePage>> {
    let products = state
        .products()
        .list_all()
        .await?
        .into_iter()
        .rev()
        .take(HOME_PRODUCT_LIMIT)
        .collect();

    Ok(Json(HomePage { products }))
}
