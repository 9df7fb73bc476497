//! Current-user endpoints.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use quickcart_core::models::{Address, NewAddress, User};

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;
use crate::state::AppState;

/// The user document for a signed-in identity.
///
/// The first request from a new identity creates the document.
///
/// # Errors
///
/// Returns `AppError::Database` if the lookup or insert fails.
pub(crate) async fn current_account(state: &AppState, current: &CurrentUser) -> Result<User> {
    Ok(state.users().get_or_create(&current.to_new_user()).await?)
}

/// Get the current user's document.
///
/// GET /api/user/data
///
/// # Errors
///
/// Returns `AppError::Database` if the user cannot be loaded.
pub async fn data(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<User>> {
    Ok(Json(current_account(&state, &current).await?))
}

/// Request to save an address.
#[derive(Debug, Deserialize)]
pub struct AddAddressRequest {
    pub address: NewAddress,
}

/// Save an address for the current user.
///
/// POST /api/user/add-address
///
/// # Errors
///
/// Returns `AppError::Database` (400) if a required field is missing.
pub async fn add_address(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Json(request): Json<AddAddressRequest>,
) -> Result<(StatusCode, Json<Address>)> {
    let address = state
        .addresses()
        .create(&current.subject, &request.address)
        .await?;

    tracing::info!(address_id = %address.id, "address saved");
    Ok((StatusCode::CREATED, Json(address)))
}

/// Saved addresses.
#[derive(Debug, Serialize)]
pub struct AddressList {
    pub addresses: Vec<Address>,
}

/// List the current user's addresses.
///
/// GET /api/user/get-address
///
/// # Errors
///
/// Returns `AppError::Database` if addresses cannot be loaded.
pub async fn get_addresses(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<AddressList>> {
    let addresses = state.addresses().list_for_owner(&current.subject).await?;
    Ok(Json(AddressList { addresses }))
}
