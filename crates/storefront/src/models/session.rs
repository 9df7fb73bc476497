//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use quickcart_core::models::NewUser;
use quickcart_core::{Email, OwnerId};

/// Session-stored identity, written by the auth provider after sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// The auth provider's subject id. Stored in `userId` fields.
    pub subject: OwnerId,
    /// Verified email address.
    pub email: Email,
    /// Display name, if the provider supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Avatar URL, if the provider supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl CurrentUser {
    /// The user document to create on first sight of this identity.
    #[must_use]
    pub fn to_new_user(&self) -> NewUser {
        NewUser {
            email: self.email.clone(),
            name: self.name.clone(),
            image_url: self.image_url.clone(),
        }
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current signed-in user.
    pub const CURRENT_USER: &str = "current_user";
}
