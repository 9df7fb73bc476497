//! Users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::schema::{DefaultValue, Entity, Field, FieldKind, Schema};
use crate::{CartItems, Email, UserId};

const CART: FieldKind = FieldKind::Map(&FieldKind::Integer);

/// `User` document schema. The email is the unique identity key.
pub static SCHEMA: Schema = Schema {
    name: "User",
    collection: "users",
    fields: &[
        Field::new("name", FieldKind::String),
        Field::new("email", FieldKind::Email).required().unique(),
        Field::new("imageUrl", FieldKind::String),
        Field::new("isSeller", FieldKind::Boolean).with_default(DefaultValue::Bool(false)),
        Field::new("cartItems", CART).with_default(DefaultValue::EmptyMap),
    ],
};

/// A storefront user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Generated id.
    pub id: UserId,
    /// Display name.
    pub name: Option<String>,
    /// Identity key, unique across users.
    pub email: Email,
    /// Avatar URL.
    pub image_url: Option<String>,
    /// Seller accounts may list products and see all orders.
    pub is_seller: bool,
    /// Product id → quantity.
    pub cart_items: CartItems,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for User {
    type Id = UserId;

    fn schema() -> &'static Schema {
        &SCHEMA
    }
}

/// Payload for creating a user. Seller flag and cart take their defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: Email,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl NewUser {
    /// A user with only the identity key set.
    #[must_use]
    pub const fn new(email: Email) -> Self {
        Self {
            email,
            name: None,
            image_url: None,
        }
    }
}
