//! Shipping addresses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::schema::{Entity, Field, FieldKind, Schema};
use crate::{AddressId, OwnerId};

/// `Address` document schema. Every field is mandatory.
pub static SCHEMA: Schema = Schema {
    name: "Address",
    collection: "addresses",
    fields: &[
        Field::new("userId", FieldKind::String).required(),
        Field::new("fullName", FieldKind::String).required(),
        Field::new("phoneNumber", FieldKind::String).required(),
        Field::new("pincode", FieldKind::String).required(),
        Field::new("area", FieldKind::String).required(),
        Field::new("city", FieldKind::String).required(),
        Field::new("state", FieldKind::String).required(),
    ],
};

/// A stored shipping address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    pub user_id: OwnerId,
    pub full_name: String,
    pub phone_number: String,
    pub pincode: String,
    pub area: String,
    pub city: String,
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Address {
    type Id = AddressId;

    fn schema() -> &'static Schema {
        &SCHEMA
    }
}

/// Address fields as submitted by a shopper; the owner is added on write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAddress {
    pub full_name: String,
    pub phone_number: String,
    pub pincode: String,
    pub area: String,
    pub city: String,
    pub state: String,
}
