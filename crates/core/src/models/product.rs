//! Catalog products.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::schema::{Entity, Field, FieldKind, Schema};
use crate::{OwnerId, Price, ProductId};

const IMAGES: FieldKind = FieldKind::Array(&FieldKind::String);

/// `Product` document schema.
///
/// `offerPrice` is not checked against `price`.
pub static SCHEMA: Schema = Schema {
    name: "Product",
    collection: "products",
    fields: &[
        Field::new("userId", FieldKind::String).required(),
        Field::new("name", FieldKind::String).required(),
        Field::new("description", FieldKind::String),
        Field::new("price", FieldKind::Number).required(),
        Field::new("offerPrice", FieldKind::Number).required(),
        Field::new("category", FieldKind::String).required(),
        Field::new("image", IMAGES).required(),
    ],
};

/// A product listed by a seller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    /// Seller who listed the product.
    pub user_id: OwnerId,
    pub name: String,
    pub description: Option<String>,
    /// List price.
    pub price: Price,
    /// Price actually charged.
    pub offer_price: Price,
    pub category: String,
    /// Image URLs in display order.
    pub image: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Product {
    type Id = ProductId;

    fn schema() -> &'static Schema {
        &SCHEMA
    }
}

/// Product fields as submitted by a seller; the owner is added on write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: Price,
    pub offer_price: Price,
    pub category: String,
    pub image: Vec<String>,
}
