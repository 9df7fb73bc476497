//! Orders.
//!
//! An order stores typed references to its products and shipping address.
//! The `amount` is whatever the caller computed when placing the order; it
//! is never recomputed from the line items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::schema::{DefaultValue, Entity, Field, FieldKind, Schema};
use crate::{AddressId, OrderId, OrderStatus, OwnerId, Price, ProductId};

use super::Product;

const ITEM_FIELDS: &[Field] = &[
    Field::new("product", FieldKind::Ref(ProductId::ENTITY)),
    Field::new("quantity", FieldKind::Integer),
];
const ITEM: FieldKind = FieldKind::Object(ITEM_FIELDS);
const ITEMS: FieldKind = FieldKind::Array(&ITEM);

/// `Order` document schema.
pub static SCHEMA: Schema = Schema {
    name: "Order",
    collection: "orders",
    fields: &[
        Field::new("userId", FieldKind::String).required(),
        Field::new("items", ITEMS).with_default(DefaultValue::EmptyArray),
        Field::new("amount", FieldKind::Number).required(),
        Field::new("address", FieldKind::Ref(AddressId::ENTITY)).required(),
        Field::new("status", FieldKind::String).with_default(DefaultValue::Str(OrderStatus::PLACED)),
    ],
};

/// One line of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product: ProductId,
    pub quantity: i64,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    /// Buyer's subject id.
    pub user_id: OwnerId,
    pub items: Vec<OrderItem>,
    pub amount: Price,
    /// Shipping address.
    pub address: AddressId,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Order {
    type Id = OrderId;

    fn schema() -> &'static Schema {
        &SCHEMA
    }
}

/// Order payload; the owner is added on write and a missing status takes
/// the default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub items: Vec<OrderItem>,
    pub amount: Price,
    pub address: AddressId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
}

/// Sum of offer price times quantity over the given lines.
///
/// `None` if the total does not fit in a [`Price`].
pub fn amount_for<'a>(lines: impl IntoIterator<Item = (&'a Product, i64)>) -> Option<Price> {
    lines.into_iter().try_fold(Price::ZERO, |total, (product, quantity)| {
        total.checked_add(product.offer_price.checked_times(quantity)?)
    })
}
