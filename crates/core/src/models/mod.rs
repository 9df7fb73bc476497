//! Persisted entities.
//!
//! Each module pairs the entity struct (what a stored document decodes into)
//! with a `New*` struct (what a write sends) and the `SCHEMA` describing the
//! document. Field names on disk are camelCase.

pub mod address;
pub mod order;
pub mod product;
pub mod user;

use serde::Serialize;

pub use address::{Address, NewAddress};
pub use order::{NewOrder, Order, OrderItem, amount_for};
pub use product::{NewProduct, Product};
pub use user::{NewUser, User};

use crate::OwnerId;

/// A `New*` payload stamped with its owner's subject id.
///
/// Serializes as the inner payload plus a `userId` key.
#[derive(Debug, Serialize)]
pub struct Owned<'a, T> {
    /// Owner written to `userId`.
    #[serde(rename = "userId")]
    pub owner: &'a OwnerId,
    /// The owned payload.
    #[serde(flatten)]
    pub inner: &'a T,
}

impl<'a, T> Owned<'a, T> {
    /// Pair a payload with its owner.
    #[must_use]
    pub const fn new(owner: &'a OwnerId, inner: &'a T) -> Self {
        Self { owner, inner }
    }
}
