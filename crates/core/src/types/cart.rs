//! Cart contents stored on the user document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Map from product id (as a string key) to quantity.
///
/// Quantities are stored as given. Zero and negative values are representable
/// and are kept; the cart update endpoint writes whatever the client sends.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartItems(BTreeMap<String, i64>);

impl CartItems {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Quantity stored for a product, if any.
    #[must_use]
    pub fn get(&self, product_id: &str) -> Option<i64> {
        self.0.get(product_id).copied()
    }

    /// Set the quantity for a product, returning the previous quantity.
    pub fn set(&mut self, product_id: impl Into<String>, quantity: i64) -> Option<i64> {
        self.0.insert(product_id.into(), quantity)
    }

    /// Drop a product from the cart.
    pub fn remove(&mut self, product_id: &str) -> Option<i64> {
        self.0.remove(product_id)
    }

    /// Sum of all stored quantities, or `None` if it overflows `i64`.
    #[must_use]
    pub fn total_quantity(&self) -> Option<i64> {
        self.0.values().try_fold(0_i64, |total, &qty| total.checked_add(qty))
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the cart has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate `(product_id, quantity)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.0.iter().map(|(id, qty)| (id.as_str(), *qty))
    }
}

impl<K: Into<String>> FromIterator<(K, i64)> for CartItems {
    fn from_iter<T: IntoIterator<Item = (K, i64)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
