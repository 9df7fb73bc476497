//! Order status.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Free-form order status label.
///
/// Sellers move orders through whatever labels their fulfillment uses, so the
/// status is a string rather than a closed enum. New orders start at
/// [`OrderStatus::PLACED`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderStatus(String);

impl OrderStatus {
    /// Status every order starts with.
    pub const PLACED: &'static str = "Order Placed";

    /// Create a status from any label.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Returns the status label.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is still the initial status.
    #[must_use]
    pub fn is_placed(&self) -> bool {
        self.0 == Self::PLACED
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        Self::new(Self::PLACED)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
