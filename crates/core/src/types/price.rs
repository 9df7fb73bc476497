//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are stored in documents as plain JSON numbers, so the wire form is
//! a float. In memory they are [`Decimal`] so totals do not drift.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A monetary amount in the store's single currency.
///
/// No sign or ordering rules are enforced here: a product's offer price is
/// expected to be at or below its list price, but callers own that check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// Zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from an amount in cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// This price multiplied by a line-item quantity, or `None` on overflow.
    #[must_use]
    pub fn checked_times(self, quantity: i64) -> Option<Self> {
        self.0.checked_mul(Decimal::from(quantity)).map(Self)
    }

    /// Sum of two prices, or `None` on overflow.
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_times_and_add() {
        let total = Price::from_cents(1050)
            .checked_times(2)
            .and_then(|a| a.checked_add(Price::from_cents(300)))
            .unwrap();
        assert_eq!(total, Price::from_cents(2400));
        assert_eq!(total.to_string(), "24.00");
    }

    #[test]
    fn test_overflow_is_none() {
        let big = Price::new(Decimal::MAX);
        assert_eq!(big.checked_times(2), None);
        assert_eq!(big.checked_add(Price::from_cents(100)), None);
        assert_eq!(
            Price::new(Decimal::from(1_000_000_000_000_i64)).checked_times(i64::MAX),
            None
        );
    }

    #[test]
    fn test_serializes_as_json_number() {
        let json = serde_json::to_value(Price::from_cents(1250)).unwrap();
        assert_eq!(json, serde_json::json!(12.5));

        let parsed: Price = serde_json::from_value(serde_json::json!(40)).unwrap();
        assert_eq!(parsed, Price::from_cents(4000));
    }
}
