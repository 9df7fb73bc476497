//! Core types for QuickCart.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod email;
pub mod id;
pub mod owner;
pub mod price;
pub mod status;

pub use cart::CartItems;
pub use email::{Email, EmailError};
pub use id::*;
pub use owner::OwnerId;
pub use price::Price;
pub use status::OrderStatus;
