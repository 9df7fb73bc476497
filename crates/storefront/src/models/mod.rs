//! Storefront-local models.
//!
//! Persisted entities live in `quickcart_core::models`; this module holds
//! the types that only exist at the HTTP edge.

pub mod session;

pub use session::{CurrentUser, keys as session_keys};
