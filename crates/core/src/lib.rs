//! QuickCart Core - Shared types library.
//!
//! This crate provides the types used across all QuickCart components:
//! - `storefront` - Public storefront server (model registry, route guard, API)
//! - `integration-tests` - In-process end-to-end tests
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. Entity schemas are plain `static` data describing the
//! document shape; the storefront's storage layer interprets them.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, emails, statuses and carts
//! - [`schema`] - Field/schema description and document validation
//! - [`models`] - The four persisted entities: users, addresses, products, orders

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod models;
pub mod schema;
pub mod types;

pub use schema::{Document, Entity, Schema, ValidationError};
pub use types::*;
