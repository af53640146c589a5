//! # Statehouse Demo
//!
//! A shopping cart on top of `statehouse-core`: products are fetched from a
//! simulated shop, added to a cart with inventory bookkeeping, and checked
//! out with an optimistic cart clear that is rolled back on rejection.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod api;
pub mod store;

pub use api::{CartLine, Product, ShopApi, ShopError};
pub use store::build_store;
