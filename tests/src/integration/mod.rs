//! # Integration Flows
//!
//! Whole-store behaviour through the public API only.

pub mod dynamic_modules;
pub mod properties;
pub mod shopping_cart;
pub mod subscriptions;
