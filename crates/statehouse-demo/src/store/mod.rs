//! # Shopping-Cart Store
//!
//! ```text
//!   root        { global }
//!   ├── cart/     { items: [{id, quantity}], checkout_status }
//!   └── products/ { all: [Product] }
//! ```
//!
//! The root owns a `set_products` mutation too. Namespacing keeps it apart
//! from `products/set_products`.

pub mod cart;
pub mod products;

use crate::api::ShopApi;
use serde_json::json;
use statehouse_core::plugins::{create_logger, LoggerOptions};
use statehouse_core::{RawModule, Store, StoreConfig, StoreOptions};
use std::sync::Arc;

/// Root module definition with both child modules attached.
pub fn root_module(shop: Arc<ShopApi>) -> RawModule {
    RawModule::new()
        .state(json!({ "global": "xx" }))
        .mutation("set_products", |state, payload| {
            state["global"] = payload.clone();
        })
        .module("cart", cart::module(shop.clone()))
        .module("products", products::module(shop))
}

/// Strict mode and the logger follow the build mode.
pub fn build_store(shop: Arc<ShopApi>, config: StoreConfig) -> Store {
    let debug = !config.mode.is_production();
    let mut options = StoreOptions::new(root_module(shop)).config(StoreConfig {
        strict: debug,
        ..config
    });
    if debug {
        options = options.plugin(create_logger(LoggerOptions::default()));
    }
    Store::with_options(options)
}
