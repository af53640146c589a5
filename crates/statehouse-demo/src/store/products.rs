//! `products` module: the catalog and its inventory.

use crate::api::ShopApi;
use serde_json::{json, Value};
use statehouse_core::{ActionContext, RawModule};
use std::sync::Arc;

pub fn module(shop: Arc<ShopApi>) -> RawModule {
    RawModule::new()
        .namespaced(true)
        .state_factory(|| json!({ "all": [] }))
        .async_action("get_all_products", move |ctx, _| {
            get_all_products(shop.clone(), ctx)
        })
        .mutation("set_products", |state, products| {
            state["all"] = products.clone();
        })
        .mutation("decrement_product_inventory", |state, payload| {
            let id = payload["id"].as_u64();
            let product = state["all"]
                .as_array_mut()
                .and_then(|all| all.iter_mut().find(|p| p["id"].as_u64() == id));
            if let Some(product) = product {
                let inventory = product["inventory"].as_u64().unwrap_or(0);
                product["inventory"] = json!(inventory.saturating_sub(1));
            }
        })
}

async fn get_all_products(shop: Arc<ShopApi>, ctx: ActionContext) -> anyhow::Result<Value> {
    let products = shop.get_products().await;
    let count = products.len();
    ctx.commit(("set_products", serde_json::to_value(products)?));
    Ok(json!(count))
}
