//! `cart` module: cart lines, checkout status and derived totals.

use crate::api::{CartLine, ShopApi};
use serde_json::{json, Value};
use statehouse_core::{ActionContext, CommitOptions, GetterContext, RawModule};
use std::sync::Arc;
use tracing::info;

pub const STATUS_SUCCESSFUL: &str = "successful";
pub const STATUS_FAILED: &str = "failed";

pub fn module(shop: Arc<ShopApi>) -> RawModule {
    RawModule::new()
        .namespaced(true)
        .state_factory(|| json!({ "items": [], "checkout_status": null }))
        .getter("cart_products", cart_products)
        .getter("cart_total_price", cart_total_price)
        .async_action("checkout", move |ctx, _| checkout(shop.clone(), ctx))
        .action("add_product_to_cart", add_product_to_cart)
        .mutation("push_product_to_cart", |state, payload| {
            if let Some(items) = state["items"].as_array_mut() {
                items.push(json!({ "id": payload["id"], "quantity": 1 }));
            }
        })
        .mutation("increment_item_quantity", |state, payload| {
            let id = payload["id"].as_u64();
            let item = state["items"]
                .as_array_mut()
                .and_then(|items| items.iter_mut().find(|item| item["id"].as_u64() == id));
            if let Some(item) = item {
                item["quantity"] = json!(item["quantity"].as_u64().unwrap_or(0) + 1);
            }
        })
        .mutation("set_cart_items", |state, payload| {
            state["items"] = payload["items"].clone();
        })
        .mutation("set_checkout_status", |state, status| {
            state["checkout_status"] = status.clone();
        })
}

/// Cart lines joined with the catalog: `[{title, price, quantity}]`.
fn cart_products(ctx: GetterContext<'_>) -> Value {
    let catalog = ctx.root_state["products"]["all"].as_array();
    let lines = ctx.state["items"].as_array().into_iter().flatten();
    let products = lines
        .filter_map(|line| {
            let product = catalog?.iter().find(|p| p["id"] == line["id"])?;
            Some(json!({
                "title": product["title"],
                "price": product["price"],
                "quantity": line["quantity"],
            }))
        })
        .collect();
    Value::Array(products)
}

fn cart_total_price(ctx: GetterContext<'_>) -> Value {
    let products = ctx.getters.get("cart_products").unwrap_or_default();
    let total: f64 = products
        .as_array()
        .into_iter()
        .flatten()
        .map(|p| p["price"].as_f64().unwrap_or(0.0) * p["quantity"].as_f64().unwrap_or(0.0))
        .sum();
    json!((total * 100.0).round() / 100.0)
}

fn add_product_to_cart(ctx: ActionContext, product: Value) {
    ctx.commit("set_checkout_status");
    if product["inventory"].as_u64().unwrap_or(0) == 0 {
        return;
    }
    let id = product["id"].clone();
    let in_cart = ctx.state()["items"]
        .as_array()
        .is_some_and(|items| items.iter().any(|item| item["id"] == id));
    if in_cart {
        ctx.commit(("increment_item_quantity", json!({ "id": id })));
    } else {
        ctx.commit(("push_product_to_cart", json!({ "id": id })));
    }
    ctx.commit_with(
        ("products/decrement_product_inventory", json!({ "id": id })),
        CommitOptions { root: true },
    );
}

/// Empties the cart optimistically and restores it if the shop rejects.
async fn checkout(shop: Arc<ShopApi>, ctx: ActionContext) -> anyhow::Result<Value> {
    let saved = ctx.state()["items"].clone();
    let lines: Vec<CartLine> = serde_json::from_value(saved.clone())?;

    ctx.commit("set_checkout_status");
    ctx.commit(("set_cart_items", json!({ "items": [] })));

    let status = match shop.buy_products(&lines).await {
        Ok(()) => STATUS_SUCCESSFUL,
        Err(err) => {
            info!(error = %err, "Checkout failed, restoring cart");
            ctx.commit(("set_cart_items", json!({ "items": saved })));
            STATUS_FAILED
        }
    };
    ctx.commit(("set_checkout_status", json!(status)));
    Ok(json!(status))
}
