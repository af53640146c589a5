//! Runs one shopping session against the demo store and logs the result.
//!
//! Set `DEMO_REJECT_CHECKOUT=1` to make the shop refuse the order.

use serde_json::Value;
use statehouse_core::StoreConfig;
use statehouse_demo::{build_store, ShopApi};
use statehouse_telemetry::{init_logging, TelemetryConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging(&TelemetryConfig::from_env())?;

    let shop = Arc::new(ShopApi::with_default_catalog(Duration::from_millis(100)));
    shop.set_reject_checkout(std::env::var("DEMO_REJECT_CHECKOUT").is_ok_and(|v| v == "1"));

    let store = build_store(shop, StoreConfig::from_env());
    store.dispatch("products/get_all_products").await?;

    for id in [1u64, 2, 2, 3] {
        let product = store.state()["products"]["all"]
            .as_array()
            .and_then(|all| all.iter().find(|p| p["id"] == Value::from(id)).cloned())
            .unwrap_or_default();
        store
            .dispatch(("cart/add_product_to_cart", product))
            .await?;
    }

    info!(
        total = %store.getter("cart/cart_total_price").unwrap_or_default(),
        "Cart filled"
    );

    let status = store.dispatch("cart/checkout").await?;
    info!(%status, state = %store.state(), "Checkout finished");

    for diagnostic in store.take_diagnostics() {
        info!(seq = diagnostic.seq, error = %diagnostic.error, "Diagnostic");
    }
    Ok(())
}
