//! # Shopping Cart Flow
//!
//! The demo store driven through a full session, including concurrent
//! dispatches that interleave at their await points.

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use statehouse_core::{BuildMode, Store, StoreConfig};
    use statehouse_demo::{build_store, ShopApi};
    use std::sync::Arc;
    use std::time::Duration;

    fn shop_store(latency: Duration) -> (Store, Arc<ShopApi>) {
        let shop = Arc::new(ShopApi::with_default_catalog(latency));
        let config = StoreConfig {
            mode: BuildMode::Development,
            ..StoreConfig::default()
        };
        (build_store(shop.clone(), config), shop)
    }

    fn product(store: &Store, id: u64) -> Value {
        store.state()["products"]["all"]
            .as_array()
            .and_then(|all| all.iter().find(|p| p["id"] == json!(id)).cloned())
            .unwrap()
    }

    #[tokio::test]
    async fn test_full_session() {
        let (store, _) = shop_store(Duration::ZERO);
        store.dispatch("products/get_all_products").await.unwrap();

        for id in [1, 2, 2, 3] {
            let p = product(&store, id);
            store.dispatch(("cart/add_product_to_cart", p)).await.unwrap();
        }
        assert_eq!(store.getter("cart/cart_total_price"), Some(json!(541.98)));

        let status = store.dispatch("cart/checkout").await.unwrap();
        assert_eq!(status, json!("successful"));
        assert_eq!(store.getter("cart/cart_products"), Some(json!([])));
        assert_eq!(product(&store, 2)["inventory"], json!(8));
        assert_eq!(store.state()["global"], json!("xx"));
        assert!(store.diagnostics().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_fetch_and_checkout_interleave() {
        let (store, shop) = shop_store(Duration::from_millis(5));
        store.dispatch("products/get_all_products").await.unwrap();
        let p = product(&store, 3);
        store.dispatch(("cart/add_product_to_cart", p)).await.unwrap();
        shop.set_reject_checkout(true);

        let (refetch, checkout) = futures::join!(
            store.dispatch("products/get_all_products"),
            store.dispatch("cart/checkout"),
        );

        assert_eq!(refetch.unwrap(), json!(3));
        assert_eq!(checkout.unwrap(), json!("failed"));
        assert_eq!(store.state()["cart"]["items"], json!([{"id": 3, "quantity": 1}]));
        // the refetch resets inventory to the shop's catalog
        assert_eq!(product(&store, 3)["inventory"], json!(5));
    }
}
