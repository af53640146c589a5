//! Simulated shop backend with artificial latency.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub title: String,
    pub price: f64,
    pub inventory: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: u64,
    pub quantity: u32,
}

#[derive(Debug, Error)]
pub enum ShopError {
    #[error("checkout rejected by the shop for {0} cart line(s)")]
    CheckoutRejected(usize),
}

/// In-memory shop. Checkout outcome is controlled by `set_reject_checkout`.
#[derive(Debug)]
pub struct ShopApi {
    catalog: Vec<Product>,
    latency: Duration,
    reject_checkout: AtomicBool,
}

impl ShopApi {
    pub fn new(catalog: Vec<Product>, latency: Duration) -> Self {
        Self {
            catalog,
            latency,
            reject_checkout: AtomicBool::new(false),
        }
    }

    /// The three-product catalog used by the demo binary.
    pub fn with_default_catalog(latency: Duration) -> Self {
        Self::new(
            vec![
                Product {
                    id: 1,
                    title: "iPad 4 Mini".into(),
                    price: 500.01,
                    inventory: 2,
                },
                Product {
                    id: 2,
                    title: "H&M T-Shirt White".into(),
                    price: 10.99,
                    inventory: 10,
                },
                Product {
                    id: 3,
                    title: "Charli XCX - Sucker CD".into(),
                    price: 19.99,
                    inventory: 5,
                },
            ],
            latency,
        )
    }

    pub fn set_reject_checkout(&self, reject: bool) {
        self.reject_checkout.store(reject, Ordering::SeqCst);
    }

    pub async fn get_products(&self) -> Vec<Product> {
        tokio::time::sleep(self.latency).await;
        debug!(count = self.catalog.len(), "Fetched products");
        self.catalog.clone()
    }

    pub async fn buy_products(&self, lines: &[CartLine]) -> Result<(), ShopError> {
        tokio::time::sleep(self.latency).await;
        if self.reject_checkout.load(Ordering::SeqCst) {
            return Err(ShopError::CheckoutRejected(lines.len()));
        }
        debug!(lines = lines.len(), "Checkout accepted");
        Ok(())
    }
}
