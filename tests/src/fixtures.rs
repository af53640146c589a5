//! Store builders shared by the integration flows and the benchmarks.

use serde_json::{json, Value};
use statehouse_core::{BuildMode, RawModule, Store, StoreConfig, StoreError, StoreOptions};
use statehouse_reactive::{ImmediateScheduler, Runtime};
use std::sync::Arc;

/// Development checks on, teardown run inline.
pub fn dev_store(root: RawModule) -> Store {
    store_with(root, dev_config())
}

pub fn strict_store(root: RawModule) -> Store {
    store_with(root, StoreConfig::strict())
}

pub fn store_with(root: RawModule, config: StoreConfig) -> Store {
    Store::with_options(
        StoreOptions::new(root)
            .config(config)
            .engine(Arc::new(Runtime::new(ImmediateScheduler))),
    )
}

pub fn dev_config() -> StoreConfig {
    StoreConfig {
        mode: BuildMode::Development,
        ..StoreConfig::default()
    }
}

/// `{count: 0}` with `increment(by = 1)`.
pub fn counter() -> RawModule {
    RawModule::new()
        .state(json!({ "count": 0 }))
        .mutation("increment", |state, payload| {
            let by = payload.as_i64().unwrap_or(1);
            state["count"] = json!(state["count"].as_i64().unwrap_or(0) + by);
        })
}

/// Namespaced `{n}` module with `set_n`.
pub fn settable(n: i64) -> RawModule {
    RawModule::new()
        .namespaced(true)
        .state(json!({ "n": n }))
        .mutation("set_n", |state, payload| state["n"] = payload.clone())
}

pub fn errors(store: &Store) -> Vec<StoreError> {
    store.diagnostics().into_iter().map(|d| d.error).collect()
}

pub fn count(store: &Store) -> Value {
    store.state()["count"].clone()
}
