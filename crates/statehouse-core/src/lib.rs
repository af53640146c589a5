//! # Statehouse Core - Module Installation and Dispatch Engine
//!
//! A centralized, hierarchical, mutation-gated state container. A tree of
//! module definitions is flattened into one addressable namespace of
//! mutations, actions and getters over a single composite state tree.
//!
//! ## Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | State changes only inside a commit window | `store/mod.rs` - `with_commit()`, `store/strict.rs` |
//! | One composite tree per store, swapped atomically | `store/mod.rs` - `reset_view()` |
//! | Distinct modules never share a namespace | `store/install.rs` - namespace map |
//! | First getter registration wins | `store/install.rs` - getter registry |
//! | Contexts read live state by path | `store/context.rs` - `LocalContext::state()` |
//!
//! ## Control Flow
//!
//! ```text
//!   RawModule tree
//!        │ ModuleCollection::new
//!        ▼
//!   ┌────────────┐  Installer   ┌───────────────────────────────┐
//!   │ Module     │ ───────────→ │ Registry                      │
//!   │ tree       │              │  mutations / actions / getters│
//!   └────────────┘              └───────────────────────────────┘
//!                                      │ reset_view
//!                                      ▼
//!                               ┌───────────────┐
//!   commit / dispatch ────────→ │ ReactiveRoot  │ ──→ subscribers, watchers
//!                               └───────────────┘
//! ```
//!
//! ## Error Policy
//!
//! Configuration and lookup problems never cross the public API; they are
//! reported on the diagnostic channel (`Store::diagnostics`). Mutation
//! handler panics propagate to `commit`'s caller. Action failures reject
//! the returned `Deferred`. Subscriber panics are caught per subscriber.
//!
//! ## Example
//!
//! ```
//! use statehouse_core::{RawModule, Store};
//! use serde_json::json;
//!
//! let store = Store::new(
//!     RawModule::new()
//!         .state(json!({"count": 0}))
//!         .mutation("increment", |state, payload| {
//!             let by = payload.as_i64().unwrap_or(1);
//!             state["count"] = json!(state["count"].as_i64().unwrap_or(0) + by);
//!         }),
//! );
//! store.commit(("increment", json!(5)));
//! assert_eq!(store.state()["count"], json!(5));
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod domain;
pub mod plugins;
pub mod store;

pub use config::{BuildMode, StoreConfig};
pub use domain::{
    Action, ActionDef, CommitOptions, Deferred, DispatchOptions, IntoDeferred, Module,
    ModuleCollection, ModulePath, Mutation, RawModule, RegisterOptions, Request, Severity,
    StoreError, SubscribeOptions,
};
pub use store::context::{ActionContext, GetterContext, LocalContext};
pub use store::diagnostics::Diagnostic;
pub use store::getters::Getters;
pub use store::subscription::{ActionSubscriber, MutationSubscriber, Unsubscribe};
pub use store::{Plugin, Store, StoreOptions};

pub use statehouse_reactive::{WatchHandle, WatchOptions};
