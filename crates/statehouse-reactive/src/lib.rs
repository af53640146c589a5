//! # Statehouse Reactive - Observation Substrate
//!
//! Turns a plain `serde_json::Value` tree into something observers can
//! subscribe to, and recomputes derived values lazily.
//!
//! ## Operations
//!
//! - **wrap**: `ReactiveEngine::wrap(state)` produces a `ReactiveRoot`
//! - **defineComputed**: `ReactiveRoot::define_computed(name, fn)`
//! - **watch**: root-scoped (`ReactiveRoot::watch`) or engine-wide
//!   (`ReactiveEngine::watch`, survives root swaps)
//! - **teardown**: `ReactiveRoot::teardown()`
//!
//! ```text
//!   mutate()/replace()
//!         │
//!         ▼
//!  ┌──────────────┐   version++    ┌──────────────────┐
//!  │ ReactiveRoot │ ─────────────→ │ computed slots   │ (stale until read)
//!  │  Arc<Value>  │                └──────────────────┘
//!  └──────────────┘   notify       ┌──────────────────┐
//!         └──────────────────────→ │ root + engine    │ sync: inline
//!                                  │ watcher sets     │ async: next tick
//!                                  └──────────────────┘
//! ```
//!
//! The engine is an explicit dependency: callers construct a `Runtime`
//! with the `Scheduler` of their choice and hand it to whatever needs it.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod computed;
pub mod engine;
pub mod root;
pub mod scheduler;
pub mod watch;

pub use computed::ComputedFn;
pub use engine::{ReactiveEngine, Runtime};
pub use root::ReactiveRoot;
pub use scheduler::{ImmediateScheduler, ManualScheduler, Scheduler, Task, TokioScheduler};
pub use watch::{Selector, WatchCallback, WatchHandle, WatchOptions};
