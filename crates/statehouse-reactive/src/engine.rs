//! # Reactive Engine
//!
//! The engine is the factory for roots and the owner of engine-wide
//! watchers. It is passed explicitly to whoever needs it; nothing in this
//! crate binds a process-wide instance.

use crate::root::ReactiveRoot;
use crate::scheduler::{Scheduler, Task, TokioScheduler};
use crate::watch::{Selector, WatchCallback, WatchHandle, WatchOptions, WatcherSet};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// The observation substrate consumed by the store.
pub trait ReactiveEngine: Send + Sync {
    /// Wrap a state tree into a fresh observable root.
    fn wrap(&self, state: Arc<Value>) -> Arc<ReactiveRoot>;

    /// Watch across every root this engine has produced or will produce.
    ///
    /// The selector is re-evaluated after a change in any of them.
    fn watch(
        &self,
        selector: Selector,
        callback: WatchCallback,
        options: WatchOptions,
    ) -> WatchHandle;

    /// Run `task` on the next tick.
    fn next_tick(&self, task: Task);
}

/// Default engine.
///
/// Engine-wide watchers are shared by every root the engine wraps, so one
/// `Runtime` should back exactly one store. Two stores sharing an engine
/// wake each other's `watch` callbacks.
pub struct Runtime {
    scheduler: Arc<dyn Scheduler>,
    shared: Arc<WatcherSet>,
}

impl Runtime {
    /// Create an engine that defers work through `scheduler`.
    pub fn new(scheduler: impl Scheduler + 'static) -> Self {
        Self::with_scheduler(Arc::new(scheduler))
    }

    /// Create an engine around an already shared scheduler.
    pub fn with_scheduler(scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            scheduler,
            shared: WatcherSet::new(),
        }
    }

    /// Number of live engine-wide watchers.
    #[must_use]
    pub fn watcher_count(&self) -> usize {
        self.shared.len()
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(TokioScheduler)
    }
}

impl ReactiveEngine for Runtime {
    fn wrap(&self, state: Arc<Value>) -> Arc<ReactiveRoot> {
        debug!("Wrapping state tree in a new reactive root");
        Arc::new(ReactiveRoot::new(
            state,
            self.shared.clone(),
            self.scheduler.clone(),
        ))
    }

    fn watch(
        &self,
        selector: Selector,
        callback: WatchCallback,
        options: WatchOptions,
    ) -> WatchHandle {
        self.shared.add(selector, callback, options)
    }

    fn next_tick(&self, task: Task) {
        self.scheduler.next_tick(task);
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("watchers", &self.watcher_count())
            .finish()
    }
}
