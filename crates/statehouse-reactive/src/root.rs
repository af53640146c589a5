//! # Reactive Root
//!
//! The observable wrapper around one state tree.
//!
//! ## Copy-on-write state
//!
//! The tree is held as `Arc<Value>`. `state()` hands out the current `Arc`
//! (a cheap immutable snapshot); `mutate()` goes through `Arc::make_mut`, so
//! outstanding snapshots are never modified underneath their holders.

use crate::computed::{ComputedFn, ComputedSlot};
use crate::scheduler::Scheduler;
use crate::watch::{Selector, WatchCallback, WatchHandle, WatchOptions, WatcherSet};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// An observable state tree plus its computed slots and watchers.
pub struct ReactiveRoot {
    state: RwLock<Arc<Value>>,
    version: AtomicU64,
    computed: RwLock<HashMap<String, Arc<ComputedSlot>>>,
    /// Watchers scoped to this root; dropped on teardown.
    watchers: Arc<WatcherSet>,
    /// Engine-wide watchers; notified by every root of the engine.
    shared: Arc<WatcherSet>,
    scheduler: Arc<dyn Scheduler>,
    /// Set once this root stops being the live view of its owner.
    detached: AtomicBool,
    torn_down: AtomicBool,
}

/// Publishes a change when dropped, so a panicking writer still bumps the
/// version for whatever it left behind.
struct ChangeGuard<'a>(&'a ReactiveRoot);

impl Drop for ChangeGuard<'_> {
    fn drop(&mut self) {
        self.0.changed();
    }
}

impl ReactiveRoot {
    pub(crate) fn new(
        state: Arc<Value>,
        shared: Arc<WatcherSet>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        Self {
            state: RwLock::new(state),
            version: AtomicU64::new(0),
            computed: RwLock::new(HashMap::new()),
            watchers: WatcherSet::new(),
            shared,
            scheduler,
            detached: AtomicBool::new(false),
            torn_down: AtomicBool::new(false),
        }
    }

    /// Current state snapshot.
    #[must_use]
    pub fn state(&self) -> Arc<Value> {
        self.state.read().clone()
    }

    /// Number of changes applied so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Apply `f` to the state tree and notify observers.
    ///
    /// Sync watchers have run by the time this returns. If `f` panics the
    /// partial write is kept and still published before unwinding goes on.
    pub fn mutate<R>(&self, f: impl FnOnce(&mut Value) -> R) -> R {
        let _changed = ChangeGuard(self);
        let mut guard = self.state.write();
        let result = f(Arc::make_mut(&mut guard));
        drop(guard);
        result
    }

    /// Swap in a whole new state tree and notify observers.
    pub fn replace(&self, state: Value) {
        *self.state.write() = Arc::new(state);
        self.changed();
    }

    /// Register a memoized derived value under `name`.
    ///
    /// Redefining a name replaces the previous slot.
    pub fn define_computed(&self, name: impl Into<String>, func: ComputedFn) {
        self.computed
            .write()
            .insert(name.into(), Arc::new(ComputedSlot::new(func)));
    }

    /// Read a computed value, recomputing only if the state changed since
    /// the last read.
    #[must_use]
    pub fn computed(&self, name: &str) -> Option<Value> {
        let slot = self.computed.read().get(name).cloned()?;
        Some(slot.get(self.version()))
    }

    /// Whether `name` is a defined computed slot.
    #[must_use]
    pub fn has_computed(&self, name: &str) -> bool {
        self.computed.read().contains_key(name)
    }

    /// How many times the slot `name` has actually been evaluated.
    #[must_use]
    pub fn evaluations(&self, name: &str) -> Option<u64> {
        self.computed.read().get(name).map(|slot| slot.evaluations())
    }

    /// Watch this root only. The watcher dies with the root.
    pub fn watch(
        &self,
        selector: Selector,
        callback: WatchCallback,
        options: WatchOptions,
    ) -> WatchHandle {
        self.watchers.add(selector, callback, options)
    }

    /// Stop notifying engine-wide watchers. Root-scoped watchers and
    /// computed slots keep working until `teardown`.
    pub fn detach(&self) {
        self.detached.store(true, Ordering::Release);
    }

    /// Whether `detach` has run.
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.detached.load(Ordering::Acquire)
    }

    /// Drop every computed slot and root-scoped watcher.
    pub fn teardown(&self) {
        if self.torn_down.swap(true, Ordering::AcqRel) {
            return;
        }
        self.watchers.clear();
        self.computed.write().clear();
        debug!(version = self.version(), "Reactive root torn down");
    }

    /// Whether `teardown` has run.
    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::Acquire)
    }

    fn changed(&self) {
        self.version.fetch_add(1, Ordering::AcqRel);
        if self.is_torn_down() {
            return;
        }
        for (set, engine_wide) in [(&self.watchers, false), (&self.shared, true)] {
            if engine_wide && self.is_detached() {
                continue;
            }
            if set.notify() {
                let target = Arc::downgrade(set);
                self.scheduler.next_tick(Box::new(move || {
                    if let Some(set) = target.upgrade() {
                        set.flush();
                    }
                }));
            }
        }
    }
}

impl std::fmt::Debug for ReactiveRoot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReactiveRoot")
            .field("version", &self.version())
            .field("computed", &self.computed.read().len())
            .field("watchers", &self.watchers.len())
            .field("detached", &self.is_detached())
            .field("torn_down", &self.is_torn_down())
            .finish()
    }
}
