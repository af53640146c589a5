//! # Watchers
//!
//! A watcher pairs a selector with a callback. After every change of the
//! state it observes, the selector is re-evaluated and the callback is run
//! with `(new, old)` when the selected value differs (or on every change for
//! deep watchers).

use parking_lot::Mutex;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::trace;

/// Produces the value a watcher observes.
pub type Selector = Arc<dyn Fn() -> Value + Send + Sync>;

/// Receives `(new_value, old_value)`.
pub type WatchCallback = Arc<dyn Fn(&Value, &Value) + Send + Sync>;

/// Watcher behaviour flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchOptions {
    /// Fire on every change of the observed root, even if the selected
    /// value compares equal.
    pub deep: bool,
    /// Fire once at registration, with `Null` as the old value.
    pub immediate: bool,
    /// Fire inline before the mutating call returns instead of on the
    /// next tick.
    pub sync: bool,
}

impl WatchOptions {
    /// Deep, synchronous watch (what invariant checkers want).
    #[must_use]
    pub fn deep_sync() -> Self {
        Self {
            deep: true,
            immediate: false,
            sync: true,
        }
    }
}

struct Watcher {
    id: u64,
    selector: Selector,
    callback: WatchCallback,
    options: WatchOptions,
    last: Mutex<Value>,
    active: AtomicBool,
}

impl Watcher {
    fn run(&self) {
        if !self.active.load(Ordering::Acquire) {
            return;
        }
        let next = (self.selector)();
        let prev = {
            let mut last = self.last.lock();
            if !self.options.deep && *last == next {
                return;
            }
            std::mem::replace(&mut *last, next.clone())
        };
        (self.callback)(&next, &prev);
    }
}

/// An ordered set of watchers with a pending queue for deferred runs.
#[derive(Default)]
pub(crate) struct WatcherSet {
    watchers: Mutex<Vec<Arc<Watcher>>>,
    pending: Mutex<Vec<Arc<Watcher>>>,
    flush_scheduled: AtomicBool,
    next_id: AtomicU64,
}

impl WatcherSet {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn add(
        self: &Arc<Self>,
        selector: Selector,
        callback: WatchCallback,
        options: WatchOptions,
    ) -> WatchHandle {
        let initial = selector();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let watcher = Arc::new(Watcher {
            id,
            selector,
            callback: callback.clone(),
            options,
            last: Mutex::new(initial.clone()),
            active: AtomicBool::new(true),
        });
        self.watchers.lock().push(watcher);

        if options.immediate {
            callback(&initial, &Value::Null);
        }

        WatchHandle {
            set: Arc::downgrade(self),
            id,
        }
    }

    /// Run sync watchers now and queue the rest.
    ///
    /// Returns `true` when the caller must schedule a `flush`.
    pub(crate) fn notify(&self) -> bool {
        let snapshot = self.watchers.lock().clone();
        let mut deferred = false;
        for watcher in snapshot {
            if watcher.options.sync {
                watcher.run();
            } else {
                let mut pending = self.pending.lock();
                if !pending.iter().any(|w| w.id == watcher.id) {
                    pending.push(watcher);
                }
                deferred = true;
            }
        }
        deferred && !self.flush_scheduled.swap(true, Ordering::AcqRel)
    }

    /// Run every queued watcher once.
    pub(crate) fn flush(&self) {
        self.flush_scheduled.store(false, Ordering::Release);
        let batch = std::mem::take(&mut *self.pending.lock());
        trace!(watchers = batch.len(), "Flushing deferred watchers");
        for watcher in batch {
            watcher.run();
        }
    }

    pub(crate) fn remove(&self, id: u64) {
        let mut watchers = self.watchers.lock();
        if let Some(pos) = watchers.iter().position(|w| w.id == id) {
            watchers.remove(pos).active.store(false, Ordering::Release);
        }
    }

    pub(crate) fn clear(&self) {
        for watcher in self.watchers.lock().drain(..) {
            watcher.active.store(false, Ordering::Release);
        }
        self.pending.lock().clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.watchers.lock().len()
    }
}

/// Handle returned by every `watch` call.
///
/// Dropping the handle does NOT stop the watcher; call `unwatch`.
#[derive(Debug, Clone)]
pub struct WatchHandle {
    set: Weak<WatcherSet>,
    id: u64,
}

impl WatchHandle {
    /// Stop the watcher. Calling it again is a no-op.
    pub fn unwatch(&self) {
        if let Some(set) = self.set.upgrade() {
            set.remove(self.id);
        }
    }
}

impl std::fmt::Debug for WatcherSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherSet")
            .field("watchers", &self.len())
            .finish()
    }
}
