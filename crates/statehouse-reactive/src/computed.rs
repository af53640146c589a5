//! # Computed Slots
//!
//! A computed slot memoizes its function against the state version of the
//! root it belongs to. Reads between two changes return the cached value.

use parking_lot::Mutex;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A derived-value function.
pub type ComputedFn = Arc<dyn Fn() -> Value + Send + Sync>;

pub(crate) struct ComputedSlot {
    func: ComputedFn,
    cache: Mutex<Option<(u64, Value)>>,
    evaluations: AtomicU64,
}

impl ComputedSlot {
    pub(crate) fn new(func: ComputedFn) -> Self {
        Self {
            func,
            cache: Mutex::new(None),
            evaluations: AtomicU64::new(0),
        }
    }

    /// Cached value for `version`, recomputing if stale.
    pub(crate) fn get(&self, version: u64) -> Value {
        if let Some((cached_at, value)) = &*self.cache.lock() {
            if *cached_at == version {
                return value.clone();
            }
        }
        // Not holding the cache lock: the function may read other slots.
        let value = (self.func)();
        self.evaluations.fetch_add(1, Ordering::Relaxed);
        *self.cache.lock() = Some((version, value.clone()));
        value
    }

    pub(crate) fn evaluations(&self) -> u64 {
        self.evaluations.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_slot_memoizes_per_version() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        let slot = ComputedSlot::new(Arc::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
            json!("v")
        }));

        assert_eq!(slot.get(0), json!("v"));
        assert_eq!(slot.get(0), json!("v"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        slot.get(1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(slot.evaluations(), 2);
    }
}
