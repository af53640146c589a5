//! # Subscription Registry
//!
//! Ordered subscriber lists with idempotent add and removal by token.
//! Closures have no identity of their own, so "the same subscriber" means
//! the same `Arc` allocation.

use crate::domain::{Action, Mutation, StoreError};
use parking_lot::Mutex;
use serde_json::Value;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Weak};

/// Called after every commit with the mutation and the new state.
pub type MutationSubscriber = dyn Fn(&Mutation, &Value) + Send + Sync;

/// `(action, state)`
pub type ActionHook = Arc<dyn Fn(&Action, &Value) + Send + Sync>;

/// `(action, state, error)`
pub type ActionErrorHook = Arc<dyn Fn(&Action, &Value, &anyhow::Error) + Send + Sync>;

/// Phase hooks around a dispatch. Any subset may be set.
#[derive(Clone, Default)]
pub struct ActionSubscriber {
    pub(crate) before: Option<ActionHook>,
    pub(crate) after: Option<ActionHook>,
    pub(crate) error: Option<ActionErrorHook>,
}

impl ActionSubscriber {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs before any handler starts.
    #[must_use]
    pub fn before<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Action, &Value) + Send + Sync + 'static,
    {
        self.before = Some(Arc::new(hook));
        self
    }

    /// Runs once the dispatch resolved.
    #[must_use]
    pub fn after<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Action, &Value) + Send + Sync + 'static,
    {
        self.after = Some(Arc::new(hook));
        self
    }

    /// Runs once the dispatch rejected.
    #[must_use]
    pub fn error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Action, &Value, &anyhow::Error) + Send + Sync + 'static,
    {
        self.error = Some(Arc::new(hook));
        self
    }
}

impl std::fmt::Debug for ActionSubscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionSubscriber")
            .field("before", &self.before.is_some())
            .field("after", &self.after.is_some())
            .field("error", &self.error.is_some())
            .finish()
    }
}

fn same<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
    // Data address only; vtable pointers are not unique.
    std::ptr::eq(Arc::as_ptr(a).cast::<()>(), Arc::as_ptr(b).cast::<()>())
}

/// Token returned by `subscribe`; removes the subscriber it was issued for.
#[must_use = "dropping the token keeps the subscriber registered"]
pub struct Unsubscribe {
    remove: Box<dyn Fn() + Send + Sync>,
}

impl Unsubscribe {
    /// Remove the subscriber. Idempotent.
    pub fn unsubscribe(&self) {
        (self.remove)();
    }
}

impl std::fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Unsubscribe")
    }
}

pub(crate) struct SubscriberList<T: ?Sized> {
    entries: Arc<Mutex<Vec<Arc<T>>>>,
}

impl<T: ?Sized + Send + Sync + 'static> SubscriberList<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Insert unless already present.
    pub(crate) fn add(&self, subscriber: Arc<T>, prepend: bool) -> Unsubscribe {
        {
            let mut entries = self.entries.lock();
            if !entries.iter().any(|s| same(s, &subscriber)) {
                if prepend {
                    entries.insert(0, subscriber.clone());
                } else {
                    entries.push(subscriber.clone());
                }
            }
        }

        let list: Weak<Mutex<Vec<Arc<T>>>> = Arc::downgrade(&self.entries);
        Unsubscribe {
            remove: Box::new(move || {
                if let Some(list) = list.upgrade() {
                    let mut entries = list.lock();
                    if let Some(pos) = entries.iter().position(|s| same(s, &subscriber)) {
                        entries.remove(pos);
                    }
                }
            }),
        }
    }

    /// Copy of the current list; iteration is immune to concurrent
    /// (un)subscription.
    pub(crate) fn snapshot(&self) -> Vec<Arc<T>> {
        self.entries.lock().clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().len()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "subscriber panicked".to_string())
}

/// Run one subscriber callback, turning a panic into a diagnostic.
pub(crate) fn isolate(phase: &str, callback: impl FnOnce()) -> Result<(), StoreError> {
    catch_unwind(AssertUnwindSafe(callback)).map_err(|payload| StoreError::SubscriberPanicked {
        phase: phase.to_string(),
        message: panic_message(payload.as_ref()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Arc<MutationSubscriber> {
        Arc::new(|_: &Mutation, _: &Value| {})
    }

    #[test]
    fn test_same_subscriber_registers_once() {
        let list: SubscriberList<MutationSubscriber> = SubscriberList::new();
        let sub = noop();

        let first = list.add(sub.clone(), false);
        let _second = list.add(sub.clone(), false);
        assert_eq!(list.len(), 1);

        first.unsubscribe();
        assert_eq!(list.len(), 0);
        first.unsubscribe();
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn test_prepend_puts_subscriber_first() {
        let list: SubscriberList<MutationSubscriber> = SubscriberList::new();
        let a = noop();
        let b = noop();
        let _ua = list.add(a.clone(), false);
        let _ub = list.add(b.clone(), true);

        let snapshot = list.snapshot();
        assert!(same(&snapshot[0], &b));
        assert!(same(&snapshot[1], &a));
    }

    #[test]
    fn test_unsubscribe_removes_only_its_own_entry() {
        let list: SubscriberList<MutationSubscriber> = SubscriberList::new();
        let a = noop();
        let b = noop();
        let ua = list.add(a, false);
        let _ub = list.add(b.clone(), false);

        ua.unsubscribe();
        let snapshot = list.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert!(same(&snapshot[0], &b));
    }

    #[test]
    fn test_isolate_reports_panic_message() {
        let err = isolate("after", || panic!("exploded")).unwrap_err();
        assert_eq!(
            err,
            StoreError::SubscriberPanicked {
                phase: "after".into(),
                message: "exploded".into(),
            }
        );
        assert!(isolate("before", || {}).is_ok());
    }
}
