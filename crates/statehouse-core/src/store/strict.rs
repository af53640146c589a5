//! Strict mode: any change to the observed root outside a commit window is
//! reported as `StrictModeViolation`.

use super::StoreInner;
use crate::domain::StoreError;
use serde_json::Value;
use statehouse_reactive::{ReactiveRoot, WatchHandle, WatchOptions};
use std::sync::Arc;

/// Install the checker on `root`. It dies with the root.
pub(crate) fn enable(store: &Arc<StoreInner>, root: &ReactiveRoot) -> WatchHandle {
    let store = Arc::downgrade(store);
    root.watch(
        Arc::new(|| Value::Null),
        Arc::new(move |_: &Value, _: &Value| {
            if let Some(inner) = store.upgrade() {
                if !inner.is_committing() {
                    inner.report(StoreError::StrictModeViolation);
                }
            }
        }),
        WatchOptions::deep_sync(),
    )
}
