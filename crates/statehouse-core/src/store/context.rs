//! # Local Contexts
//!
//! Each installed module gets a `LocalContext`: module-relative `state`,
//! `getters`, `commit` and `dispatch`. Types are rewritten to
//! `namespace + type` unless the caller asks for root addressing.
//!
//! The context holds a path, never a state reference. Every `state()` call
//! walks the live root, so a context stays correct across resets and hot
//! updates.

use super::getters::Getters;
use super::{Store, StoreInner};
use crate::domain::{
    get_nested_state, CommitOptions, Deferred, DispatchOptions, ModulePath, Request, StoreError,
};
use serde_json::Value;
use std::sync::{Arc, Weak};

#[derive(Clone)]
pub struct LocalContext {
    store: Weak<StoreInner>,
    namespace: String,
    path: ModulePath,
}

impl LocalContext {
    pub(crate) fn new(store: Weak<StoreInner>, namespace: String, path: ModulePath) -> Self {
        Self {
            store,
            namespace,
            path,
        }
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[must_use]
    pub fn path(&self) -> &ModulePath {
        &self.path
    }

    pub fn commit(&self, request: impl Into<Request>) {
        self.commit_with(request, CommitOptions::default());
    }

    /// Commit, addressing the root namespace when `options.root` is set.
    pub fn commit_with(&self, request: impl Into<Request>, options: CommitOptions) {
        let Some(inner) = self.store.upgrade() else {
            return;
        };
        let store = Store::from_inner(inner);
        let request = request.into();
        if self.namespace.is_empty() || options.root {
            store.commit(request);
            return;
        }
        let (kind, payload) = match request.resolve() {
            Ok(resolved) => resolved,
            Err(err) => return store.report(err),
        };
        let global = format!("{}{}", self.namespace, kind);
        if !store.config().mode.is_production() && !store.registry().has_mutation(&global) {
            store.report(StoreError::UnknownLocalMutation {
                local: kind,
                global,
            });
            return;
        }
        store.commit(Request::new(global, payload));
    }

    pub fn dispatch(&self, request: impl Into<Request>) -> Deferred {
        self.dispatch_with(request, DispatchOptions::default())
    }

    /// Dispatch, addressing the root namespace when `options.root` is set.
    pub fn dispatch_with(&self, request: impl Into<Request>, options: DispatchOptions) -> Deferred {
        let Some(inner) = self.store.upgrade() else {
            return Deferred::resolved(Value::Null);
        };
        let store = Store::from_inner(inner);
        let request = request.into();
        if self.namespace.is_empty() || options.root {
            return store.dispatch(request);
        }
        let (kind, payload) = match request.resolve() {
            Ok(resolved) => resolved,
            Err(err) => {
                store.report(err);
                return Deferred::resolved(Value::Null);
            }
        };
        let global = format!("{}{}", self.namespace, kind);
        if !store.config().mode.is_production() && !store.registry().has_action(&global) {
            store.report(StoreError::UnknownLocalAction {
                local: kind,
                global,
            });
            return Deferred::resolved(Value::Null);
        }
        store.dispatch(Request::new(global, payload))
    }

    /// This module's slice of the live state; `Null` if it is gone.
    #[must_use]
    pub fn state(&self) -> Value {
        self.store
            .upgrade()
            .and_then(|inner| {
                let root = inner.view().state();
                get_nested_state(&root, self.path.segments()).cloned()
            })
            .unwrap_or(Value::Null)
    }

    /// Root getters when unnamespaced, otherwise the namespace's view.
    #[must_use]
    pub fn getters(&self) -> Getters {
        match self.store.upgrade() {
            Some(inner) => inner.local_getters(&self.namespace),
            None => Getters::root(Weak::new(), Arc::default()),
        }
    }
}

impl std::fmt::Debug for LocalContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalContext")
            .field("namespace", &self.namespace)
            .field("path", &self.path)
            .finish()
    }
}

/// What an action handler receives: the module's local view plus the
/// root views.
#[derive(Clone, Debug)]
pub struct ActionContext {
    store: Store,
    local: LocalContext,
}

impl ActionContext {
    pub(crate) fn new(store: Store, local: LocalContext) -> Self {
        Self { store, local }
    }

    pub fn commit(&self, request: impl Into<Request>) {
        self.local.commit(request);
    }

    pub fn commit_with(&self, request: impl Into<Request>, options: CommitOptions) {
        self.local.commit_with(request, options);
    }

    pub fn dispatch(&self, request: impl Into<Request>) -> Deferred {
        self.local.dispatch(request)
    }

    pub fn dispatch_with(&self, request: impl Into<Request>, options: DispatchOptions) -> Deferred {
        self.local.dispatch_with(request, options)
    }

    #[must_use]
    pub fn state(&self) -> Value {
        self.local.state()
    }

    #[must_use]
    pub fn getters(&self) -> Getters {
        self.local.getters()
    }

    #[must_use]
    pub fn root_state(&self) -> Arc<Value> {
        self.store.state()
    }

    #[must_use]
    pub fn root_getters(&self) -> Getters {
        self.store.getters()
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    #[must_use]
    pub fn local(&self) -> &LocalContext {
        &self.local
    }
}

/// What a getter handler receives.
pub struct GetterContext<'a> {
    pub state: &'a Value,
    pub getters: &'a Getters,
    pub root_state: &'a Value,
    pub root_getters: &'a Getters,
}
