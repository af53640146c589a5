//! # Registration Engine
//!
//! Walks the module tree depth-first (pre-order) and flattens it into a
//! `Registry`. For every module:
//!
//! 1. record the namespace (first registration wins)
//! 2. queue a state graft onto the parent's state, unless root or hot
//! 3. build and attach the `LocalContext`
//! 4. register mutations under `namespace + key`
//! 5. register actions under `namespace + key`, or the bare key when
//!    `root` is set
//! 6. register getters under `namespace + key` (first registration wins)
//! 7. recurse into children
//!
//! Grafts are returned instead of applied, so the caller can apply them in
//! one commit window after the module tree lock is released.

use super::context::{ActionContext, GetterContext, LocalContext};
use super::registry::Registry;
use super::{Store, StoreInner};
use crate::domain::{
    get_nested_state, get_nested_state_mut, Deferred, Module, ModuleCollection, ModulePath,
    StoreError,
};
use serde_json::Value;
use std::sync::{Arc, Weak};
use tracing::debug;

/// A module state waiting to be placed into the composite tree.
pub(crate) type Graft = (ModulePath, Value);

pub(crate) struct Installer<'a> {
    store: &'a Arc<StoreInner>,
    registry: &'a mut Registry,
    grafts: Vec<Graft>,
    hot: bool,
}

impl<'a> Installer<'a> {
    pub(crate) fn new(store: &'a Arc<StoreInner>, registry: &'a mut Registry, hot: bool) -> Self {
        Self {
            store,
            registry,
            grafts: Vec::new(),
            hot,
        }
    }

    /// Install the module at `path` and its subtree.
    pub(crate) fn install(mut self, modules: &mut ModuleCollection, path: &ModulePath) -> Vec<Graft> {
        let Some(namespace) = modules.get_namespace(path.segments()) else {
            self.store.report(StoreError::ModuleNotFound(path.to_string()));
            return self.grafts;
        };
        match modules.get_mut(path.segments()) {
            Some(module) => self.install_module(module, path.clone(), namespace),
            None => self.store.report(StoreError::ModuleNotFound(path.to_string())),
        }
        self.grafts
    }

    fn install_module(&mut self, module: &mut Module, path: ModulePath, namespace: String) {
        let weak = Arc::downgrade(self.store);

        if module.namespaced() {
            match self.registry.namespaces.get(&namespace).cloned() {
                Some(existing) if existing != path => {
                    self.store.report(StoreError::DuplicateNamespace {
                        namespace: namespace.clone(),
                        path: path.to_string(),
                    });
                }
                Some(_) => {}
                None => {
                    self.registry
                        .namespaces
                        .insert(namespace.clone(), path.clone());
                }
            }
        }

        if !path.is_root() && !self.hot {
            self.grafts.push((path.clone(), module.state().clone()));
        }

        let local = LocalContext::new(weak.clone(), namespace.clone(), path.clone());
        module.set_context(local.clone());

        for (key, handler) in module.mutations() {
            let kind = format!("{}{}", namespace, key);
            let handler = handler.clone();
            let segments = path.segments().to_vec();
            let store = weak.clone();
            self.registry
                .mutations
                .entry(kind)
                .or_default()
                .push(Arc::new(move |root: &mut Value, payload: &Value| {
                    match get_nested_state_mut(root, &segments) {
                        Some(state) => handler(state, payload),
                        None => report(&store, StoreError::MissingModuleState(segments.join("/"))),
                    }
                }));
        }

        for (key, def) in module.actions() {
            let kind = if def.is_root() {
                key.clone()
            } else {
                format!("{}{}", namespace, key)
            };
            let handler = def.handler.clone();
            let store = weak.clone();
            let local = local.clone();
            self.registry
                .actions
                .entry(kind)
                .or_default()
                .push(Arc::new(move |payload: Value| match store.upgrade() {
                    Some(inner) => {
                        handler(ActionContext::new(Store::from_inner(inner), local.clone()), payload)
                    }
                    None => Deferred::resolved(Value::Null),
                }));
        }

        for (key, handler) in module.getters() {
            let kind = format!("{}{}", namespace, key);
            if self.registry.getters.contains_key(&kind) {
                self.store.report(StoreError::DuplicateGetter(kind));
                continue;
            }
            let handler = handler.clone();
            let local = local.clone();
            self.registry.getters.insert(
                kind,
                Arc::new(move |store: &Store| {
                    let root_state = store.state();
                    let state = get_nested_state(&root_state, local.path().segments())
                        .cloned()
                        .unwrap_or(Value::Null);
                    let getters = local.getters();
                    let root_getters = store.getters();
                    handler(GetterContext {
                        state: &state,
                        getters: &getters,
                        root_state: &*root_state,
                        root_getters: &root_getters,
                    })
                }),
            );
        }

        debug!(
            path = %path,
            namespace = %namespace,
            mutations = module.mutations().len(),
            actions = module.actions().len(),
            getters = module.getters().len(),
            "Module installed"
        );

        for (key, child) in module.children_mut() {
            let child_namespace = if child.namespaced() {
                format!("{}{}/", namespace, key)
            } else {
                namespace.clone()
            };
            let child_path = path.child(key);
            self.install_module(child, child_path, child_namespace);
        }
    }
}

fn report(store: &Weak<StoreInner>, err: StoreError) {
    if let Some(inner) = store.upgrade() {
        inner.report(err);
    }
}

/// Pre-order `(path, state)` pairs of a subtree, as a fresh install would
/// graft them.
pub(crate) fn subtree_grafts(module: &Module, path: &ModulePath) -> Vec<Graft> {
    let mut grafts = vec![(path.clone(), module.state().clone())];
    for (key, child) in module.children() {
        grafts.extend(subtree_grafts(child, &path.child(key)));
    }
    grafts
}

/// Place each graft at its key in the parent's state.
pub(crate) fn apply_grafts(root: &mut Value, grafts: Vec<Graft>) -> Vec<StoreError> {
    let mut problems = Vec::new();
    for (path, state) in grafts {
        let Some((parent, key)) = path.split_last() else {
            continue;
        };
        match get_nested_state_mut(root, parent) {
            Some(Value::Object(map)) => {
                map.insert(key.to_string(), state);
            }
            _ => problems.push(StoreError::MissingModuleState(parent.join("/"))),
        }
    }
    problems
}
