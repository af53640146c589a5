//! # Flat Registries
//!
//! The output of one installation pass: every mutation, action and getter
//! of the tree keyed by its fully-qualified type, plus the namespace map.
//! A registry is immutable once published; rebuilds produce a new one.

use super::Store;
use crate::domain::{Deferred, ModulePath};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// `(root_state, payload)`; walks to the module's own state itself.
pub(crate) type WrappedMutation = Arc<dyn Fn(&mut Value, &Value) + Send + Sync>;

/// `payload -> Deferred`
pub(crate) type WrappedAction = Arc<dyn Fn(Value) -> Deferred + Send + Sync>;

/// Evaluated against the live store.
pub(crate) type WrappedGetter = Arc<dyn Fn(&Store) -> Value + Send + Sync>;

#[derive(Clone, Default)]
pub(crate) struct Registry {
    pub(crate) mutations: HashMap<String, Vec<WrappedMutation>>,
    pub(crate) actions: HashMap<String, Vec<WrappedAction>>,
    pub(crate) getters: BTreeMap<String, WrappedGetter>,
    pub(crate) namespaces: HashMap<String, ModulePath>,
}

impl Registry {
    pub(crate) fn has_mutation(&self, kind: &str) -> bool {
        self.mutations.get(kind).is_some_and(|h| !h.is_empty())
    }

    pub(crate) fn has_action(&self, kind: &str) -> bool {
        self.actions.get(kind).is_some_and(|h| !h.is_empty())
    }

    pub(crate) fn mutation_handlers(&self, kind: &str) -> Option<Vec<WrappedMutation>> {
        self.mutations.get(kind).filter(|h| !h.is_empty()).cloned()
    }

    pub(crate) fn action_handlers(&self, kind: &str) -> Option<Vec<WrappedAction>> {
        self.actions.get(kind).filter(|h| !h.is_empty()).cloned()
    }

    /// Sorted getter names.
    pub(crate) fn getter_names(&self) -> Vec<String> {
        self.getters.keys().cloned().collect()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("mutations", &self.mutations.len())
            .field("actions", &self.actions.len())
            .field("getters", &self.getters.len())
            .field("namespaces", &self.namespaces.len())
            .finish()
    }
}
