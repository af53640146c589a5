//! # Getter Views
//!
//! `Getters` is a read-only, lazily evaluated view over the computed slots
//! of the live reactive root. The root view exposes fully-qualified names;
//! a namespaced view exposes only the names under its prefix, stripped, and
//! delegates every read back to the root slot so memoization is shared.

use super::StoreInner;
use serde_json::{Map, Value};
use std::sync::{Arc, Weak};

#[derive(Clone)]
pub struct Getters {
    store: Weak<StoreInner>,
    /// Sorted, prefix already stripped.
    names: Arc<Vec<String>>,
    prefix: String,
}

impl Getters {
    pub(crate) fn root(store: Weak<StoreInner>, names: Arc<Vec<String>>) -> Self {
        Self {
            store,
            names,
            prefix: String::new(),
        }
    }

    /// View of the getters under `namespace`, built from the root names.
    pub(crate) fn scoped(store: Weak<StoreInner>, all: &[String], namespace: &str) -> Self {
        let names = all
            .iter()
            .filter_map(|name| name.strip_prefix(namespace))
            .map(str::to_string)
            .collect();
        Self {
            store,
            names: Arc::new(names),
            prefix: namespace.to_string(),
        }
    }

    /// Current value of getter `name`; `None` if no such getter is visible
    /// through this view.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        if !self.contains(name) {
            return None;
        }
        let store = self.store.upgrade()?;
        store.view().computed(&format!("{}{}", self.prefix, name))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names
            .binary_search_by(|probe| probe.as_str().cmp(name))
            .is_ok()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// The namespace this view strips; empty for the root view.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Evaluate every visible getter.
    #[must_use]
    pub fn to_map(&self) -> Map<String, Value> {
        self.keys()
            .filter_map(|name| self.get(name).map(|value| (name.to_string(), value)))
            .collect()
    }
}

impl std::fmt::Debug for Getters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Getters")
            .field("prefix", &self.prefix)
            .field("names", &self.names)
            .finish()
    }
}
