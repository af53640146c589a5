//! # Module Tree
//!
//! The ownership tree of installed modules. Pure data plus tree operations;
//! it knows nothing about registries or reactive views.
//!
//! ## Namespaces
//!
//! A module's namespace is the concatenation of `key + "/"` for every
//! namespaced module on the way from the root (root itself excluded).
//! Non-namespaced modules contribute nothing, so their types merge into the
//! nearest namespaced ancestor's namespace.

use super::errors::StoreError;
use super::module::{ActionDef, GetterHandler, MutationHandler, RawModule};
use super::path::ModulePath;
use crate::store::context::LocalContext;
use serde_json::Value;
use tracing::debug;

/// One installed module.
pub struct Module {
    raw: RawModule,
    state: Value,
    children: Vec<(String, Module)>,
    runtime: bool,
    context: Option<LocalContext>,
}

impl Module {
    fn new(raw: RawModule, runtime: bool) -> Self {
        let state = raw.initial_state();
        Self {
            raw,
            state,
            children: Vec::new(),
            runtime,
            context: None,
        }
    }

    /// Build this module and all descendants declared in `raw`.
    fn build(raw: RawModule, runtime: bool) -> Self {
        let declared = raw.modules.clone();
        let mut module = Self::new(raw, runtime);
        for (key, child) in declared {
            module.add_child(key, Module::build(child, runtime));
        }
        module
    }

    #[must_use]
    pub fn namespaced(&self) -> bool {
        self.raw.namespaced
    }

    /// The state materialized for this module at creation.
    #[must_use]
    pub fn state(&self) -> &Value {
        &self.state
    }

    /// Whether the module was added through `register_module`.
    #[must_use]
    pub fn runtime(&self) -> bool {
        self.runtime
    }

    #[must_use]
    pub fn context(&self) -> Option<&LocalContext> {
        self.context.as_ref()
    }

    pub(crate) fn set_context(&mut self, context: LocalContext) {
        self.context = Some(context);
    }

    #[must_use]
    pub fn child(&self, key: &str) -> Option<&Module> {
        self.children.iter().find(|(k, _)| k == key).map(|(_, m)| m)
    }

    fn child_mut(&mut self, key: &str) -> Option<&mut Module> {
        self.children
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, m)| m)
    }

    #[must_use]
    pub fn has_child(&self, key: &str) -> bool {
        self.child(key).is_some()
    }

    /// Link a child; replaces an existing child with the same key.
    fn add_child(&mut self, key: String, module: Module) {
        match self.children.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = module,
            None => self.children.push((key, module)),
        }
    }

    fn remove_child(&mut self, key: &str) -> Option<Module> {
        let pos = self.children.iter().position(|(k, _)| k == key)?;
        Some(self.children.remove(pos).1)
    }

    pub fn child_keys(&self) -> impl Iterator<Item = &str> {
        self.children.iter().map(|(k, _)| k.as_str())
    }

    pub fn children(&self) -> impl Iterator<Item = (&str, &Module)> {
        self.children.iter().map(|(k, m)| (k.as_str(), m))
    }

    pub(crate) fn children_mut(&mut self) -> impl Iterator<Item = (&str, &mut Module)> {
        self.children.iter_mut().map(|(k, m)| (k.as_str(), m))
    }

    pub(crate) fn mutations(&self) -> &[(String, MutationHandler)] {
        &self.raw.mutations
    }

    pub(crate) fn actions(&self) -> &[(String, ActionDef)] {
        &self.raw.actions
    }

    pub(crate) fn getters(&self) -> &[(String, GetterHandler)] {
        &self.raw.getters
    }

    /// Take over new definitions; state and children are untouched.
    ///
    /// Empty definition lists mean "not provided" and keep the old ones.
    fn update(&mut self, raw: &RawModule) {
        self.raw.namespaced = raw.namespaced;
        if !raw.actions.is_empty() {
            self.raw.actions = raw.actions.clone();
        }
        if !raw.mutations.is_empty() {
            self.raw.mutations = raw.mutations.clone();
        }
        if !raw.getters.is_empty() {
            self.raw.getters = raw.getters.clone();
        }
    }
}

impl std::fmt::Debug for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Module")
            .field("namespaced", &self.namespaced())
            .field("runtime", &self.runtime)
            .field("children", &self.child_keys().collect::<Vec<_>>())
            .finish()
    }
}

/// The whole tree, rooted at the store's root module.
#[derive(Debug)]
pub struct ModuleCollection {
    root: Module,
}

impl ModuleCollection {
    /// Build the static tree declared by `raw_root`.
    #[must_use]
    pub fn new(raw_root: RawModule) -> Self {
        Self {
            root: Module::build(raw_root, false),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Module {
        &self.root
    }

    /// Walk `path` from the root.
    #[must_use]
    pub fn get(&self, path: &[String]) -> Option<&Module> {
        path.iter()
            .try_fold(&self.root, |module, key| module.child(key))
    }

    pub(crate) fn get_mut(&mut self, path: &[String]) -> Option<&mut Module> {
        path.iter()
            .try_fold(&mut self.root, |module, key| module.child_mut(key))
    }

    /// Namespace prefix for the module at `path`; `None` if the path does
    /// not resolve.
    #[must_use]
    pub fn get_namespace(&self, path: &[String]) -> Option<String> {
        let mut module = &self.root;
        let mut namespace = String::new();
        for key in path {
            module = module.child(key)?;
            if module.namespaced() {
                namespace.push_str(key);
                namespace.push('/');
            }
        }
        Some(namespace)
    }

    /// Insert `raw` (and its declared descendants) at `path`.
    ///
    /// Returns `true` when an existing module was replaced.
    pub fn register(
        &mut self,
        path: &ModulePath,
        raw: RawModule,
        runtime: bool,
    ) -> Result<bool, StoreError> {
        path.validate_for_registration()?;
        let (parent_path, key) = path.split_last().ok_or(StoreError::EmptyPath)?;
        let parent = self
            .get_mut(parent_path)
            .ok_or_else(|| StoreError::ModuleNotFound(parent_path.join("/")))?;
        let replaced = parent.has_child(key);
        parent.add_child(key.to_string(), Module::build(raw, runtime));
        debug!(path = %path, runtime, replaced, "Module registered");
        Ok(replaced)
    }

    /// Remove the runtime-registered module at `path`.
    pub fn unregister(&mut self, path: &ModulePath) -> Result<Module, StoreError> {
        path.validate_for_registration()?;
        let (parent_path, key) = path.split_last().ok_or(StoreError::EmptyPath)?;
        let parent = self
            .get_mut(parent_path)
            .ok_or_else(|| StoreError::ModuleNotFound(path.to_string()))?;
        match parent.child(key) {
            None => return Err(StoreError::ModuleNotFound(path.to_string())),
            Some(child) if !child.runtime() => {
                return Err(StoreError::StaticModule(path.to_string()))
            }
            Some(_) => {}
        }
        let removed = parent
            .remove_child(key)
            .ok_or_else(|| StoreError::ModuleNotFound(path.to_string()))?;
        debug!(path = %path, "Module unregistered");
        Ok(removed)
    }

    /// Whether a module lives at `path`.
    #[must_use]
    pub fn is_registered(&self, path: &ModulePath) -> bool {
        match path.split_last() {
            Some((parent_path, key)) => self
                .get(parent_path)
                .is_some_and(|parent| parent.has_child(key)),
            None => false,
        }
    }

    /// Merge new definitions onto the existing tree in place.
    ///
    /// Returns the non-fatal problems found: children that exist only in
    /// the new tree cannot be added this way, children that exist only in
    /// the old tree cannot be removed this way.
    pub fn update(&mut self, raw_root: &RawModule) -> Vec<StoreError> {
        let mut warnings = Vec::new();
        update_module(&ModulePath::root(), &mut self.root, raw_root, &mut warnings);
        warnings
    }
}

fn update_module(
    path: &ModulePath,
    target: &mut Module,
    raw: &RawModule,
    warnings: &mut Vec<StoreError>,
) {
    target.update(raw);

    for (key, child_raw) in &raw.modules {
        let child_path = path.child(key);
        match target.child_mut(key) {
            Some(child) => update_module(&child_path, child, child_raw, warnings),
            None => warnings.push(StoreError::HotUpdateAddedModule(child_path.to_string())),
        }
    }

    // Only a definition that lists children speaks about which ones exist.
    if !raw.modules.is_empty() {
        for key in target.child_keys() {
            if !raw.modules.iter().any(|(k, _)| k == key) {
                warnings.push(StoreError::HotUpdateRemovedModule(
                    path.child(key).to_string(),
                ));
            }
        }
    }
}
