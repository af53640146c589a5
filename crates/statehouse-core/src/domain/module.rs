//! # Raw Module Definitions
//!
//! A `RawModule` is what module authors write: a state literal or factory,
//! mutations, actions, getters, child modules and a `namespaced` flag.
//! Definition lists keep insertion order; re-adding a key replaces the
//! earlier definition in place.

use super::deferred::{Deferred, IntoDeferred};
use crate::store::context::{ActionContext, GetterContext};
use serde_json::{Map, Value};
use std::future::Future;
use std::sync::Arc;

/// `(local_state, payload)`; the only sanctioned writer of state.
pub type MutationHandler = Arc<dyn Fn(&mut Value, &Value) + Send + Sync>;

/// `(context, payload) -> Deferred`.
pub type ActionHandler = Arc<dyn Fn(ActionContext, Value) -> Deferred + Send + Sync>;

/// Derived read over local and root state/getters.
pub type GetterHandler = Arc<dyn Fn(GetterContext<'_>) -> Value + Send + Sync>;

/// Produces a fresh state tree for each module instance.
pub type StateFactory = Arc<dyn Fn() -> Value + Send + Sync>;

/// How a module's initial state is obtained.
#[derive(Clone)]
pub enum StateInit {
    Literal(Value),
    Factory(StateFactory),
}

impl StateInit {
    /// Materialize the initial state.
    #[must_use]
    pub fn materialize(&self) -> Value {
        match self {
            StateInit::Literal(value) => value.clone(),
            StateInit::Factory(factory) => factory(),
        }
    }
}

/// An action handler plus its addressing flag.
#[derive(Clone)]
pub struct ActionDef {
    pub(crate) root: bool,
    pub(crate) handler: ActionHandler,
}

impl ActionDef {
    /// Handler returning a value, a `Result` or a `Deferred`.
    pub fn sync<F, R>(handler: F) -> Self
    where
        F: Fn(ActionContext, Value) -> R + Send + Sync + 'static,
        R: IntoDeferred,
    {
        Self {
            root: false,
            handler: Arc::new(move |ctx, payload| handler(ctx, payload).into_deferred()),
        }
    }

    /// Async handler.
    pub fn future<F, Fut>(handler: F) -> Self
    where
        F: Fn(ActionContext, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        Self {
            root: false,
            handler: Arc::new(move |ctx, payload| Deferred::from_future(handler(ctx, payload))),
        }
    }

    /// Register under the bare key even inside a namespaced module.
    #[must_use]
    pub fn root(mut self, root: bool) -> Self {
        self.root = root;
        self
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.root
    }
}

/// A module definition.
#[derive(Clone, Default)]
pub struct RawModule {
    pub(crate) state: Option<StateInit>,
    pub(crate) namespaced: bool,
    pub(crate) mutations: Vec<(String, MutationHandler)>,
    pub(crate) actions: Vec<(String, ActionDef)>,
    pub(crate) getters: Vec<(String, GetterHandler)>,
    pub(crate) modules: Vec<(String, RawModule)>,
}

fn upsert<T>(entries: &mut Vec<(String, T)>, key: String, value: T) {
    match entries.iter_mut().find(|(k, _)| *k == key) {
        Some(slot) => slot.1 = value,
        None => entries.push((key, value)),
    }
}

impl RawModule {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// State literal; cloned for every installation.
    #[must_use]
    pub fn state(mut self, state: Value) -> Self {
        self.state = Some(StateInit::Literal(state));
        self
    }

    /// State factory; invoked once per module instance.
    #[must_use]
    pub fn state_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.state = Some(StateInit::Factory(Arc::new(factory)));
        self
    }

    #[must_use]
    pub fn namespaced(mut self, namespaced: bool) -> Self {
        self.namespaced = namespaced;
        self
    }

    #[must_use]
    pub fn mutation<F>(mut self, key: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut Value, &Value) + Send + Sync + 'static,
    {
        upsert(&mut self.mutations, key.into(), Arc::new(handler));
        self
    }

    /// Action whose handler returns a value, a `Result` or a `Deferred`.
    #[must_use]
    pub fn action<F, R>(self, key: impl Into<String>, handler: F) -> Self
    where
        F: Fn(ActionContext, Value) -> R + Send + Sync + 'static,
        R: IntoDeferred,
    {
        self.action_with(key, ActionDef::sync(handler))
    }

    /// Action whose handler is async.
    #[must_use]
    pub fn async_action<F, Fut>(self, key: impl Into<String>, handler: F) -> Self
    where
        F: Fn(ActionContext, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        self.action_with(key, ActionDef::future(handler))
    }

    /// Action from a prepared definition (e.g. `root: true`).
    #[must_use]
    pub fn action_with(mut self, key: impl Into<String>, def: ActionDef) -> Self {
        upsert(&mut self.actions, key.into(), def);
        self
    }

    #[must_use]
    pub fn getter<F>(mut self, key: impl Into<String>, handler: F) -> Self
    where
        F: Fn(GetterContext<'_>) -> Value + Send + Sync + 'static,
    {
        upsert(&mut self.getters, key.into(), Arc::new(handler));
        self
    }

    #[must_use]
    pub fn module(mut self, key: impl Into<String>, module: RawModule) -> Self {
        upsert(&mut self.modules, key.into(), module);
        self
    }

    #[must_use]
    pub fn is_namespaced(&self) -> bool {
        self.namespaced
    }

    /// Materialize this module's own state (children excluded).
    #[must_use]
    pub fn initial_state(&self) -> Value {
        self.state
            .as_ref()
            .map_or_else(|| Value::Object(Map::new()), StateInit::materialize)
    }

    pub fn mutation_keys(&self) -> impl Iterator<Item = &str> {
        self.mutations.iter().map(|(k, _)| k.as_str())
    }

    pub fn action_keys(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().map(|(k, _)| k.as_str())
    }

    pub fn getter_keys(&self) -> impl Iterator<Item = &str> {
        self.getters.iter().map(|(k, _)| k.as_str())
    }

    pub fn module_keys(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(|(k, _)| k.as_str())
    }
}

impl std::fmt::Debug for RawModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawModule")
            .field("namespaced", &self.namespaced)
            .field("mutations", &self.mutation_keys().collect::<Vec<_>>())
            .field("actions", &self.action_keys().collect::<Vec<_>>())
            .field("getters", &self.getter_keys().collect::<Vec<_>>())
            .field("modules", &self.module_keys().collect::<Vec<_>>())
            .finish()
    }
}
