//! # Store
//!
//! The public read/write surface: `state`, `getters`, `commit`, `dispatch`,
//! subscriptions, watches and dynamic module management.
//!
//! ## Commit window
//!
//! ```text
//! commit(type, payload)
//!   └─ with_commit ── window lock, committing = true ──┐
//!        view.mutate(handlers...)                      │ strict checker sees `true`
//!      committing restored, window released ───────────┘
//!   └─ mutation subscribers (snapshot, isolated)
//! ```
//!
//! The window is a reentrant lock: commits from different threads are
//! serialized, nested commits on one thread are not blocked.
//!
//! ## Rebuilds
//!
//! | Trigger | Registry | Grafts | View |
//! |---------|----------|--------|------|
//! | construction | full install | every module | fresh |
//! | `register_module` (new path) | extended | new subtree unless `preserve_state` | fresh |
//! | `register_module` (existing path) | full rebuild | new subtree unless `preserve_state` | fresh |
//! | `unregister_module` | full rebuild | key removed from parent | fresh |
//! | `hot_update` | full rebuild | none | fresh, old state cleared |

pub mod context;
pub mod diagnostics;
pub mod getters;
pub(crate) mod install;
pub(crate) mod registry;
pub(crate) mod strict;
pub mod subscription;

use crate::config::StoreConfig;
use crate::domain::{
    get_nested_state_mut, Action, Deferred, ModuleCollection, ModulePath, Mutation, RawModule,
    RegisterOptions, Request, StoreError, SubscribeOptions,
};
use context::LocalContext;
use diagnostics::{Diagnostic, DiagnosticLog};
use getters::Getters;
use install::{apply_grafts, subtree_grafts, Graft, Installer};
use parking_lot::{Mutex, ReentrantMutex, RwLock};
use registry::Registry;
use serde_json::Value;
use statehouse_reactive::{ReactiveEngine, ReactiveRoot, Runtime, WatchHandle, WatchOptions};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use subscription::{isolate, ActionSubscriber, MutationSubscriber, SubscriberList, Unsubscribe};
use tracing::{debug, trace};

/// Called once with the finished store, in registration order.
pub type Plugin = Arc<dyn Fn(&Store) + Send + Sync>;

/// Everything needed to build a store.
pub struct StoreOptions {
    pub root: RawModule,
    pub config: StoreConfig,
    pub plugins: Vec<Plugin>,
    pub engine: Option<Arc<dyn ReactiveEngine>>,
}

impl StoreOptions {
    #[must_use]
    pub fn new(root: RawModule) -> Self {
        Self {
            root,
            config: StoreConfig::default(),
            plugins: Vec::new(),
            engine: None,
        }
    }

    #[must_use]
    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.config.strict = strict;
        self
    }

    #[must_use]
    pub fn plugin(mut self, plugin: Plugin) -> Self {
        self.plugins.push(plugin);
        self
    }

    /// Use `engine` instead of a fresh tokio-backed `Runtime`.
    ///
    /// Give each store its own engine: `Store::watch` registers
    /// engine-wide, so a shared engine leaks deep watches across stores.
    #[must_use]
    pub fn engine(mut self, engine: Arc<dyn ReactiveEngine>) -> Self {
        self.engine = Some(engine);
        self
    }
}

impl std::fmt::Debug for StoreOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreOptions")
            .field("root", &self.root)
            .field("config", &self.config)
            .field("plugins", &self.plugins.len())
            .field("engine", &self.engine.is_some())
            .finish()
    }
}

/// Restores the previous `committing` value, also on unwind.
struct CommitGuard<'a> {
    flag: &'a AtomicBool,
    previous: bool,
}

impl Drop for CommitGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(self.previous, Ordering::SeqCst);
    }
}

pub(crate) struct StoreInner {
    config: StoreConfig,
    engine: Arc<dyn ReactiveEngine>,
    committing: AtomicBool,
    commit_window: ReentrantMutex<()>,
    modules: Mutex<ModuleCollection>,
    registry: RwLock<Arc<Registry>>,
    view: RwLock<Arc<ReactiveRoot>>,
    getter_names: RwLock<Arc<Vec<String>>>,
    local_getters: Mutex<HashMap<String, Getters>>,
    subscribers: SubscriberList<MutationSubscriber>,
    action_subscribers: SubscriberList<ActionSubscriber>,
    diagnostics: DiagnosticLog,
}

impl StoreInner {
    pub(crate) fn report(&self, err: StoreError) {
        self.diagnostics.report(err);
    }

    pub(crate) fn is_committing(&self) -> bool {
        self.committing.load(Ordering::SeqCst)
    }

    /// Run `f` with `committing` set; nesting restores the outer value.
    pub(crate) fn with_commit<R>(&self, f: impl FnOnce() -> R) -> R {
        let _window = self.commit_window.lock();
        let previous = self.committing.swap(true, Ordering::SeqCst);
        let _guard = CommitGuard {
            flag: &self.committing,
            previous,
        };
        f()
    }

    pub(crate) fn view(&self) -> Arc<ReactiveRoot> {
        self.view.read().clone()
    }

    pub(crate) fn registry(&self) -> Arc<Registry> {
        self.registry.read().clone()
    }

    pub(crate) fn root_getters(self: &Arc<Self>) -> Getters {
        Getters::root(Arc::downgrade(self), self.getter_names.read().clone())
    }

    /// Root getters for the empty namespace, else the cached scoped view.
    pub(crate) fn local_getters(self: &Arc<Self>, namespace: &str) -> Getters {
        if namespace.is_empty() {
            return self.root_getters();
        }
        if let Some(cached) = self.local_getters.lock().get(namespace) {
            return cached.clone();
        }
        let names = self.getter_names.read().clone();
        let view = Getters::scoped(Arc::downgrade(self), &names, namespace);
        self.local_getters
            .lock()
            .entry(namespace.to_string())
            .or_insert(view)
            .clone()
    }

    fn graft(&self, grafts: Vec<Graft>) {
        if grafts.is_empty() {
            return;
        }
        let problems = self.with_commit(|| self.view().mutate(|state| apply_grafts(state, grafts)));
        for problem in problems {
            self.report(problem);
        }
    }
}

/// A hierarchical, mutation-gated state container.
///
/// Cloning is cheap; clones share the same store.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

impl Store {
    /// Build a store around `root` with default options.
    pub fn new(root: RawModule) -> Self {
        Self::with_options(StoreOptions::new(root))
    }

    pub fn with_options(options: StoreOptions) -> Self {
        let StoreOptions {
            root,
            config,
            plugins,
            engine,
        } = options;
        let engine: Arc<dyn ReactiveEngine> = match engine {
            Some(engine) => engine,
            None => Arc::new(Runtime::default()),
        };
        let modules = ModuleCollection::new(root);
        let bootstrap = engine.wrap(Arc::new(modules.root().state().clone()));

        let inner = Arc::new(StoreInner {
            diagnostics: DiagnosticLog::new(config.mode, config.diagnostic_capacity),
            config,
            engine,
            committing: AtomicBool::new(false),
            commit_window: ReentrantMutex::new(()),
            modules: Mutex::new(modules),
            registry: RwLock::new(Arc::default()),
            view: RwLock::new(bootstrap),
            getter_names: RwLock::new(Arc::default()),
            local_getters: Mutex::new(HashMap::new()),
            subscribers: SubscriberList::new(),
            action_subscribers: SubscriberList::new(),
        });
        let store = Store { inner };

        let mut registry = Registry::default();
        let grafts = {
            let mut modules = store.inner.modules.lock();
            Installer::new(&store.inner, &mut registry, false).install(&mut modules, &ModulePath::root())
        };
        store.inner.graft(grafts);
        *store.inner.registry.write() = Arc::new(registry);
        store.reset_view(false);

        debug!(
            strict = store.inner.config.strict,
            mode = ?store.inner.config.mode,
            plugins = plugins.len(),
            "Store created"
        );
        for plugin in &plugins {
            plugin(&store);
        }
        store
    }

    pub(crate) fn from_inner(inner: Arc<StoreInner>) -> Self {
        Self { inner }
    }

    /// Immutable snapshot of the composite state tree.
    #[must_use]
    pub fn state(&self) -> Arc<Value> {
        self.inner.view().state()
    }

    /// Memoized getters by fully-qualified name.
    #[must_use]
    pub fn getters(&self) -> Getters {
        self.inner.root_getters()
    }

    /// Shorthand for `getters().get(name)`.
    #[must_use]
    pub fn getter(&self, name: &str) -> Option<Value> {
        self.getters().get(name)
    }

    /// Run every handler registered for the mutation type, then notify
    /// mutation subscribers.
    ///
    /// A panicking handler propagates to the caller.
    pub fn commit(&self, request: impl Into<Request>) {
        let (kind, payload) = match request.into().resolve() {
            Ok(resolved) => resolved,
            Err(err) => return self.report(err),
        };
        let Some(handlers) = self.inner.registry().mutation_handlers(&kind) else {
            return self.report(StoreError::UnknownMutation(kind));
        };
        trace!(mutation = %kind, handlers = handlers.len(), "Committing");

        let state = self.inner.with_commit(|| {
            let view = self.inner.view();
            view.mutate(|state| {
                for handler in &handlers {
                    handler(state, &payload);
                }
            });
            view.state()
        });

        let mutation = Mutation { kind, payload };
        for subscriber in self.inner.subscribers.snapshot() {
            if let Err(err) = isolate("mutation", || subscriber(&mutation, &*state)) {
                self.report(err);
            }
        }
    }

    /// Run every handler registered for the action type.
    ///
    /// `before` subscribers run before any handler starts; `after` or
    /// `error` subscribers run once the handlers settle. With several
    /// handlers the result is an array of their results.
    ///
    /// The handlers start right away; the returned `Deferred` only reports
    /// the outcome, so dropping it cancels nothing.
    pub fn dispatch(&self, request: impl Into<Request>) -> Deferred {
        let (kind, payload) = match request.into().resolve() {
            Ok(resolved) => resolved,
            Err(err) => {
                self.report(err);
                return Deferred::resolved(Value::Null);
            }
        };
        let Some(handlers) = self.inner.registry().action_handlers(&kind) else {
            self.report(StoreError::UnknownAction(kind));
            return Deferred::resolved(Value::Null);
        };
        trace!(action = %kind, handlers = handlers.len(), "Dispatching");

        let action = Action { kind, payload };
        let state = self.state();
        for subscriber in self.inner.action_subscribers.snapshot() {
            if let Some(before) = &subscriber.before {
                if let Err(err) = isolate("before", || before(&action, &*state)) {
                    self.report(err);
                }
            }
        }

        let result = match handlers.as_slice() {
            [single] => single(action.payload.clone()),
            many => Deferred::all(
                many.iter()
                    .map(|handler| handler(action.payload.clone()))
                    .collect(),
            ),
        };

        let store = self.clone();
        Deferred::spawn(async move {
            let outcome = result.await;
            let state = store.state();
            let subscribers = store.inner.action_subscribers.snapshot();
            match &outcome {
                Ok(_) => {
                    for subscriber in &subscribers {
                        if let Some(after) = &subscriber.after {
                            if let Err(err) = isolate("after", || after(&action, &*state)) {
                                store.report(err);
                            }
                        }
                    }
                }
                Err(error) => {
                    for subscriber in &subscribers {
                        if let Some(on_error) = &subscriber.error {
                            if let Err(err) = isolate("error", || on_error(&action, &*state, error))
                            {
                                store.report(err);
                            }
                        }
                    }
                }
            }
            outcome
        })
    }

    pub fn subscribe(&self, subscriber: Arc<MutationSubscriber>) -> Unsubscribe {
        self.subscribe_with(subscriber, SubscribeOptions::default())
    }

    /// Add a mutation subscriber unless this exact `Arc` is already
    /// subscribed.
    pub fn subscribe_with(
        &self,
        subscriber: Arc<MutationSubscriber>,
        options: SubscribeOptions,
    ) -> Unsubscribe {
        self.inner.subscribers.add(subscriber, options.prepend)
    }

    pub fn subscribe_action(&self, subscriber: Arc<ActionSubscriber>) -> Unsubscribe {
        self.subscribe_action_with(subscriber, SubscribeOptions::default())
    }

    /// Add an action subscriber unless this exact `Arc` is already
    /// subscribed.
    pub fn subscribe_action_with(
        &self,
        subscriber: Arc<ActionSubscriber>,
        options: SubscribeOptions,
    ) -> Unsubscribe {
        self.inner.action_subscribers.add(subscriber, options.prepend)
    }

    /// Re-evaluate `getter` after every state change and call `callback`
    /// with `(new, old)` when the result differs.
    ///
    /// The watch survives resets and hot updates.
    pub fn watch<G, C>(&self, getter: G, callback: C, options: WatchOptions) -> WatchHandle
    where
        G: Fn(&Value, &Getters) -> Value + Send + Sync + 'static,
        C: Fn(&Value, &Value) + Send + Sync + 'static,
    {
        let store = Arc::downgrade(&self.inner);
        self.inner.engine.watch(
            Arc::new(move || match store.upgrade() {
                Some(inner) => getter(&*inner.view().state(), &inner.root_getters()),
                None => Value::Null,
            }),
            Arc::new(callback),
            options,
        )
    }

    /// Swap the whole state tree, inside a commit window.
    pub fn replace_state(&self, state: Value) {
        self.inner.with_commit(|| self.inner.view().replace(state));
        debug!("State replaced");
    }

    pub fn register_module(&self, path: impl Into<ModulePath>, raw: RawModule) {
        self.register_module_with(path, raw, RegisterOptions::default());
    }

    /// Add a module at runtime.
    ///
    /// With `preserve_state` the state already present at the path is
    /// adopted instead of grafting the module's initial state.
    pub fn register_module_with(
        &self,
        path: impl Into<ModulePath>,
        raw: RawModule,
        options: RegisterOptions,
    ) {
        let path = path.into();
        if let Err(err) = path.validate_for_registration() {
            return self.report(err);
        }

        let replaced = match self.inner.modules.lock().register(&path, raw, true) {
            Ok(replaced) => replaced,
            Err(err) => return self.report(err),
        };

        if replaced {
            // Stale registrations of the old module only go away with a
            // full rebuild.
            if !options.preserve_state {
                let grafts = self
                    .inner
                    .modules
                    .lock()
                    .get(path.segments())
                    .map(|module| subtree_grafts(module, &path))
                    .unwrap_or_default();
                self.inner.graft(grafts);
            }
            self.reset_store(false);
        } else {
            let mut registry = (*self.inner.registry()).clone();
            let grafts = {
                let mut modules = self.inner.modules.lock();
                Installer::new(&self.inner, &mut registry, options.preserve_state)
                    .install(&mut modules, &path)
            };
            self.inner.graft(grafts);
            *self.inner.registry.write() = Arc::new(registry);
            self.reset_view(false);
        }
        debug!(path = %path, replaced, preserve_state = options.preserve_state, "Module registered at runtime");
    }

    /// Remove a runtime-registered module and its state.
    pub fn unregister_module(&self, path: impl Into<ModulePath>) {
        let path = path.into();
        if let Err(err) = self.inner.modules.lock().unregister(&path) {
            return self.report(err);
        }
        if let Some((parent, key)) = path.split_last() {
            self.inner.with_commit(|| {
                self.inner.view().mutate(|state| {
                    if let Some(Value::Object(map)) = get_nested_state_mut(state, parent) {
                        map.remove(key);
                    }
                })
            });
        }
        self.reset_store(false);
        debug!(path = %path, "Module unregistered");
    }

    #[must_use]
    pub fn has_module(&self, path: impl Into<ModulePath>) -> bool {
        self.inner.modules.lock().is_registered(&path.into())
    }

    /// Swap in new mutation, action and getter definitions, keeping state.
    pub fn hot_update(&self, raw: RawModule) {
        let warnings = self.inner.modules.lock().update(&raw);
        for warning in warnings {
            self.report(warning);
        }
        self.reset_store(true);
        debug!("Hot update applied");
    }

    /// Local context of the namespaced module registered under `namespace`.
    #[must_use]
    pub fn module_context(&self, namespace: &str) -> Option<LocalContext> {
        let path = self.inner.registry().namespaces.get(namespace)?.clone();
        self.inner
            .modules
            .lock()
            .get(path.segments())?
            .context()
            .cloned()
    }

    #[must_use]
    pub fn is_committing(&self) -> bool {
        self.inner.is_committing()
    }

    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// The live reactive root.
    ///
    /// Writing through it bypasses the commit window; strict mode reports
    /// every such write.
    #[must_use]
    pub fn view(&self) -> Arc<ReactiveRoot> {
        self.inner.view()
    }

    #[must_use]
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.inner.diagnostics.snapshot()
    }

    pub fn take_diagnostics(&self) -> Vec<Diagnostic> {
        self.inner.diagnostics.take()
    }

    pub(crate) fn report(&self, err: StoreError) {
        self.inner.report(err);
    }

    pub(crate) fn registry(&self) -> Arc<Registry> {
        self.inner.registry()
    }

    /// Rebuild every registry from the module tree without touching state.
    fn reset_store(&self, hot: bool) {
        let mut registry = Registry::default();
        {
            let mut modules = self.inner.modules.lock();
            Installer::new(&self.inner, &mut registry, true).install(&mut modules, &ModulePath::root());
        }
        *self.inner.registry.write() = Arc::new(registry);
        self.reset_view(hot);
        debug!(hot, "Store reset");
    }

    /// Wrap the current state in a fresh reactive root carrying one
    /// computed slot per registered getter, and retire the old root.
    fn reset_view(&self, hot: bool) {
        let inner = &self.inner;
        // No commit may land on the old root between the copy and the swap.
        let _window = inner.commit_window.lock();
        let old = inner.view();
        let registry = inner.registry();

        *inner.getter_names.write() = Arc::new(registry.getter_names());
        inner.local_getters.lock().clear();

        let view = inner.engine.wrap(old.state());
        for (name, getter) in &registry.getters {
            let store = Arc::downgrade(inner);
            let getter = getter.clone();
            view.define_computed(
                name.clone(),
                Arc::new(move || match store.upgrade() {
                    Some(inner) => getter(&Store::from_inner(inner)),
                    None => Value::Null,
                }),
            );
        }
        *inner.view.write() = view.clone();

        if inner.config.strict_checks() {
            let _ = strict::enable(inner, &view);
        }

        // Engine-wide watchers already follow the new root.
        old.detach();
        if hot {
            // Watchers still attached to the old root see it emptied.
            inner.with_commit(|| old.replace(Value::Null));
        }
        inner.engine.next_tick(Box::new(move || old.teardown()));
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("config", &self.inner.config)
            .field("registry", &*self.inner.registry())
            .field("subscribers", &self.inner.subscribers.len())
            .field("action_subscribers", &self.inner.action_subscribers.len())
            .finish()
    }
}
