//! # Logger Plugin
//!
//! Logs every committed mutation (type, payload, state before and after)
//! and every dispatched action through a `LogSink`. The default sink emits
//! `tracing` events under the `statehouse::logger` target.

use crate::domain::{Action, Mutation};
use crate::store::subscription::{ActionSubscriber, MutationSubscriber};
use crate::store::{Plugin, Store};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// One logged event.
#[derive(Debug, Clone, PartialEq)]
pub enum LogEntry {
    Mutation {
        kind: String,
        payload: Value,
        prev_state: Value,
        next_state: Value,
    },
    Action {
        kind: String,
        payload: Value,
    },
}

/// Where log entries go.
pub trait LogSink: Send + Sync {
    fn record(&self, entry: LogEntry, collapsed: bool);
}

/// Emits entries as `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn record(&self, entry: LogEntry, collapsed: bool) {
        match entry {
            LogEntry::Mutation {
                kind,
                payload,
                prev_state,
                next_state,
            } => {
                if collapsed {
                    info!(target: "statehouse::logger", mutation = %kind, %payload, "mutation");
                } else {
                    info!(target: "statehouse::logger", mutation = %kind, "mutation");
                    debug!(target: "statehouse::logger", state = %prev_state, "prev state");
                    debug!(target: "statehouse::logger", %payload, "payload");
                    debug!(target: "statehouse::logger", state = %next_state, "next state");
                }
            }
            LogEntry::Action { kind, payload } => {
                info!(target: "statehouse::logger", action = %kind, %payload, "action");
            }
        }
    }
}

/// `(mutation, state_before, state_after) -> keep?`
pub type MutationFilter = Arc<dyn Fn(&Mutation, &Value, &Value) -> bool + Send + Sync>;
/// `(action, state) -> keep?`
pub type ActionFilter = Arc<dyn Fn(&Action, &Value) -> bool + Send + Sync>;
/// Maps a state tree to what gets logged.
pub type StateTransformer = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

#[derive(Clone)]
pub struct LoggerOptions {
    /// One event per entry instead of a before/payload/after group.
    pub collapsed: bool,
    pub filter: Option<MutationFilter>,
    pub action_filter: Option<ActionFilter>,
    pub transformer: Option<StateTransformer>,
    pub log_mutations: bool,
    pub log_actions: bool,
    pub sink: Arc<dyn LogSink>,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            collapsed: true,
            filter: None,
            action_filter: None,
            transformer: None,
            log_mutations: true,
            log_actions: true,
            sink: Arc::new(TracingSink),
        }
    }
}

impl std::fmt::Debug for LoggerOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggerOptions")
            .field("collapsed", &self.collapsed)
            .field("filter", &self.filter.is_some())
            .field("action_filter", &self.action_filter.is_some())
            .field("transformer", &self.transformer.is_some())
            .field("log_mutations", &self.log_mutations)
            .field("log_actions", &self.log_actions)
            .finish()
    }
}

fn transform(transformer: &Option<StateTransformer>, state: &Value) -> Value {
    match transformer {
        Some(transform) => transform(state),
        None => state.clone(),
    }
}

/// Build the logger plugin.
#[must_use]
pub fn create_logger(options: LoggerOptions) -> Plugin {
    Arc::new(move |store: &Store| {
        let options = options.clone();
        let prev_state = Arc::new(Mutex::new(transform(&options.transformer, &store.state())));

        if options.log_mutations {
            let options = options.clone();
            let prev_state = prev_state.clone();
            let subscriber: Arc<MutationSubscriber> =
                Arc::new(move |mutation: &Mutation, state: &Value| {
                    let next_state = transform(&options.transformer, state);
                    let prev = std::mem::replace(&mut *prev_state.lock(), next_state.clone());
                    let keep = options
                        .filter
                        .as_ref()
                        .map_or(true, |filter| filter(mutation, &prev, &next_state));
                    if keep {
                        options.sink.record(
                            LogEntry::Mutation {
                                kind: mutation.kind.clone(),
                                payload: mutation.payload.clone(),
                                prev_state: prev,
                                next_state,
                            },
                            options.collapsed,
                        );
                    }
                });
            // The logger lives as long as the store.
            let _ = store.subscribe(subscriber);
        }

        if options.log_actions {
            let options = options.clone();
            let subscriber = ActionSubscriber::new().before(move |action: &Action, state: &Value| {
                let keep = options
                    .action_filter
                    .as_ref()
                    .map_or(true, |filter| filter(action, state));
                if keep {
                    options.sink.record(
                        LogEntry::Action {
                            kind: action.kind.clone(),
                            payload: action.payload.clone(),
                        },
                        options.collapsed,
                    );
                }
            });
            let _ = store.subscribe_action(Arc::new(subscriber));
        }
    })
}
