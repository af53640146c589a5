use thiserror::Error;

/// Configuration, lookup and isolation problems.
///
/// None of these cross the public API as `Err`: they are reported through
/// the store's diagnostic channel and the operation degrades gracefully.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("cannot register the root module by using register_module")]
    EmptyPath,

    #[error("invalid module path {path:?}: segments must be non-empty")]
    InvalidPath { path: Vec<String> },

    #[error("duplicate namespace {namespace} for the namespaced module {path}")]
    DuplicateNamespace { namespace: String, path: String },

    #[error("duplicate getter key: {0}")]
    DuplicateGetter(String),

    #[error("unknown mutation type: {0}")]
    UnknownMutation(String),

    #[error("unknown action type: {0}")]
    UnknownAction(String),

    #[error("unknown local mutation type: {local}, global type: {global}")]
    UnknownLocalMutation { local: String, global: String },

    #[error("unknown local action type: {local}, global type: {global}")]
    UnknownLocalAction { local: String, global: String },

    #[error("no module registered at path '{0}'")]
    ModuleNotFound(String),

    #[error("cannot unregister module '{0}', which was not registered at runtime")]
    StaticModule(String),

    #[error("request object has no string `type` field")]
    MissingType,

    #[error("no state object found at module path '{0}'")]
    MissingModuleState(String),

    #[error("do not mutate store state outside mutation handlers")]
    StrictModeViolation,

    #[error("error in {phase} subscriber: {message}")]
    SubscriberPanicked { phase: String, message: String },

    #[error("trying to add a new module '{0}' on hot reloading, manual reload is needed")]
    HotUpdateAddedModule(String),

    #[error("trying to remove module '{0}' on hot reloading, use unregister_module instead")]
    HotUpdateRemovedModule(String),
}

/// How loudly a diagnostic is logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl StoreError {
    /// Configuration errors and invariant violations are errors; lookup
    /// misses and hot-update skips are warnings.
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            StoreError::EmptyPath
            | StoreError::InvalidPath { .. }
            | StoreError::DuplicateNamespace { .. }
            | StoreError::DuplicateGetter(_)
            | StoreError::StaticModule(_)
            | StoreError::MissingType
            | StoreError::StrictModeViolation
            | StoreError::SubscriberPanicked { .. }
            | StoreError::UnknownLocalMutation { .. }
            | StoreError::UnknownLocalAction { .. } => Severity::Error,
            StoreError::UnknownMutation(_)
            | StoreError::UnknownAction(_)
            | StoreError::ModuleNotFound(_)
            | StoreError::MissingModuleState(_)
            | StoreError::HotUpdateAddedModule(_)
            | StoreError::HotUpdateRemovedModule(_) => Severity::Warning,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offending_type() {
        let err = StoreError::UnknownLocalMutation {
            local: "add".into(),
            global: "cart/add".into(),
        };
        assert_eq!(
            err.to_string(),
            "unknown local mutation type: add, global type: cart/add"
        );
        assert_eq!(err.severity(), Severity::Error);
        assert_eq!(
            StoreError::UnknownMutation("x".into()).severity(),
            Severity::Warning
        );
    }
}
