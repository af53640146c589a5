//! # Requests and Records
//!
//! `commit` and `dispatch` accept a `Request`: either an explicit
//! type-and-payload pair or a single structured object carrying its own
//! `type` field. The two shapes are resolved explicitly, never sniffed.

use super::errors::StoreError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Input to `commit` / `dispatch`.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// `("type", payload)`
    Typed { kind: String, payload: Value },
    /// `{ "type": "...", ...rest }`; the whole object is the payload.
    Object(Map<String, Value>),
}

impl Request {
    /// A type-and-payload request.
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        Request::Typed {
            kind: kind.into(),
            payload,
        }
    }

    /// A structured request. Non-object values resolve to `MissingType`.
    #[must_use]
    pub fn object(value: Value) -> Self {
        match value {
            Value::Object(map) => Request::Object(map),
            _ => Request::Object(Map::new()),
        }
    }

    /// Split into `(kind, payload)`.
    pub fn resolve(self) -> Result<(String, Value), StoreError> {
        match self {
            Request::Typed { kind, payload } => Ok((kind, payload)),
            Request::Object(map) => {
                let kind = map
                    .get("type")
                    .and_then(Value::as_str)
                    .filter(|kind| !kind.is_empty())
                    .map(str::to_string)
                    .ok_or(StoreError::MissingType)?;
                Ok((kind, Value::Object(map)))
            }
        }
    }
}

impl From<&str> for Request {
    fn from(kind: &str) -> Self {
        Request::new(kind, Value::Null)
    }
}

impl From<String> for Request {
    fn from(kind: String) -> Self {
        Request::new(kind, Value::Null)
    }
}

impl From<(&str, Value)> for Request {
    fn from((kind, payload): (&str, Value)) -> Self {
        Request::new(kind, payload)
    }
}

impl From<(String, Value)> for Request {
    fn from((kind, payload): (String, Value)) -> Self {
        Request::new(kind, payload)
    }
}

/// A committed mutation, as seen by mutation subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mutation {
    #[serde(rename = "type")]
    pub kind: String,
    pub payload: Value,
}

/// A dispatched action, as seen by action subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: String,
    pub payload: Value,
}

/// Options for a local `commit`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitOptions {
    /// Address the root namespace instead of the module's own.
    pub root: bool,
}

/// Options for a local `dispatch`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Address the root namespace instead of the module's own.
    pub root: bool,
}

/// Options for `subscribe` / `subscribe_action`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubscribeOptions {
    /// Insert at the front of the subscriber list.
    pub prepend: bool,
}

/// Options for `register_module`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegisterOptions {
    /// Keep whatever state already lives at the module path instead of
    /// grafting the module's initial state.
    pub preserve_state: bool,
}
