//! # Deferred
//!
//! The uniform result type of every action. Handlers may produce a plain
//! value, a `Result`, or a future; all of them are normalized into a
//! `Deferred` at registration time so `dispatch` never has to inspect what
//! a handler returned.

use futures::future::{self, BoxFuture, FutureExt};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tracing::trace;

/// An awaitable action outcome.
///
/// Deferreds built with `spawn` (every `dispatch` result) are already
/// running; dropping one discards the outcome, not the work.
pub struct Deferred {
    inner: BoxFuture<'static, anyhow::Result<Value>>,
}

impl Deferred {
    /// Already resolved with `value`.
    pub fn resolved(value: Value) -> Self {
        Self {
            inner: future::ready(Ok(value)).boxed(),
        }
    }

    /// Already rejected with `error`.
    pub fn rejected(error: impl Into<anyhow::Error>) -> Self {
        let error = error.into();
        Self {
            inner: future::ready(Err(error)).boxed(),
        }
    }

    /// Wrap a future.
    pub fn from_future<F>(fut: F) -> Self
    where
        F: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        Self { inner: fut.boxed() }
    }

    /// Start `fut` now and return its outcome.
    ///
    /// Runs as a task on the current tokio runtime. Without a runtime the
    /// future is driven to completion on the calling thread before this
    /// returns.
    pub fn spawn<F>(fut: F) -> Self
    where
        F: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let task = handle.spawn(fut);
                Self::from_future(async move {
                    match task.await {
                        Ok(outcome) => outcome,
                        Err(err) => Err(anyhow::Error::new(err).context("action task failed")),
                    }
                })
            }
            Err(_) => {
                trace!("No tokio runtime, running action inline");
                match futures::executor::block_on(fut) {
                    Ok(value) => Self::resolved(value),
                    Err(error) => Self::rejected(error),
                }
            }
        }
    }

    /// Resolves to an array of every result once all resolve; rejects with
    /// the first rejection.
    pub fn all(deferreds: Vec<Deferred>) -> Self {
        Self::from_future(async move {
            future::try_join_all(deferreds).await.map(Value::Array)
        })
    }
}

impl Future for Deferred {
    type Output = anyhow::Result<Value>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}

impl From<Value> for Deferred {
    fn from(value: Value) -> Self {
        Deferred::resolved(value)
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Deferred { .. }")
    }
}

/// Anything a synchronous action handler may return.
pub trait IntoDeferred {
    fn into_deferred(self) -> Deferred;
}

impl IntoDeferred for Deferred {
    fn into_deferred(self) -> Deferred {
        self
    }
}

impl IntoDeferred for Value {
    fn into_deferred(self) -> Deferred {
        Deferred::resolved(self)
    }
}

impl IntoDeferred for () {
    fn into_deferred(self) -> Deferred {
        Deferred::resolved(Value::Null)
    }
}

impl<E> IntoDeferred for Result<Value, E>
where
    E: Into<anyhow::Error>,
{
    fn into_deferred(self) -> Deferred {
        match self {
            Ok(value) => Deferred::resolved(value),
            Err(error) => Deferred::rejected(error),
        }
    }
}
