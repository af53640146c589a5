//! # Next-Tick Scheduling
//!
//! Work that must not run inline (batched watcher flushes, disposal of a
//! replaced root) is handed to a `Scheduler`.

use parking_lot::Mutex;
use std::collections::VecDeque;
use tracing::trace;

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs tasks "on the next tick" of the host event loop.
pub trait Scheduler: Send + Sync {
    /// Queue `task` to run after the current synchronous work completes.
    fn next_tick(&self, task: Task);
}

/// Spawns tasks onto the current tokio runtime.
///
/// Outside of a runtime there is no next tick to wait for, so the task runs
/// inline.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn next_tick(&self, task: Task) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move { task() });
            }
            Err(_) => {
                trace!("No tokio runtime, running next-tick task inline");
                task();
            }
        }
    }
}

/// Runs every task immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImmediateScheduler;

impl Scheduler for ImmediateScheduler {
    fn next_tick(&self, task: Task) {
        task();
    }
}

/// Queues tasks until `run_pending` is called.
///
/// Gives tests full control over when deferred work happens.
#[derive(Default)]
pub struct ManualScheduler {
    queue: Mutex<VecDeque<Task>>,
}

impl ManualScheduler {
    /// Create an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued tasks.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// Run queued tasks until the queue is empty, including tasks queued
    /// by the tasks themselves. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            // Lock released before the task runs so it can schedule more work.
            let next = self.queue.lock().pop_front();
            let Some(task) = next else {
                return ran;
            };
            task();
            ran += 1;
        }
    }
}

impl Scheduler for ManualScheduler {
    fn next_tick(&self, task: Task) {
        self.queue.lock().push_back(task);
    }
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("pending", &self.pending())
            .finish()
    }
}
