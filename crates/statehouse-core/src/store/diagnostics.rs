//! # Diagnostic Channel
//!
//! Configuration errors, lookup misses, strict-mode violations and
//! subscriber failures never cross the public API. They land here: logged
//! through `tracing` and kept in a bounded in-memory history.

use crate::config::BuildMode;
use crate::domain::{Severity, StoreError};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{error, warn};

/// One recorded problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Monotonic sequence number, starting at 1.
    pub seq: u64,
    pub error: StoreError,
}

pub(crate) struct DiagnosticLog {
    mode: BuildMode,
    capacity: usize,
    entries: Mutex<VecDeque<Diagnostic>>,
    seq: AtomicU64,
}

impl DiagnosticLog {
    pub(crate) fn new(mode: BuildMode, capacity: usize) -> Self {
        Self {
            mode,
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(64))),
            seq: AtomicU64::new(0),
        }
    }

    /// Log and record `err`. Production mode drops it silently.
    pub(crate) fn report(&self, err: StoreError) {
        if self.mode.is_production() {
            return;
        }
        match err.severity() {
            Severity::Error => error!(error = %err, "[statehouse] {}", err),
            Severity::Warning => warn!(error = %err, "[statehouse] {}", err),
        }
        if self.capacity == 0 {
            return;
        }
        let seq = self.seq.fetch_add(1, Ordering::Relaxed) + 1;
        let mut entries = self.entries.lock();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(Diagnostic { seq, error: err });
    }

    pub(crate) fn snapshot(&self) -> Vec<Diagnostic> {
        self.entries.lock().iter().cloned().collect()
    }

    pub(crate) fn take(&self) -> Vec<Diagnostic> {
        self.entries.lock().drain(..).collect()
    }
}
