//! # Worker Statistics
//!
//! Diagnostic counters shared between a worker thread and its handle.
//! Written by the worker, read by callers; not part of the correctness
//! contract.

use std::time::Duration;

/// Counters for one worker instance.
#[derive(Clone, Copy, Debug, Default)]
pub struct WorkerStats {
    /// Messages processed to completion.
    pub messages: u64,
    /// Total payload items processed (vertices, elements, or frame rows).
    pub items_processed: u64,
    /// Results dropped because the outbound queue was full.
    pub dropped_results: u64,
    /// Total wall-clock time spent computing.
    pub busy: Duration,
}

impl WorkerStats {
    /// Records one completed message.
    pub(crate) fn record(&mut self, items: usize, busy: Duration) {
        self.messages += 1;
        self.items_processed += items as u64;
        self.busy += busy;
    }
}
