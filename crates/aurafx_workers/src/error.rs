//! # Worker Error Types
//!
//! Errors that cross the actor boundary. Computation inside a worker never
//! errors - malformed but well-typed requests get in-band replies (see the
//! transform worker's `Error` result kind). These types cover the boundary
//! itself: full queues, dead threads, missed replies.

use std::time::Duration;

use thiserror::Error;

/// Errors returned by worker handles.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkerError {
    /// The request queue is full; backpressure is surfaced, never blocked on.
    #[error("worker queue full: {capacity} requests in flight")]
    QueueFull {
        /// Bounded capacity of the request queue.
        capacity: usize,
    },

    /// The worker thread is gone (already shut down, or it panicked).
    #[error("worker disconnected")]
    Disconnected,

    /// No reply arrived within the allowed wait.
    #[error("timed out waiting for worker reply after {0:?}")]
    ReplyTimeout(Duration),

    /// The worker thread panicked and could not be joined cleanly.
    #[error("worker thread panicked during shutdown")]
    JoinPanic,
}

/// Result type for worker-boundary operations.
pub type WorkerResult<T> = Result<T, WorkerError>;
