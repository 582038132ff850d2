//! # AuraFX Workers
//!
//! Off-thread compute for the editor canvas. Expensive per-frame work
//! (transform math, hit testing, animation phase) runs on dedicated actor
//! threads so the render thread never blocks.
//!
//! ## Architecture
//!
//! ```text
//!  UI / render thread                     worker threads
//! ┌────────────────────┐   requests   ┌──────────────────────┐
//! │                    │─────────────>│  TransformWorker     │
//! │                    │<─────────────│  (stateless math)    │
//! │                    │   results    └──────────────────────┘
//! │   EditorSession    │   queries    ┌──────────────────────┐
//! │  (aurafx facade)   │─────────────>│  SelectionWorker     │
//! │                    │<─────────────│  (hit testing)       │
//! │                    │   results    └──────────────────────┘
//! │                    │   commands   ┌──────────────────────┐
//! │                    │─────────────>│  ChainWorker         │
//! │                    │<─────────────│  (~30 Hz clock)      │
//! └────────────────────┘   frames     └──────────────────────┘
//! ```
//!
//! ## The actor contract
//!
//! - Every message carries all data needed to compute its reply; nothing is
//!   shared between the UI thread and a worker beyond the copied payload.
//! - Within one worker, messages are processed strictly in arrival order,
//!   one at a time, each to completion. There is no cancellation - requests
//!   are pure, bounded, CPU-only computations.
//! - Across distinct workers there is NO ordering guarantee. Callers
//!   correlate replies by their result kind, never by cross-worker FIFO.
//! - The chain worker is the one actor with retained state: its animation
//!   clock (item list, cycle duration, start instant), owned entirely by its
//!   thread.
//!
//! Outbound queues are bounded. A worker never blocks on a consumer that
//! stopped draining: a full result queue drops the result with a warning
//! and counts it in the worker's stats.

pub mod chain;
pub mod error;
pub mod selection;
pub mod stats;
pub mod transform;

pub use chain::{
    chain_frame, ChainCommand, ChainFrame, ChainFrameRow, ChainItem, ChainWorker,
    DEFAULT_CYCLE_DURATION, TICK_INTERVAL,
};
pub use error::{WorkerError, WorkerResult};
pub use selection::{
    hit_test, ScreenPoint, SelectionBox, SelectionElement, SelectionQuery, SelectionResult,
    SelectionWorker, ViewMode,
};
pub use stats::WorkerStats;
pub use transform::{
    batch_transform, rotate_around_point, Transform, TransformRequest, TransformResult,
    TransformResultKind, TransformWorker,
};
