//! # AuraFX Editor Core
//!
//! The performance core of the AuraFX particle-effect editor: a spatially
//! indexed, batch-mutating vertex store with off-thread transform,
//! selection, and chain-animation workers.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        EditorSession                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  render thread                      worker threads              │
//! │  ┌────────────────┐    requests    ┌──────────────────────┐     │
//! │  │   SceneStore   │ ─────────────> │  TransformWorker     │     │
//! │  │                │ <───────────── │  SelectionWorker     │     │
//! │  │ table + index  │    results     │  ChainWorker         │     │
//! │  │ + dirty set    │                └──────────────────────┘     │
//! │  └────────────────┘      copied messages only, no sharing       │
//! │                                                                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The store is synchronous and single-writer; batching amortizes
//! per-mutation overhead, it is not a concurrency mechanism. The workers
//! are isolated actors reached only by message passing.
//!
//! ## Crates
//!
//! - `aurafx_scene`: the synchronous scene kernel
//! - `aurafx_workers`: the off-thread compute actors
//! - `aurafx` (this crate): configuration + the session facade

pub mod config;
pub mod session;

pub use config::{ChainSettings, ConfigError, EditorConfig, SceneSettings, WorkerSettings};
pub use session::EditorSession;

// Re-export the kernel and worker surfaces
pub use aurafx_scene as scene;
pub use aurafx_workers as workers;
