//! # AuraFX Scene Kernel
//!
//! The single source of truth for editor geometry.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                      SceneStore                         │
//! │                                                         │
//! │  ┌──────────────┐  ┌───────────────┐  ┌─────────────┐  │
//! │  │ Vertex Table │  │ Spatial Index │  │  Dirty Set  │  │
//! │  │ id → Vertex  │  │ cell → {ids}  │  │    {ids}    │  │
//! │  └──────┬───────┘  └───────┬───────┘  └──────┬──────┘  │
//! │         │                  │                 │         │
//! │         └────── mutated together per batch ──┘         │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! All three structures are owned by one [`SceneStore`] and mutated together
//! inside a single batch operation. The store is single-writer: callers hold
//! `&mut SceneStore` for the duration of a batch, so observers see either the
//! fully-old or fully-new state, never a half-applied batch.
//!
//! Expensive per-frame work (transform math, hit testing, animation phase)
//! does NOT live here - it is offloaded to the worker actors in
//! `aurafx_workers`.
//!
//! ## Modules
//!
//! - `vertex`: plain data records ([`Vec3`], [`Vertex`], [`Bounds`])
//! - `grid`: world-to-cell coordinate mapping
//! - `spatial`: the uniform-grid index
//! - `store`: the batch-mutating vertex store

pub mod grid;
pub mod spatial;
pub mod store;
pub mod vertex;

pub use grid::{CellCoord, GRID_SIZE};
pub use spatial::SpatialIndex;
pub use store::{SceneStore, StoreStats, VertexUpdate};
pub use vertex::{Bounds, Vec3, Vertex, VertexId};
