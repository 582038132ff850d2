//! # Vertex Store
//!
//! Single source of truth for vertex state. The vertex table, the spatial
//! index, and the dirty set are owned together and mutated together inside
//! one logical batch operation - no external caller touches the index
//! directly.
//!
//! ## Batching
//!
//! Mutations arrive as batches rather than one-at-a-time calls, amortizing
//! per-operation overhead under drag interactions that move hundreds of
//! vertices per frame. The store is synchronous and single-writer; batch
//! methods take `&mut self`, so subscribers never observe a partially
//! applied batch.
//!
//! ## Leniency
//!
//! No batch operation fails on unknown ids. A stale reference (the UI
//! selecting a vertex another edit already deleted) is a no-op, not an
//! error - live-editing races must not crash the session.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use crate::spatial::SpatialIndex;
use crate::vertex::{Bounds, Vec3, Vertex, VertexId};

/// Default duration above which a batch operation is logged as slow.
pub const DEFAULT_SLOW_BATCH_THRESHOLD: Duration = Duration::from_millis(100);

/// One position update inside a batch.
#[derive(Clone, Debug, PartialEq)]
pub struct VertexUpdate {
    /// Target vertex id. Unknown ids are silently skipped.
    pub id: VertexId,
    /// New world position.
    pub position: Vec3,
}

impl VertexUpdate {
    /// Creates an update.
    #[must_use]
    pub fn new(id: impl Into<VertexId>, position: Vec3) -> Self {
        Self {
            id: id.into(),
            position,
        }
    }
}

/// Diagnostic counters for store observability.
///
/// Not part of the correctness contract; renderers read these to surface
/// perf overlays.
#[derive(Clone, Copy, Debug, Default)]
pub struct StoreStats {
    /// Wall-clock duration of the most recent batch operation.
    pub last_batch: Duration,
    /// Total batch operations applied since creation.
    pub total_batches: u64,
    /// Current number of vertices in the table.
    pub vertex_count: usize,
}

/// The batch-mutating vertex store.
#[derive(Debug)]
pub struct SceneStore {
    /// Vertex table.
    vertices: HashMap<VertexId, Vertex>,
    /// Grid index, kept consistent with `vertices` on every mutation.
    index: SpatialIndex,
    /// Ids mutated since the last render flush.
    dirty: HashSet<VertexId>,
    /// Diagnostic counters.
    stats: StoreStats,
    /// Batches slower than this are logged.
    slow_batch_threshold: Duration,
}

impl Default for SceneStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneStore {
    /// Creates an empty store with the default slow-batch threshold.
    #[must_use]
    pub fn new() -> Self {
        Self::with_slow_batch_threshold(DEFAULT_SLOW_BATCH_THRESHOLD)
    }

    /// Creates an empty store with a custom slow-batch threshold.
    #[must_use]
    pub fn with_slow_batch_threshold(threshold: Duration) -> Self {
        Self {
            vertices: HashMap::new(),
            index: SpatialIndex::new(),
            dirty: HashSet::new(),
            stats: StoreStats::default(),
            slow_batch_threshold: threshold,
        }
    }

    /// Inserts a batch of new vertices.
    ///
    /// Each vertex is added to the table, indexed under its position's cell,
    /// and marked dirty. A vertex whose id already exists is skipped - ids
    /// are immutable once created and inserts never clobber.
    pub fn batch_insert(&mut self, vertices: Vec<Vertex>) {
        let started = Instant::now();
        let size = vertices.len();

        for vertex in vertices {
            if self.vertices.contains_key(&vertex.id) {
                continue;
            }
            self.index.insert(vertex.id.clone(), vertex.position);
            self.dirty.insert(vertex.id.clone());
            self.vertices.insert(vertex.id.clone(), vertex);
        }

        self.finish_batch("batch_insert", size, started);
    }

    /// Applies a batch of position updates.
    ///
    /// For each update referencing an existing id: the grid membership moves
    /// from the old cell to the new one, the position is replaced, and the
    /// id is marked dirty. Updates referencing unknown ids are silently
    /// skipped. Validity is checked per item - one stale reference does not
    /// roll back the rest of the batch.
    pub fn batch_update(&mut self, updates: &[VertexUpdate]) {
        let started = Instant::now();

        for update in updates {
            let Some(vertex) = self.vertices.get_mut(&update.id) else {
                continue;
            };
            let old = vertex.position;
            vertex.position = update.position;
            self.index.relocate(&update.id, old, update.position);
            self.dirty.insert(update.id.clone());
        }

        self.finish_batch("batch_update", updates.len(), started);
    }

    /// Deletes a batch of vertices.
    ///
    /// Each existing id is removed from the table, the spatial index, and
    /// the dirty set. Unknown ids are no-ops, so deleting the same list
    /// twice leaves the same final state as deleting it once.
    pub fn batch_delete(&mut self, ids: &[VertexId]) {
        let started = Instant::now();

        for id in ids {
            if let Some(vertex) = self.vertices.remove(id) {
                self.index.remove(id, vertex.position);
                self.dirty.remove(id);
            }
        }

        self.finish_batch("batch_delete", ids.len(), started);
    }

    /// Returns the ids of vertices in cells overlapping `bounds`.
    ///
    /// Delegates to the grid index; the result is coarse (see
    /// [`SpatialIndex::query_range`]) and carries no ordering guarantee.
    #[must_use]
    pub fn select_in_bounds(&self, bounds: &Bounds) -> Vec<VertexId> {
        self.index.query_range(bounds)
    }

    /// Returns and clears the set of ids mutated since the last flush.
    ///
    /// The render path consumes this to skip unchanged geometry.
    pub fn take_dirty(&mut self) -> HashSet<VertexId> {
        std::mem::take(&mut self.dirty)
    }

    /// Looks up a vertex by id.
    #[must_use]
    pub fn get(&self, id: &VertexId) -> Option<&Vertex> {
        self.vertices.get(id)
    }

    /// Current position of a vertex, if present.
    #[must_use]
    pub fn position_of(&self, id: &VertexId) -> Option<Vec3> {
        self.vertices.get(id).map(|v| v.position)
    }

    /// Number of vertices in the store.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Returns true if the store holds no vertices.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Read access to the grid index, for diagnostics and tests.
    #[must_use]
    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    /// Diagnostic counters.
    #[must_use]
    pub fn stats(&self) -> StoreStats {
        self.stats
    }

    /// Closes out a batch: updates counters, logs slow operations.
    fn finish_batch(&mut self, op: &str, size: usize, started: Instant) {
        let elapsed = started.elapsed();
        self.stats.last_batch = elapsed;
        self.stats.total_batches += 1;
        self.stats.vertex_count = self.vertices.len();

        if elapsed > self.slow_batch_threshold {
            tracing::warn!(
                op,
                batch = size,
                elapsed_us = elapsed.as_micros() as u64,
                "slow scene batch"
            );
        }
    }
}
