//! # Spatial Index (Uniform Grid)
//!
//! Maps occupied grid cells to the set of vertex ids inside them, so
//! bounding-box queries touch only the cells a query rectangle overlaps
//! instead of every vertex in the scene.
//!
//! ## Invariants
//!
//! - Every indexed vertex appears in exactly one cell, the one matching its
//!   current position.
//! - A cell whose membership set becomes empty is deleted outright. The map
//!   never grows past the number of occupied cells, no matter how much key
//!   churn a drag operation produces.

use std::collections::{HashMap, HashSet};

use crate::grid::CellCoord;
use crate::vertex::{Bounds, Vec3, VertexId};

/// Uniform-grid index over the x/z plane.
#[derive(Debug, Default)]
pub struct SpatialIndex {
    /// Occupied cells only. Empty sets must never be retained.
    cells: HashMap<CellCoord, HashSet<VertexId>>,
}

impl SpatialIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a vertex id under the cell covering `position`.
    pub fn insert(&mut self, id: VertexId, position: Vec3) {
        let cell = CellCoord::from_world_pos(position.x, position.z);
        self.cells.entry(cell).or_default().insert(id);
    }

    /// Removes a vertex id from the cell covering `position`.
    ///
    /// Deletes the cell entry entirely if the membership set becomes empty.
    /// Removing an id that was never indexed is a no-op.
    pub fn remove(&mut self, id: &VertexId, position: Vec3) {
        let cell = CellCoord::from_world_pos(position.x, position.z);
        if let Some(members) = self.cells.get_mut(&cell) {
            members.remove(id);
            if members.is_empty() {
                self.cells.remove(&cell);
            }
        }
    }

    /// Moves a vertex id from the cell covering `old` to the cell covering
    /// `new`, as one step.
    ///
    /// Called only from inside a store batch pass, so no observer sees the
    /// id missing from both cells.
    pub fn relocate(&mut self, id: &VertexId, old: Vec3, new: Vec3) {
        let old_cell = CellCoord::from_world_pos(old.x, old.z);
        let new_cell = CellCoord::from_world_pos(new.x, new.z);
        if old_cell == new_cell {
            return;
        }
        self.remove(id, old);
        self.insert(id.clone(), new);
    }

    /// Returns all ids in cells overlapping `bounds` on the x/z plane.
    ///
    /// The result is coarse: the inclusive cell range covering
    /// `[min.x, max.x] x [min.z, max.z]` is unioned without fine-grained
    /// filtering, so vertices near a non-aligned edge may be returned even
    /// when their exact position lies outside the rectangle (by less than
    /// one cell). Callers needing exact containment post-filter by the real
    /// vertex position. No ordering guarantee.
    #[must_use]
    pub fn query_range(&self, bounds: &Bounds) -> Vec<VertexId> {
        let min_cell = CellCoord::from_world_pos(bounds.min.x, bounds.min.z);
        let max_cell = CellCoord::from_world_pos(bounds.max.x, bounds.max.z);

        let mut result = Vec::new();
        for x in min_cell.x..=max_cell.x {
            for z in min_cell.z..=max_cell.z {
                if let Some(members) = self.cells.get(&CellCoord::new(x, z)) {
                    result.extend(members.iter().cloned());
                }
            }
        }
        result
    }

    /// Returns the members of one cell, if occupied.
    ///
    /// Diagnostic accessor; batch mutation goes through the store.
    #[must_use]
    pub fn cell_members(&self, cell: CellCoord) -> Option<&HashSet<VertexId>> {
        self.cells.get(&cell)
    }

    /// Number of occupied cells.
    #[inline]
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Total number of memberships across all cells.
    ///
    /// Equals the number of indexed vertices when the one-cell-per-vertex
    /// invariant holds.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.cells.values().map(HashSet::len).sum()
    }

    /// Returns true if no cell is occupied.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
