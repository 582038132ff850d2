//! # Grid Coordinates
//!
//! World positions are bucketed into fixed-size square cells on the x/z
//! plane. The y/height axis is not indexed - the editor's spatial queries
//! are top-down.

use std::fmt;

/// Cell edge length in world units.
pub const GRID_SIZE: f32 = 10.0;

/// Coordinate of one spatial-index cell (in cells, not world units).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CellCoord {
    /// X coordinate of the cell.
    pub x: i32,
    /// Z coordinate of the cell.
    pub z: i32,
}

impl CellCoord {
    /// Creates a cell coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Buckets a world position into its cell.
    ///
    /// Uses float floor, so fractional negative positions round toward
    /// negative infinity: `-0.5` lands in cell `-1`, not cell `0`.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_world_pos(x: f32, z: f32) -> Self {
        Self {
            x: (x / GRID_SIZE).floor() as i32,
            z: (z / GRID_SIZE).floor() as i32,
        }
    }
}

impl fmt::Display for CellCoord {
    /// Renders the derived string key, `"x,z"`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.z)
    }
}
