//! # Vertex Data Model
//!
//! Plain records describing a particle vertex and its spatial position.
//!
//! [`Vec3`] is `Pod` so position batches can be handed to downstream
//! renderers as flat `f32` buffers without copying field by field.

use std::fmt;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};

/// A 3D position or direction in world units.
///
/// Coordinates are expected to be finite; nothing in the kernel divides by
/// them or branches on NaN, so non-finite input degrades to garbage cells
/// rather than panics.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vec3 {
    /// X coordinate (east/west on the ground plane).
    pub x: f32,
    /// Y coordinate (height). Not spatially indexed.
    pub y: f32,
    /// Z coordinate (north/south on the ground plane).
    pub z: f32,
}

impl Vec3 {
    /// The origin.
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Creates a new vector.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// An axis-aligned box used for range queries.
///
/// Only `x` and `z` participate in spatial queries; the `y` components are
/// carried for callers that post-filter by height.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Bounds {
    /// Creates a bounding box from two corners.
    ///
    /// Corners are taken as-is; callers are expected to pass `min <= max`
    /// per axis.
    #[inline]
    #[must_use]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }
}

/// Unique identifier of a vertex within one store instance.
///
/// Ids are immutable once created and cheap to clone - they land in the
/// vertex table, the spatial index, and the dirty set at the same time.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(Arc<str>);

impl VertexId {
    /// Creates an id from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VertexId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for VertexId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

/// A single particle vertex as edited in the canvas.
///
/// `position` is the only field the spatial index depends on; everything
/// else is presentation state carried through batches untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct Vertex {
    /// Globally unique id within the owning store.
    pub id: VertexId,
    /// World position.
    pub position: Vec3,
    /// Effect type this vertex belongs to (e.g. "flame", "spiral").
    pub effect_type: String,
    /// Layer name the vertex is drawn on.
    pub layer: String,
    /// Display color (hex string, as authored in the UI).
    pub color: String,
    /// Whether the vertex is currently rendered.
    pub visible: bool,
    /// Whether the vertex is currently selected.
    pub selected: bool,
    /// Optional group membership.
    pub group_id: Option<String>,
    /// Optional particle override for export.
    pub particle: Option<String>,
}

impl Vertex {
    /// Creates a vertex with default presentation state at a position.
    ///
    /// Convenience for tests and headless tooling; the editing UI fills in
    /// the presentation fields itself.
    #[must_use]
    pub fn at(id: impl Into<VertexId>, position: Vec3) -> Self {
        Self {
            id: id.into(),
            position,
            effect_type: String::from("free"),
            layer: String::from("default"),
            color: String::from("#ffffff"),
            visible: true,
            selected: false,
            group_id: None,
            particle: None,
        }
    }
}
