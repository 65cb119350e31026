//! Shape handle and persisted shape record types.

use crate::geometry::Geometry;
use serde::{Deserialize, Serialize};

/// Transient identifier for a shape held by a [`ShapeStore`](super::ShapeStore).
///
/// Handles are issued monotonically per store instance and are only meaningful
/// within the current process lifetime. A handle read back from a snapshot is a
/// hint at best and must be rewritten during reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapeHandle(pub u64);

impl std::fmt::Display for ShapeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Persisted form of a non-point shape (line, polygon, rectangle).
///
/// The `id` field records the handle the shape held at the time of the last
/// save. It is discarded and replaced with a fresh handle on reload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeRecord {
    pub id: ShapeHandle,
    pub geometry: Geometry,
}

impl ShapeRecord {
    pub fn new(id: ShapeHandle, geometry: Geometry) -> Self {
        Self { id, geometry }
    }
}
