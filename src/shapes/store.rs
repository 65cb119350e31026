//! The shape store: in-memory geometry ownership plus handle issuance.

use crate::geometry::{Geometry, GeometryKind};
use crate::shapes::types::ShapeHandle;
use std::collections::BTreeMap;

/// In-memory collection of drawn geometries.
///
/// Stands in for the drawing surface's layer group: every added geometry
/// receives a fresh transient handle, unique among currently-held shapes and
/// monotonically assigned for the lifetime of the store. No persistence logic
/// lives here.
#[derive(Debug, Default)]
pub struct ShapeStore {
    shapes: BTreeMap<ShapeHandle, Geometry>,
    next_handle: u64,
}

impl ShapeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a geometry, returning its freshly issued handle.
    pub fn add(&mut self, geometry: Geometry) -> ShapeHandle {
        self.next_handle += 1;
        let handle = ShapeHandle(self.next_handle);
        tracing::debug!("shape {} added ({})", handle, geometry.kind());
        self.shapes.insert(handle, geometry);
        handle
    }

    /// Remove a shape, returning its geometry if the handle was live.
    pub fn remove(&mut self, handle: ShapeHandle) -> Option<Geometry> {
        let removed = self.shapes.remove(&handle);
        if removed.is_some() {
            tracing::debug!("shape {} removed", handle);
        }
        removed
    }

    /// Look up a live shape.
    pub fn get(&self, handle: ShapeHandle) -> Option<&Geometry> {
        self.shapes.get(&handle)
    }

    /// Replace the geometry behind a live handle. Returns false if the handle
    /// is not live.
    pub fn update(&mut self, handle: ShapeHandle, geometry: Geometry) -> bool {
        match self.shapes.get_mut(&handle) {
            Some(slot) => {
                *slot = geometry;
                true
            }
            None => false,
        }
    }

    /// Iterate all live shapes as (handle, geometry, kind).
    pub fn all(&self) -> impl Iterator<Item = (ShapeHandle, &Geometry, GeometryKind)> {
        self.shapes.iter().map(|(h, g)| (*h, g, g.kind()))
    }

    /// Number of live shapes.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Whether the store holds no shapes.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Drop every shape. Handle issuance keeps counting upward so stale
    /// handles can never alias a later shape.
    pub fn clear(&mut self) {
        self.shapes.clear();
    }
}
