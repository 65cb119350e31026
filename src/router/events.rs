//! Events consumed by the router.

use crate::geometry::Geometry;
use crate::shapes::ShapeHandle;
use crate::workouts::FormFields;

/// A shape-lifecycle event emitted by the drawing surface.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeEvent {
    /// A new shape was drawn.
    Created { geometry: Geometry },
    /// An existing shape's geometry changed.
    Edited {
        handle: ShapeHandle,
        geometry: Geometry,
    },
    /// A shape was erased on the surface.
    Deleted { handle: ShapeHandle },
}

/// A form submission from the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum FormSubmission {
    /// The user pressed OK with the given fields.
    Commit(FormFields),
    /// The user dismissed the form.
    Cancel,
}

/// Sort key for the workout list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Date,
    Distance,
    Duration,
    Kind,
}

/// Sort direction for the workout list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}
