//! Geometry value types for drawn map shapes.

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Create a coordinate pair.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lat, self.lng)
    }
}

/// Discriminator for the geometry variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryKind {
    Point,
    Line,
    Polygon,
    Rectangle,
}

impl std::fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeometryKind::Point => write!(f, "Point"),
            GeometryKind::Line => write!(f, "Line"),
            GeometryKind::Polygon => write!(f, "Polygon"),
            GeometryKind::Rectangle => write!(f, "Rectangle"),
        }
    }
}

/// A drawn geometry.
///
/// Lines carry their ordered vertices; polygons and rectangles carry their
/// outer ring (first vertex not repeated at the end).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates", rename_all = "snake_case")]
pub enum Geometry {
    Point(Coordinates),
    Line(Vec<Coordinates>),
    Polygon(Vec<Coordinates>),
    Rectangle(Vec<Coordinates>),
}

impl Geometry {
    /// The variant discriminator.
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point(_) => GeometryKind::Point,
            Geometry::Line(_) => GeometryKind::Line,
            Geometry::Polygon(_) => GeometryKind::Polygon,
            Geometry::Rectangle(_) => GeometryKind::Rectangle,
        }
    }

    /// Whether this is a point marker.
    pub fn is_point(&self) -> bool {
        matches!(self, Geometry::Point(_))
    }

    /// The point coordinates, if this is a point marker.
    pub fn as_point(&self) -> Option<Coordinates> {
        match self {
            Geometry::Point(coords) => Some(*coords),
            _ => None,
        }
    }
}
