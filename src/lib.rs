//! MapTrail - Map-Based Workout Tracker Core
//!
//! The synchronization engine behind a map application where users drop point
//! markers that become Running/Cycling workouts and draw free-form lines,
//! polygons, and rectangles. The engine keeps three things consistent over
//! time: the workout entities, the geometric shapes backing them, and a
//! durable snapshot of both — across an identity scheme where shape handles
//! are runtime-assigned and unstable across restarts while workouts carry
//! stable ids.

pub mod enrich;
pub mod geometry;
pub mod position;
pub mod reconcile;
pub mod router;
pub mod shapes;
pub mod storage;
pub mod workouts;

// Re-export commonly used types
pub use router::{EventRouter, FormMode, FormSubmission, ShapeEvent};
pub use shapes::{ShapeHandle, ShapeStore};
pub use storage::{Database, MemoryStore, SnapshotStore};
pub use workouts::{FormFields, Workout, WorkoutKind};
