//! The event router: the state machine driving model, shapes, and snapshots.

pub mod engine;
pub mod events;

pub use engine::{ConsistencyError, EngineError, EventRouter, FormMode, SnapshotView};
pub use events::{FormSubmission, ShapeEvent, SortKey, SortOrder};
