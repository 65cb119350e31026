//! The workout entity model: types, derived metrics, and input validation.

pub mod types;
pub mod validate;

pub use types::{derived_metric, DerivedMetric, StableId, Workout, WorkoutKind, WorkoutType};
pub use validate::{validate, FormFields, ValidationError};
