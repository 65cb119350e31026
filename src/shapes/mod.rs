//! In-memory shape bookkeeping and transient handle issuance.

pub mod store;
pub mod types;

pub use store::ShapeStore;
pub use types::{ShapeHandle, ShapeRecord};
