//! Ambient position acquisition.
//!
//! A one-shot lookup that gates map initialization: it resolves or fails
//! exactly once, and nothing else runs concurrently with it. The acquisition
//! mechanics live behind the collaborator trait; the core only needs the
//! resolved coordinates or a user-facing failure.

use crate::geometry::Coordinates;
use thiserror::Error;

/// Position acquisition failure, surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    #[error("could not get your position: permission denied")]
    Denied,

    #[error("could not get your position: timed out")]
    Timeout,

    #[error("could not get your position: {0}")]
    Unavailable(String),
}

/// One-shot provider of the user's current position.
pub trait PositionProvider {
    fn current_position(&self) -> Result<Coordinates, PositionError>;
}

/// Provider returning a fixed coordinate pair, used as the configured
/// fallback and in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Coordinates);

impl PositionProvider for FixedPosition {
    fn current_position(&self) -> Result<Coordinates, PositionError> {
        Ok(self.0)
    }
}
