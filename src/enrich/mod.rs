//! Pluggable enrichment lookups (weather, reverse geocoding).
//!
//! Providers return opaque data for a coordinate pair. [`TimedEnrichment`]
//! races a provider against a fixed deadline on a worker thread; whichever
//! settles first determines the outcome. A timeout or lookup failure is a
//! recoverable [`EnrichmentFailure`] that the router turns into a clean abort
//! of the pending workout creation.

use crate::geometry::Coordinates;
use crossbeam::channel;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Enrichment payload attached to a workout at creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Enrichment {
    /// Reverse-geocoded place name, used to enrich the workout label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Opaque weather payload as returned by the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<serde_json::Value>,
}

/// Enrichment lookup failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnrichmentFailure {
    /// The lookup did not settle before the deadline.
    #[error("enrichment lookup timed out after {0:?}")]
    Timeout(Duration),

    /// The provider settled with a failure.
    #[error("enrichment lookup failed: {0}")]
    Lookup(String),
}

/// A provider resolving coordinates to enrichment data.
///
/// `Send + Sync` so [`TimedEnrichment`] can run the lookup on a worker thread.
pub trait EnrichmentProvider: Send + Sync {
    fn lookup(&self, coords: Coordinates) -> Result<Enrichment, EnrichmentFailure>;
}

impl<F> EnrichmentProvider for F
where
    F: Fn(Coordinates) -> Result<Enrichment, EnrichmentFailure> + Send + Sync,
{
    fn lookup(&self, coords: Coordinates) -> Result<Enrichment, EnrichmentFailure> {
        self(coords)
    }
}

/// Races an [`EnrichmentProvider`] against a fixed timeout.
///
/// The provider runs on a spawned worker thread and reports through a bounded
/// channel; the calling side blocks on `recv_timeout`. A provider that settles
/// after the deadline finds the channel closed and its result is dropped.
pub struct TimedEnrichment {
    provider: Arc<dyn EnrichmentProvider>,
    timeout: Duration,
}

impl TimedEnrichment {
    /// Wrap a provider with the given deadline.
    pub fn new(provider: Arc<dyn EnrichmentProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    /// Perform one lookup, racing the provider against the deadline.
    pub fn lookup(&self, coords: Coordinates) -> Result<Enrichment, EnrichmentFailure> {
        let (tx, rx) = channel::bounded(1);
        let provider = Arc::clone(&self.provider);

        std::thread::spawn(move || {
            // The receiver may be gone if the deadline already passed.
            let _ = tx.send(provider.lookup(coords));
        });

        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!("enrichment lookup for {} timed out", coords);
                Err(EnrichmentFailure::Timeout(self.timeout))
            }
        }
    }
}
