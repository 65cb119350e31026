//! Startup reconciliation: rebuilds the live model from the durable snapshot.
//!
//! Shape handles are transient, so every persisted handle is a stale hint.
//! Reconciliation re-adds each persisted geometry to the shape store (which
//! issues fresh handles) and rewrites the owning record's reference before
//! admitting it into the live model.

use crate::geometry::Geometry;
use crate::shapes::{ShapeRecord, ShapeStore};
use crate::storage::kv::KeyValueStore;
use crate::storage::snapshot::SnapshotStore;
use crate::storage::PersistenceFailure;
use crate::workouts::Workout;

/// Reconciliation progress. Runs once at startup, then stays `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconcileState {
    /// Not yet started.
    #[default]
    Empty,
    /// Reading the durable snapshot.
    Loading,
    /// Re-adding persisted geometries and rewriting handles.
    Rebuilding,
    /// Live events may now be accepted.
    Ready,
}

/// The live model rebuilt from a snapshot.
#[derive(Debug, Default)]
pub struct Rebuilt {
    /// Workouts with their `shape_ref` rewritten to fresh handles.
    pub workouts: Vec<Workout>,
    /// Non-point shape records with their `id` hint rewritten.
    pub shapes: Vec<ShapeRecord>,
    /// False when the snapshot was absent or empty ("no data yet").
    pub had_data: bool,
}

/// One-shot startup reconciler.
#[derive(Debug, Default)]
pub struct Reconciler {
    state: ReconcileState,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// The state reached so far.
    pub fn state(&self) -> ReconcileState {
        self.state
    }

    /// Replay the snapshot through the shape store.
    ///
    /// An absent snapshot or empty collections is not an error: the state
    /// machine moves straight to `Ready` with `had_data == false`. Workouts
    /// are rebuilt before non-point shapes so handle assignment is
    /// deterministic.
    pub fn run<S: KeyValueStore>(
        &mut self,
        snapshots: &SnapshotStore<S>,
        shapes: &mut ShapeStore,
    ) -> Result<Rebuilt, PersistenceFailure> {
        self.state = ReconcileState::Loading;

        let persisted_workouts = snapshots.load_workouts()?;
        let persisted_shapes = snapshots.load_shapes()?;

        if persisted_workouts.is_empty() && persisted_shapes.is_empty() {
            self.state = ReconcileState::Ready;
            tracing::info!("no snapshot data, starting empty");
            return Ok(Rebuilt::default());
        }

        self.state = ReconcileState::Rebuilding;

        let mut workouts = Vec::with_capacity(persisted_workouts.len());
        for mut workout in persisted_workouts {
            let stale = workout.shape_ref;
            let fresh = shapes.add(Geometry::Point(workout.point));
            workout.shape_ref = fresh;
            tracing::debug!(
                "workout {} remapped {} -> {}",
                workout.stable_id,
                stale,
                fresh
            );
            workouts.push(workout);
        }

        let mut records = Vec::with_capacity(persisted_shapes.len());
        for mut record in persisted_shapes {
            let stale = record.id;
            let fresh = shapes.add(record.geometry.clone());
            record.id = fresh;
            tracing::debug!("shape record remapped {} -> {}", stale, fresh);
            records.push(record);
        }

        self.state = ReconcileState::Ready;
        tracing::info!(
            "reconciled {} workouts and {} shapes from snapshot",
            workouts.len(),
            records.len()
        );

        Ok(Rebuilt {
            workouts,
            shapes: records,
            had_data: true,
        })
    }
}
