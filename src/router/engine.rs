//! The event router.
//!
//! Consumes shape-lifecycle events from the drawing surface and form/list
//! events from the UI, and drives the entity model, the shape store, and the
//! snapshot writer. The current form mode is an explicit state machine value,
//! so event-ordering questions (a delete arriving mid-edit, a second point
//! drawn while a form is pending) have a defined resolution instead of
//! depending on ambient UI state.

use crate::enrich::{EnrichmentFailure, TimedEnrichment};
use crate::geometry::Geometry;
use crate::reconcile::Reconciler;
use crate::router::events::{FormSubmission, ShapeEvent, SortKey, SortOrder};
use crate::shapes::{ShapeHandle, ShapeRecord, ShapeStore};
use crate::storage::kv::KeyValueStore;
use crate::storage::snapshot::SnapshotStore;
use crate::storage::PersistenceFailure;
use crate::workouts::{validate, StableId, ValidationError, Workout};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use thiserror::Error;

/// The current form mode. Only one may be active at a time.
///
/// Any non-Idle mode hides the workout list and locks point drawing until the
/// pending operation resolves.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormMode {
    /// No form is open.
    #[default]
    Idle,
    /// A point was just drawn; the creation form is open and uncommitted. The
    /// pending handle is not yet attached to any workout.
    AwaitingNewWorkout { pending: ShapeHandle },
    /// An existing workout's form is open for editing.
    AwaitingEdit { workout: StableId },
}

/// A synchronization invariant broke. Raised loudly, never swallowed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsistencyError {
    #[error("workout {workout} references missing point shape {handle}")]
    DanglingShapeRef {
        workout: StableId,
        handle: ShapeHandle,
    },

    #[error("no workout found for id {0}")]
    UnknownWorkout(StableId),

    #[error("no live shape held for handle {0}")]
    UnknownShape(ShapeHandle),

    #[error("point-backed shape {0} received non-point geometry")]
    GeometryMismatch(ShapeHandle),
}

/// Error surface of the router.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Bad user input; recoverable, nothing was applied.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A synchronization invariant broke.
    #[error(transparent)]
    Consistency(#[from] ConsistencyError),

    /// Enrichment lookup failed or timed out; the pending creation was
    /// rolled back.
    #[error(transparent)]
    Enrichment(#[from] EnrichmentFailure),

    /// Durable write failed; in-memory state remains authoritative.
    #[error(transparent)]
    Persistence(#[from] PersistenceFailure),

    /// A form is already pending; point drawing and edit requests are locked
    /// until it resolves.
    #[error("a form is already pending; resolve it before starting another")]
    FormBusy,

    /// A submission arrived with no form open.
    #[error("no form is pending for this submission")]
    NoPendingForm,
}

/// Read-only view of the live model for rendering.
#[derive(Debug)]
pub struct SnapshotView<'a> {
    pub workouts: &'a [Workout],
    pub shapes: &'a [ShapeRecord],
}

/// The synchronization core.
///
/// Owns the shape store, the workout collection, the non-point shape records,
/// and the snapshot writer. Construction reconciles the durable snapshot
/// before any live event is accepted.
pub struct EventRouter<S: KeyValueStore> {
    shapes: ShapeStore,
    workouts: Vec<Workout>,
    drawings: Vec<ShapeRecord>,
    snapshots: SnapshotStore<S>,
    enrichment: Option<TimedEnrichment>,
    mode: FormMode,
    had_snapshot_data: bool,
}

impl<S: KeyValueStore> EventRouter<S> {
    /// Reconcile from the given store and start accepting live events.
    pub fn new(store: S) -> Result<Self, EngineError> {
        Self::build(store, None)
    }

    /// Like [`EventRouter::new`], with an enrichment lookup performed at
    /// every workout creation.
    pub fn with_enrichment(store: S, enrichment: TimedEnrichment) -> Result<Self, EngineError> {
        Self::build(store, Some(enrichment))
    }

    fn build(store: S, enrichment: Option<TimedEnrichment>) -> Result<Self, EngineError> {
        let snapshots = SnapshotStore::new(store);
        let mut shapes = ShapeStore::new();
        let rebuilt = Reconciler::new().run(&snapshots, &mut shapes)?;

        Ok(Self {
            shapes,
            workouts: rebuilt.workouts,
            drawings: rebuilt.shapes,
            snapshots,
            enrichment,
            mode: FormMode::Idle,
            had_snapshot_data: rebuilt.had_data,
        })
    }

    /// The current form mode.
    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    /// Whether the workout list should be shown. Hidden while a form is
    /// pending so a stale click cannot mutate state mid-edit.
    pub fn list_visible(&self) -> bool {
        self.mode == FormMode::Idle
    }

    /// Whether the drawing surface should refuse new point markers.
    pub fn point_drawing_locked(&self) -> bool {
        self.mode != FormMode::Idle
    }

    /// False when the snapshot was absent or empty at startup ("no data
    /// yet" UI state).
    pub fn had_snapshot_data(&self) -> bool {
        self.had_snapshot_data
    }

    /// The live workout collection, in display order.
    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    /// The live non-point shape records.
    pub fn drawings(&self) -> &[ShapeRecord] {
        &self.drawings
    }

    /// The shape store (for the rendering side).
    pub fn shapes(&self) -> &ShapeStore {
        &self.shapes
    }

    /// Read-only view of the live model for rendering.
    pub fn snapshot(&self) -> SnapshotView<'_> {
        SnapshotView {
            workouts: &self.workouts,
            shapes: &self.drawings,
        }
    }

    /// Handle a shape-lifecycle event from the drawing surface.
    pub fn on_shape_event(&mut self, event: ShapeEvent) -> Result<(), EngineError> {
        match event {
            ShapeEvent::Created { geometry } => self.on_shape_created(geometry),
            ShapeEvent::Edited { handle, geometry } => self.on_shape_edited(handle, geometry),
            ShapeEvent::Deleted { handle } => self.on_shape_deleted(handle),
        }
    }

    fn on_shape_created(&mut self, geometry: Geometry) -> Result<(), EngineError> {
        if geometry.is_point() {
            // Re-entrancy guard: one pending form at a time.
            if self.mode != FormMode::Idle {
                tracing::warn!("point drawn while a form is pending, rejecting");
                return Err(EngineError::FormBusy);
            }

            let pending = self.shapes.add(geometry);
            self.mode = FormMode::AwaitingNewWorkout { pending };
            tracing::debug!("awaiting new workout for pending point {}", pending);
            return Ok(());
        }

        // Non-point shapes commit directly, independent of form state.
        let handle = self.shapes.add(geometry.clone());
        self.drawings.push(ShapeRecord::new(handle, geometry));
        self.persist_shapes()
    }

    fn on_shape_edited(&mut self, handle: ShapeHandle, geometry: Geometry) -> Result<(), EngineError> {
        if let Some(idx) = self.workouts.iter().position(|w| w.shape_ref == handle) {
            let coords = match geometry.as_point() {
                Some(coords) => coords,
                None => {
                    let err = ConsistencyError::GeometryMismatch(handle);
                    tracing::error!("{err}");
                    return Err(err.into());
                }
            };

            self.shapes.update(handle, geometry);
            self.workouts[idx].point = coords;
            tracing::debug!("workout {} moved to {}", self.workouts[idx].stable_id, coords);
            return self.persist_workouts();
        }

        if let Some(idx) = self.drawings.iter().position(|r| r.id == handle) {
            self.shapes.update(handle, geometry.clone());
            self.drawings[idx].geometry = geometry;
            return self.persist_shapes();
        }

        let err = ConsistencyError::UnknownShape(handle);
        tracing::error!("edit event for unknown shape: {err}");
        Err(err.into())
    }

    fn on_shape_deleted(&mut self, handle: ShapeHandle) -> Result<(), EngineError> {
        // A deleted pending point discards the uncommitted creation.
        if let FormMode::AwaitingNewWorkout { pending } = self.mode {
            if pending == handle {
                self.shapes
                    .remove(handle)
                    .ok_or(ConsistencyError::UnknownShape(handle))?;
                self.mode = FormMode::Idle;
                tracing::warn!("pending point {} deleted, creation discarded", handle);
                return Ok(());
            }
        }

        if let Some(idx) = self.workouts.iter().position(|w| w.shape_ref == handle) {
            let stable_id = self.workouts[idx].stable_id.clone();

            // Deletion wins over an open edit on the same workout.
            if self.mode == (FormMode::AwaitingEdit { workout: stable_id.clone() }) {
                tracing::warn!("workout {} deleted while its edit form was open", stable_id);
                self.mode = FormMode::Idle;
            }

            if self.shapes.remove(handle).is_none() {
                let err = ConsistencyError::DanglingShapeRef {
                    workout: stable_id,
                    handle,
                };
                tracing::error!("{err}");
                return Err(err.into());
            }

            self.workouts.remove(idx);
            tracing::info!("workout {} removed via shape delete", stable_id);
            return self.persist_workouts();
        }

        if let Some(idx) = self.drawings.iter().position(|r| r.id == handle) {
            self.shapes
                .remove(handle)
                .ok_or(ConsistencyError::UnknownShape(handle))?;
            self.drawings.remove(idx);
            return self.persist_shapes();
        }

        let err = ConsistencyError::UnknownShape(handle);
        tracing::error!("delete event for unknown shape: {err}");
        Err(err.into())
    }

    /// Open the edit form for a workout. Rejected while another form is
    /// pending.
    pub fn on_edit_requested(&mut self, id: &StableId) -> Result<&Workout, EngineError> {
        if self.mode != FormMode::Idle {
            return Err(EngineError::FormBusy);
        }

        let idx = self
            .workouts
            .iter()
            .position(|w| &w.stable_id == id)
            .ok_or_else(|| {
                let err = ConsistencyError::UnknownWorkout(id.clone());
                tracing::error!("edit requested for unknown workout: {err}");
                err
            })?;

        self.mode = FormMode::AwaitingEdit {
            workout: id.clone(),
        };
        Ok(&self.workouts[idx])
    }

    /// Handle a form submission.
    ///
    /// Returns the stable id of the created or edited workout on commit,
    /// `None` on cancel.
    pub fn on_form_submit(
        &mut self,
        submission: FormSubmission,
    ) -> Result<Option<StableId>, EngineError> {
        match self.mode.clone() {
            FormMode::AwaitingNewWorkout { pending } => match submission {
                FormSubmission::Commit(fields) => self.commit_new_workout(pending, &fields),
                FormSubmission::Cancel => {
                    self.shapes
                        .remove(pending)
                        .ok_or(ConsistencyError::UnknownShape(pending))?;
                    self.mode = FormMode::Idle;
                    tracing::debug!("pending creation cancelled, point {} removed", pending);
                    Ok(None)
                }
            },
            FormMode::AwaitingEdit { workout } => match submission {
                FormSubmission::Commit(fields) => self.commit_edit(&workout, &fields),
                FormSubmission::Cancel => {
                    self.mode = FormMode::Idle;
                    tracing::debug!("edit of workout {} cancelled", workout);
                    Ok(None)
                }
            },
            FormMode::Idle => Err(EngineError::NoPendingForm),
        }
    }

    fn commit_new_workout(
        &mut self,
        pending: ShapeHandle,
        fields: &crate::workouts::FormFields,
    ) -> Result<Option<StableId>, EngineError> {
        // A validation failure keeps the pending point for a retry.
        let validated = validate(fields)?;

        let coords = self
            .shapes
            .get(pending)
            .and_then(Geometry::as_point)
            .ok_or(ConsistencyError::UnknownShape(pending))?;

        // The lookup races its timeout; failure aborts the whole creation
        // rather than committing a workout with missing enrichment data.
        let enrichment = match &self.enrichment {
            Some(timed) => match timed.lookup(coords) {
                Ok(data) => Some(data),
                Err(failure) => {
                    self.shapes.remove(pending);
                    self.mode = FormMode::Idle;
                    tracing::warn!("creation aborted, enrichment failed: {failure}");
                    return Err(failure.into());
                }
            },
            None => None,
        };

        let now = Utc::now();
        let stable_id = self.next_stable_id(now);
        let workout = Workout::new(
            stable_id.clone(),
            now,
            validated.distance_km,
            validated.duration_min,
            validated.kind,
            coords,
            pending,
            enrichment,
        );

        tracing::info!("workout {} created at {}", stable_id, coords);
        self.workouts.push(workout);
        self.mode = FormMode::Idle;
        self.persist_workouts()?;
        Ok(Some(stable_id))
    }

    fn commit_edit(
        &mut self,
        id: &StableId,
        fields: &crate::workouts::FormFields,
    ) -> Result<Option<StableId>, EngineError> {
        // A validation failure keeps the edit form open.
        let validated = validate(fields)?;

        let idx = self
            .workouts
            .iter()
            .position(|w| &w.stable_id == id)
            .ok_or_else(|| {
                let err = ConsistencyError::UnknownWorkout(id.clone());
                tracing::error!("edit commit for unknown workout: {err}");
                err
            })?;

        let existing = &mut self.workouts[idx];
        if validated.kind.workout_type() == existing.workout_type() {
            // Same kind: mutate in place; the derived metric recomputes from
            // the measured fields.
            existing.distance_km = validated.distance_km;
            existing.duration_min = validated.duration_min;
            existing.kind = validated.kind;
        } else {
            // Kind switch: construct the new variant, carrying the identity
            // fields forward unchanged and re-linking the same point shape.
            let replacement = Workout::new(
                existing.stable_id.clone(),
                existing.created_at,
                validated.distance_km,
                validated.duration_min,
                validated.kind,
                existing.point,
                existing.shape_ref,
                existing.enrichment.clone(),
            );
            *existing = replacement;
        }

        tracing::info!("workout {} edited", id);
        self.mode = FormMode::Idle;
        self.persist_workouts()?;
        Ok(Some(id.clone()))
    }

    /// Delete a workout from the list, removing its backing point shape and
    /// its model entry atomically.
    pub fn on_workout_delete_requested(&mut self, id: &StableId) -> Result<(), EngineError> {
        let idx = self
            .workouts
            .iter()
            .position(|w| &w.stable_id == id)
            .ok_or_else(|| {
                let err = ConsistencyError::UnknownWorkout(id.clone());
                tracing::error!("delete requested for unknown workout: {err}");
                err
            })?;

        let handle = self.workouts[idx].shape_ref;

        // Verify both sides before mutating either.
        if self.shapes.get(handle).is_none() {
            let err = ConsistencyError::DanglingShapeRef {
                workout: id.clone(),
                handle,
            };
            tracing::error!("{err}");
            return Err(err.into());
        }

        if self.mode == (FormMode::AwaitingEdit { workout: id.clone() }) {
            self.mode = FormMode::Idle;
        }

        self.shapes.remove(handle);
        self.workouts.remove(idx);
        tracing::info!("workout {} deleted", id);
        self.persist_workouts()
    }

    /// Reorder the workout list for display and persist the new order.
    pub fn sort_workouts(&mut self, key: SortKey, order: SortOrder) -> Result<(), EngineError> {
        self.workouts.sort_by(|a, b| {
            let cmp = match key {
                SortKey::Date => a.created_at.cmp(&b.created_at),
                SortKey::Distance => a
                    .distance_km
                    .partial_cmp(&b.distance_km)
                    .unwrap_or(Ordering::Equal),
                SortKey::Duration => a
                    .duration_min
                    .partial_cmp(&b.duration_min)
                    .unwrap_or(Ordering::Equal),
                SortKey::Kind => kind_rank(a).cmp(&kind_rank(b)),
            };
            match order {
                SortOrder::Ascending => cmp,
                SortOrder::Descending => cmp.reverse(),
            }
        });
        self.persist_workouts()
    }

    /// Full reset: clear both storage keys and reinitialize to empty.
    pub fn reset(&mut self) -> Result<(), EngineError> {
        self.snapshots.clear()?;
        self.shapes.clear();
        self.workouts.clear();
        self.drawings.clear();
        self.mode = FormMode::Idle;
        self.had_snapshot_data = false;
        tracing::info!("model and storage reset");
        Ok(())
    }

    /// Verify the synchronization invariant: every workout's `shape_ref`
    /// resolves to a live point shape and every drawing record's handle
    /// resolves to its geometry.
    pub fn check_consistency(&self) -> Result<(), ConsistencyError> {
        for workout in &self.workouts {
            match self.shapes.get(workout.shape_ref) {
                Some(geometry) if geometry.is_point() => {}
                _ => {
                    return Err(ConsistencyError::DanglingShapeRef {
                        workout: workout.stable_id.clone(),
                        handle: workout.shape_ref,
                    })
                }
            }
        }
        for record in &self.drawings {
            if self.shapes.get(record.id).is_none() {
                return Err(ConsistencyError::UnknownShape(record.id));
            }
        }
        Ok(())
    }

    /// Derive a stable id from the creation instant, nudging the instant
    /// forward while the id is already taken.
    fn next_stable_id(&self, now: DateTime<Utc>) -> StableId {
        let mut instant = now;
        let mut id = StableId::from_instant(instant);
        while self.workouts.iter().any(|w| w.stable_id == id) {
            instant += chrono::Duration::milliseconds(1);
            id = StableId::from_instant(instant);
        }
        id
    }

    fn persist_workouts(&mut self) -> Result<(), EngineError> {
        self.snapshots.save_workouts(&self.workouts).map_err(|e| {
            tracing::error!("workout snapshot write failed: {e}");
            EngineError::from(e)
        })
    }

    fn persist_shapes(&mut self) -> Result<(), EngineError> {
        self.snapshots.save_shapes(&self.drawings).map_err(|e| {
            tracing::error!("shape snapshot write failed: {e}");
            EngineError::from(e)
        })
    }
}

fn kind_rank(workout: &Workout) -> u8 {
    match workout.workout_type() {
        crate::workouts::WorkoutType::Running => 0,
        crate::workouts::WorkoutType::Cycling => 1,
    }
}
