//! The snapshot writer: full-collection JSON blobs under two independent keys.

use crate::shapes::ShapeRecord;
use crate::storage::kv::{KeyValueStore, PersistenceFailure};
use crate::workouts::Workout;

/// Storage key for the workout collection blob.
pub const WORKOUTS_KEY: &str = "workouts";
/// Storage key for the non-point shape collection blob.
pub const SHAPES_KEY: &str = "shapes";

/// Serializes the entity model and the non-point shape collection to durable
/// storage.
///
/// Both saves are full-collection overwrites invoked synchronously after every
/// committing transition. No batching, no retry: a failed write surfaces as a
/// [`PersistenceFailure`] and the in-memory model stays authoritative.
pub struct SnapshotStore<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> SnapshotStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Overwrite the persisted workout collection.
    pub fn save_workouts(&mut self, workouts: &[Workout]) -> Result<(), PersistenceFailure> {
        let blob = serde_json::to_string(workouts)
            .map_err(|e| PersistenceFailure::Write(e.to_string()))?;
        self.store.put(WORKOUTS_KEY, &blob)
    }

    /// Overwrite the persisted non-point shape collection.
    pub fn save_shapes(&mut self, shapes: &[ShapeRecord]) -> Result<(), PersistenceFailure> {
        let blob =
            serde_json::to_string(shapes).map_err(|e| PersistenceFailure::Write(e.to_string()))?;
        self.store.put(SHAPES_KEY, &blob)
    }

    /// Load the persisted workout collection. An absent key is an empty
    /// collection, not an error.
    pub fn load_workouts(&self) -> Result<Vec<Workout>, PersistenceFailure> {
        match self.store.get(WORKOUTS_KEY)? {
            Some(blob) => {
                serde_json::from_str(&blob).map_err(|e| PersistenceFailure::Decode(e.to_string()))
            }
            None => Ok(Vec::new()),
        }
    }

    /// Load the persisted non-point shape collection. An absent key is an
    /// empty collection, not an error.
    pub fn load_shapes(&self) -> Result<Vec<ShapeRecord>, PersistenceFailure> {
        match self.store.get(SHAPES_KEY)? {
            Some(blob) => {
                serde_json::from_str(&blob).map_err(|e| PersistenceFailure::Decode(e.to_string()))
            }
            None => Ok(Vec::new()),
        }
    }

    /// Whether either key holds data.
    pub fn has_data(&self) -> Result<bool, PersistenceFailure> {
        Ok(self.store.get(WORKOUTS_KEY)?.is_some() || self.store.get(SHAPES_KEY)?.is_some())
    }

    /// Clear both keys (full reset).
    pub fn clear(&mut self) -> Result<(), PersistenceFailure> {
        self.store.delete(WORKOUTS_KEY)?;
        self.store.delete(SHAPES_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Coordinates, Geometry};
    use crate::shapes::ShapeHandle;
    use crate::storage::kv::MemoryStore;
    use crate::workouts::{StableId, Workout, WorkoutKind};
    use chrono::{TimeZone, Utc};

    fn sample_workout() -> Workout {
        let created = Utc.with_ymd_and_hms(2024, 6, 3, 10, 30, 0).unwrap();
        Workout::new(
            StableId::from_instant(created),
            created,
            5.0,
            25.0,
            WorkoutKind::Running { cadence: 170.0 },
            Coordinates::new(40.0, -8.0),
            ShapeHandle(7),
            None,
        )
    }

    #[test]
    fn test_absent_keys_load_as_empty() {
        let snapshots = SnapshotStore::new(MemoryStore::new());
        assert!(snapshots.load_workouts().unwrap().is_empty());
        assert!(snapshots.load_shapes().unwrap().is_empty());
        assert!(!snapshots.has_data().unwrap());
    }

    #[test]
    fn test_workout_blob_roundtrip() {
        let mut snapshots = SnapshotStore::new(MemoryStore::new());
        let workout = sample_workout();

        snapshots.save_workouts(std::slice::from_ref(&workout)).unwrap();
        let loaded = snapshots.load_workouts().unwrap();
        assert_eq!(loaded, vec![workout]);
    }

    #[test]
    fn test_shape_blob_roundtrip_keeps_handle_hint() {
        let mut snapshots = SnapshotStore::new(MemoryStore::new());
        let record = ShapeRecord::new(
            ShapeHandle(3),
            Geometry::Line(vec![Coordinates::new(1.0, 1.0), Coordinates::new(2.0, 2.0)]),
        );

        snapshots.save_shapes(std::slice::from_ref(&record)).unwrap();
        let loaded = snapshots.load_shapes().unwrap();
        assert_eq!(loaded, vec![record]);
    }

    #[test]
    fn test_save_is_full_overwrite() {
        let mut snapshots = SnapshotStore::new(MemoryStore::new());

        snapshots.save_workouts(&[sample_workout()]).unwrap();
        snapshots.save_workouts(&[]).unwrap();
        assert!(snapshots.load_workouts().unwrap().is_empty());
    }

    #[test]
    fn test_clear_removes_both_keys() {
        let mut snapshots = SnapshotStore::new(MemoryStore::new());
        snapshots.save_workouts(&[sample_workout()]).unwrap();
        snapshots
            .save_shapes(&[ShapeRecord::new(
                ShapeHandle(1),
                Geometry::Polygon(vec![Coordinates::new(0.0, 0.0)]),
            )])
            .unwrap();

        snapshots.clear().unwrap();
        assert!(!snapshots.has_data().unwrap());
    }
}
