//! Integration tests for snapshot reconciliation across process restarts.
//!
//! Each "session" opens the same on-disk database, mutates the model, and
//! drops the router; the next session must rebuild the same workouts and
//! geometries with fresh shape handles consistently substituted.

use maptrail::geometry::{Coordinates, Geometry};
use maptrail::router::{EventRouter, FormSubmission, ShapeEvent};
use maptrail::storage::Database;
use maptrail::workouts::{FormFields, StableId};
use std::collections::HashSet;
use std::path::Path;

fn open_router(path: &Path) -> EventRouter<Database> {
    EventRouter::new(Database::open(path).unwrap()).unwrap()
}

fn point(lat: f64, lng: f64) -> Geometry {
    Geometry::Point(Coordinates::new(lat, lng))
}

#[test]
fn test_roundtrip_substitutes_fresh_handles_consistently() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("maptrail.db");

    let line = Geometry::Line(vec![Coordinates::new(1.0, 1.0), Coordinates::new(2.0, 2.0)]);
    let (run, ride, old_refs) = {
        let mut router = open_router(&path);

        // Drawing the line first shifts the workout handles, so the reload
        // (workouts first) assigns observably different values.
        router
            .on_shape_event(ShapeEvent::Created {
                geometry: line.clone(),
            })
            .unwrap();

        router
            .on_shape_event(ShapeEvent::Created {
                geometry: point(40.0, -8.0),
            })
            .unwrap();
        let run = router
            .on_form_submit(FormSubmission::Commit(FormFields::running(5.0, 25.0, 170.0)))
            .unwrap()
            .unwrap();

        router
            .on_shape_event(ShapeEvent::Created {
                geometry: point(41.0, -7.0),
            })
            .unwrap();
        let ride = router
            .on_form_submit(FormSubmission::Commit(FormFields::cycling(20.0, 60.0, 300.0)))
            .unwrap()
            .unwrap();

        let old_refs: Vec<_> = router.workouts().iter().map(|w| w.shape_ref).collect();
        (run, ride, old_refs)
    };

    let router = open_router(&path);
    assert!(router.had_snapshot_data());

    // Same workouts by stable id.
    let ids: HashSet<StableId> = router
        .workouts()
        .iter()
        .map(|w| w.stable_id.clone())
        .collect();
    assert_eq!(ids, HashSet::from([run.clone(), ride.clone()]));

    // Same geometries, resolved through rewritten handles.
    for workout in router.workouts() {
        assert_eq!(
            router.shapes().get(workout.shape_ref),
            Some(&Geometry::Point(workout.point))
        );
    }
    let restored_run = router
        .workouts()
        .iter()
        .find(|w| w.stable_id == run)
        .unwrap();
    assert_eq!(restored_run.point, Coordinates::new(40.0, -8.0));

    // Handle values differ from the pre-save ones.
    let new_refs: Vec<_> = router.workouts().iter().map(|w| w.shape_ref).collect();
    assert_ne!(old_refs, new_refs);

    // The non-point record came back with a resolvable rewritten id.
    assert_eq!(router.drawings().len(), 1);
    assert_eq!(router.drawings()[0].geometry, line);
    assert_eq!(
        router.shapes().get(router.drawings()[0].id),
        Some(&line)
    );

    router.check_consistency().unwrap();
}

#[test]
fn test_edits_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("maptrail.db");

    let id = {
        let mut router = open_router(&path);
        router
            .on_shape_event(ShapeEvent::Created {
                geometry: point(40.0, -8.0),
            })
            .unwrap();
        let id = router
            .on_form_submit(FormSubmission::Commit(FormFields::running(5.0, 25.0, 170.0)))
            .unwrap()
            .unwrap();

        router.on_edit_requested(&id).unwrap();
        router
            .on_form_submit(FormSubmission::Commit(FormFields::cycling(20.0, 60.0, 300.0)))
            .unwrap();
        id
    };

    let router = open_router(&path);
    let workout = &router.workouts()[0];
    assert_eq!(workout.stable_id, id);
    assert_eq!(workout.distance_km, 20.0);
    assert_eq!(workout.kind, maptrail::WorkoutKind::Cycling { elevation_gain: 300.0 });
}

#[test]
fn test_reset_clears_storage_across_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("maptrail.db");

    {
        let mut router = open_router(&path);
        router
            .on_shape_event(ShapeEvent::Created {
                geometry: point(40.0, -8.0),
            })
            .unwrap();
        router
            .on_form_submit(FormSubmission::Commit(FormFields::running(5.0, 25.0, 170.0)))
            .unwrap();
        router.reset().unwrap();
    }

    let router = open_router(&path);
    assert!(!router.had_snapshot_data());
    assert!(router.workouts().is_empty());
    assert!(router.drawings().is_empty());
}
