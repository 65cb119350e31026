//! Workout entity types and derived metrics.

use crate::enrich::Enrichment;
use crate::geometry::Coordinates;
use crate::shapes::ShapeHandle;
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Stable workout identifier, derived from the creation instant.
///
/// The id is the last 10 digits of the creation instant in Unix milliseconds.
/// Unlike a shape handle it survives process restarts and is the key used for
/// persistence and equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StableId(String);

impl StableId {
    /// Derive an id from a creation instant.
    pub fn from_instant(instant: DateTime<Utc>) -> Self {
        let millis = instant.timestamp_millis().unsigned_abs();
        Self(format!("{:010}", millis % 10_000_000_000))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Workout kind selector, as it appears on the entry form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutType {
    Running,
    Cycling,
}

impl std::fmt::Display for WorkoutType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkoutType::Running => write!(f, "Running"),
            WorkoutType::Cycling => write!(f, "Cycling"),
        }
    }
}

/// Kind discriminator plus the kind-specific measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkoutKind {
    /// Running with step cadence in steps/min.
    Running { cadence: f64 },
    /// Cycling with total elevation gain in meters.
    Cycling { elevation_gain: f64 },
}

impl WorkoutKind {
    /// The form-level kind selector for this variant.
    pub fn workout_type(&self) -> WorkoutType {
        match self {
            WorkoutKind::Running { .. } => WorkoutType::Running,
            WorkoutKind::Cycling { .. } => WorkoutType::Cycling,
        }
    }
}

/// Metric derived from the measured fields, keyed by kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DerivedMetric {
    /// Running pace in minutes per kilometer.
    Pace { min_per_km: f64 },
    /// Cycling speed in kilometers per hour.
    Speed { km_per_h: f64 },
}

/// Compute the derived metric for a kind and the measured fields.
///
/// Pace = duration / distance for running; speed = distance / (duration / 60)
/// for cycling.
pub fn derived_metric(kind: WorkoutType, distance_km: f64, duration_min: f64) -> DerivedMetric {
    match kind {
        WorkoutType::Running => DerivedMetric::Pace {
            min_per_km: duration_min / distance_km,
        },
        WorkoutType::Cycling => DerivedMetric::Speed {
            km_per_h: distance_km / (duration_min / 60.0),
        },
    }
}

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// A recorded workout, backed by exactly one live point shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    /// Stable identifier, immutable once assigned.
    pub stable_id: StableId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Measured distance in kilometers (> 0).
    pub distance_km: f64,
    /// Measured duration in minutes (> 0).
    pub duration_min: f64,
    /// Kind discriminator plus kind-specific measurement.
    #[serde(flatten)]
    pub kind: WorkoutKind,
    /// Location of the backing point marker.
    pub point: Coordinates,
    /// Transient handle of the backing point shape. A hint when persisted,
    /// rewritten during reconciliation.
    pub shape_ref: ShapeHandle,
    /// Display label, derived from kind and creation date, possibly enriched
    /// with a reverse-geocoded location.
    pub label: String,
    /// Opaque enrichment payload, if a provider was configured at creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrichment: Option<Enrichment>,
}

impl Workout {
    /// Create a workout with a fresh identity.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        stable_id: StableId,
        created_at: DateTime<Utc>,
        distance_km: f64,
        duration_min: f64,
        kind: WorkoutKind,
        point: Coordinates,
        shape_ref: ShapeHandle,
        enrichment: Option<Enrichment>,
    ) -> Self {
        let label = describe(kind.workout_type(), created_at, enrichment.as_ref());
        Self {
            stable_id,
            created_at,
            distance_km,
            duration_min,
            kind,
            point,
            shape_ref,
            label,
            enrichment,
        }
    }

    /// The form-level kind selector.
    pub fn workout_type(&self) -> WorkoutType {
        self.kind.workout_type()
    }

    /// The derived metric for the current measured fields.
    pub fn derived_metric(&self) -> DerivedMetric {
        derived_metric(self.workout_type(), self.distance_km, self.duration_min)
    }

    /// Recompute the label after a kind switch or enrichment change.
    pub fn refresh_label(&mut self) {
        self.label = describe(self.workout_type(), self.created_at, self.enrichment.as_ref());
    }
}

/// Build the display label for a workout.
///
/// "Running on June 3", or "Running in Coimbra on June 3" when the enrichment
/// payload carries a reverse-geocoded location.
pub fn describe(
    kind: WorkoutType,
    created_at: DateTime<Utc>,
    enrichment: Option<&Enrichment>,
) -> String {
    let month = MONTHS[created_at.month0() as usize];
    match enrichment.and_then(|e| e.location.as_deref()) {
        Some(location) => format!("{} in {} on {} {}", kind, location, month, created_at.day()),
        None => format!("{} on {} {}", kind, month, created_at.day()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn running(distance: f64, duration: f64, cadence: f64) -> Workout {
        let created = Utc.with_ymd_and_hms(2024, 6, 3, 10, 30, 0).unwrap();
        Workout::new(
            StableId::from_instant(created),
            created,
            distance,
            duration,
            WorkoutKind::Running { cadence },
            Coordinates::new(40.0, -8.0),
            ShapeHandle(1),
            None,
        )
    }

    #[test]
    fn test_running_pace() {
        let workout = running(5.0, 25.0, 170.0);
        assert_eq!(
            workout.derived_metric(),
            DerivedMetric::Pace { min_per_km: 5.0 }
        );
    }

    #[test]
    fn test_pace_recomputes_after_distance_edit() {
        let mut workout = running(5.0, 25.0, 170.0);
        workout.distance_km = 10.0;
        assert_eq!(
            workout.derived_metric(),
            DerivedMetric::Pace { min_per_km: 2.5 }
        );
    }

    #[test]
    fn test_cycling_speed() {
        assert_eq!(
            derived_metric(WorkoutType::Cycling, 20.0, 60.0),
            DerivedMetric::Speed { km_per_h: 20.0 }
        );
    }

    #[test]
    fn test_label_from_kind_and_date() {
        let workout = running(5.0, 25.0, 170.0);
        assert_eq!(workout.label, "Running on June 3");
    }

    #[test]
    fn test_label_with_enriched_location() {
        let created = Utc.with_ymd_and_hms(2024, 6, 3, 10, 30, 0).unwrap();
        let enrichment = Enrichment {
            location: Some("Coimbra".to_string()),
            weather: None,
        };
        let label = describe(WorkoutType::Cycling, created, Some(&enrichment));
        assert_eq!(label, "Cycling in Coimbra on June 3");
    }

    #[test]
    fn test_stable_id_is_ten_digits_of_millis() {
        let created = Utc.with_ymd_and_hms(2024, 6, 3, 10, 30, 0).unwrap();
        let id = StableId::from_instant(created);
        assert_eq!(id.as_str().len(), 10);
        assert_eq!(
            id.as_str(),
            &format!("{:010}", created.timestamp_millis() % 10_000_000_000)
        );
    }

    #[test]
    fn test_serialized_form_flattens_kind() {
        let workout = running(5.0, 25.0, 170.0);
        let json = serde_json::to_value(&workout).unwrap();
        assert_eq!(json["kind"], "running");
        assert_eq!(json["cadence"], 170.0);
        assert_eq!(json["distance_km"], 5.0);

        let back: Workout = serde_json::from_value(json).unwrap();
        assert_eq!(back, workout);
    }
}
