//! Form input validation.
//!
//! A pure function of the raw numeric fields keyed by the selected kind. All
//! violations are aggregated into a single error so the caller either admits
//! the whole submission or changes nothing.

use crate::workouts::types::{WorkoutKind, WorkoutType};
use thiserror::Error;

/// Raw numeric fields as submitted by the entry form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormFields {
    /// Selected workout kind.
    pub kind: WorkoutType,
    /// Distance in kilometers.
    pub distance_km: f64,
    /// Duration in minutes.
    pub duration_min: f64,
    /// Step cadence in steps/min; required when kind is Running.
    pub cadence: Option<f64>,
    /// Elevation gain in meters; required when kind is Cycling.
    pub elevation_gain: Option<f64>,
}

impl FormFields {
    /// Fields for a running workout.
    pub fn running(distance_km: f64, duration_min: f64, cadence: f64) -> Self {
        Self {
            kind: WorkoutType::Running,
            distance_km,
            duration_min,
            cadence: Some(cadence),
            elevation_gain: None,
        }
    }

    /// Fields for a cycling workout.
    pub fn cycling(distance_km: f64, duration_min: f64, elevation_gain: f64) -> Self {
        Self {
            kind: WorkoutType::Cycling,
            distance_km,
            duration_min,
            cadence: None,
            elevation_gain: Some(elevation_gain),
        }
    }
}

/// Fields that passed validation, with the kind payload already constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedFields {
    pub distance_km: f64,
    pub duration_min: f64,
    pub kind: WorkoutKind,
}

/// A form field that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Distance,
    Duration,
    Cadence,
    ElevationGain,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::Distance => write!(f, "distance"),
            Field::Duration => write!(f, "duration"),
            Field::Cadence => write!(f, "cadence"),
            Field::ElevationGain => write!(f, "elevation gain"),
        }
    }
}

/// Aggregated validation failure; nothing was applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("inputs must be positive numbers: {}", .fields.iter().map(|f| f.to_string()).collect::<Vec<_>>().join(", "))]
pub struct ValidationError {
    /// Every field that was missing, non-finite, or not strictly positive.
    pub fields: Vec<Field>,
}

/// Validate a form submission.
///
/// Distance, duration, and the kind-discriminated field must all be present,
/// finite, and strictly positive. On success the kind payload comes back
/// ready for construction; on failure every offending field is reported at
/// once and nothing is applied.
pub fn validate(fields: &FormFields) -> Result<ValidatedFields, ValidationError> {
    let mut bad = Vec::new();

    let ok = |value: f64| value.is_finite() && value > 0.0;

    if !ok(fields.distance_km) {
        bad.push(Field::Distance);
    }
    if !ok(fields.duration_min) {
        bad.push(Field::Duration);
    }

    let kind = match fields.kind {
        WorkoutType::Running => match fields.cadence {
            Some(cadence) if ok(cadence) => Some(WorkoutKind::Running { cadence }),
            _ => {
                bad.push(Field::Cadence);
                None
            }
        },
        WorkoutType::Cycling => match fields.elevation_gain {
            Some(elevation_gain) if ok(elevation_gain) => {
                Some(WorkoutKind::Cycling { elevation_gain })
            }
            _ => {
                bad.push(Field::ElevationGain);
                None
            }
        },
    };

    match kind {
        Some(kind) if bad.is_empty() => Ok(ValidatedFields {
            distance_km: fields.distance_km,
            duration_min: fields.duration_min,
            kind,
        }),
        _ => Err(ValidationError { fields: bad }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_running_fields() {
        let validated = validate(&FormFields::running(5.0, 25.0, 170.0)).unwrap();
        assert_eq!(validated.kind, WorkoutKind::Running { cadence: 170.0 });
        assert_eq!(validated.distance_km, 5.0);
    }

    #[test]
    fn test_valid_cycling_fields() {
        let validated = validate(&FormFields::cycling(20.0, 60.0, 300.0)).unwrap();
        assert_eq!(
            validated.kind,
            WorkoutKind::Cycling {
                elevation_gain: 300.0
            }
        );
    }

    #[test]
    fn test_negative_distance_rejected() {
        let err = validate(&FormFields::running(-1.0, 25.0, 170.0)).unwrap_err();
        assert_eq!(err.fields, vec![Field::Distance]);
    }

    #[test]
    fn test_violations_aggregate() {
        let err = validate(&FormFields::running(-1.0, 0.0, f64::NAN)).unwrap_err();
        assert_eq!(
            err.fields,
            vec![Field::Distance, Field::Duration, Field::Cadence]
        );
    }

    #[test]
    fn test_missing_discriminated_field_rejected() {
        let fields = FormFields {
            kind: WorkoutType::Cycling,
            distance_km: 20.0,
            duration_min: 60.0,
            cadence: None,
            elevation_gain: None,
        };
        let err = validate(&fields).unwrap_err();
        assert_eq!(err.fields, vec![Field::ElevationGain]);
    }

    #[test]
    fn test_infinite_input_rejected() {
        let err = validate(&FormFields::cycling(f64::INFINITY, 60.0, 300.0)).unwrap_err();
        assert_eq!(err.fields, vec![Field::Distance]);
    }

    #[test]
    fn test_cadence_only_checked_for_running() {
        // A cycling submission may leave cadence empty.
        let fields = FormFields::cycling(20.0, 60.0, 300.0);
        assert_eq!(fields.cadence, None);
        assert!(validate(&fields).is_ok());
    }
}
