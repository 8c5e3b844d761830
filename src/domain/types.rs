//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - streamed out of a store during a search
//! - exported to JSON/CSV
//! - compared in tests without touching the engine

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub type ClientId = i64;
pub type ExerciseId = i64;
pub type MethodId = i64;

/// Number of coefficients in the fatigue-aware model (intercept included).
pub const COEFFICIENT_COUNT: usize = 7;

/// One workout-log entry for a single athlete and exercise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub date: NaiveDate,
    pub intensity: f64,
    pub reps: f64,
    pub effort: f64,
    pub sets: f64,
    pub inter_workout_fatigue: f64,
    pub inter_exercise_fatigue: f64,
}

/// A data point as stored, tagged with who performed it and on what exercise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingLog {
    pub client_id: ClientId,
    pub exercise_id: ExerciseId,
    pub point: DataPoint,
}

/// A (client, exercise, date) triple that has no model state yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MissingTarget {
    pub client_id: ClientId,
    pub exercise_id: ExerciseId,
    pub date: NaiveDate,
}

/// Inclusive date range request for one client's exercise history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataPointQuery {
    pub client_id: ClientId,
    pub exercise_id: ExerciseId,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DataPointQuery {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Best-fitting model found for one target.
///
/// `coefficients` follow the term order of [`crate::models::fill_design_row`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelState {
    /// Store id, assigned once the state has been persisted.
    pub id: Option<i64>,
    pub client_id: ClientId,
    pub exercise_id: ExerciseId,
    pub date: NaiveDate,
    pub method_id: MethodId,
    pub coefficients: [f64; COEFFICIENT_COUNT],
    /// Days between the target date and the latest point read when this state was found.
    pub time_frame: i64,
    /// Days spanned by the window buckets that produced `mse`.
    pub window: i64,
    pub rcond: f64,
    pub mse: f64,
}

impl ModelState {
    /// Placeholder state every search starts from; any finite MSE replaces it.
    pub fn unfitted(target: &MissingTarget, method_id: MethodId) -> Self {
        Self {
            id: None,
            client_id: target.client_id,
            exercise_id: target.exercise_id,
            date: target.date,
            method_id,
            coefficients: [0.0; COEFFICIENT_COUNT],
            time_frame: 0,
            window: 0,
            rcond: 0.0,
            mse: f64::INFINITY,
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.mse.is_finite()
    }

    pub fn target(&self) -> MissingTarget {
        MissingTarget {
            client_id: self.client_id,
            exercise_id: self.exercise_id,
            date: self.date,
        }
    }

    /// Compare two states allowing `tol` of drift in every float field.
    pub fn approx_eq(&self, other: &ModelState, tol: f64) -> bool {
        // Equal infinities compare equal; unfitted states carry an infinite MSE.
        let close =
            |a: f64, b: f64| a == b || (a - b).abs() <= tol * (1.0 + a.abs().max(b.abs()));
        self.target() == other.target()
            && self.method_id == other.method_id
            && self.time_frame == other.time_frame
            && self.window == other.window
            && self
                .coefficients
                .iter()
                .zip(other.coefficients.iter())
                .all(|(&a, &b)| close(a, b))
            && close(self.rcond, other.rcond)
            && close(self.mse, other.mse)
    }
}

/// Whole days between two dates, regardless of order.
pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    (a - b).num_days().abs()
}

/// A full `lift fit` run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub csv_path: PathBuf,
    pub client_id: ClientId,

    /// Raw `(far, near)` day offsets; sign is ignored.
    pub time_frame: (i64, i64),
    pub window: (i64, i64),
    pub workers: usize,

    pub top_n: usize,
    pub export_csv: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn days_between_is_symmetric() {
        let a = date(2024, 1, 1);
        let b = date(2024, 3, 1);
        assert_eq!(days_between(a, b), 60);
        assert_eq!(days_between(b, a), 60);
        assert_eq!(days_between(a, a), 0);
    }

    #[test]
    fn unfitted_state_has_infinite_mse() {
        let target = MissingTarget {
            client_id: 1,
            exercise_id: 2,
            date: date(2024, 5, 5),
        };
        let ms = ModelState::unfitted(&target, 9);
        assert!(!ms.is_fitted());
        assert_eq!(ms.target(), target);
        assert_eq!(ms.method_id, 9);
        assert!(ms.approx_eq(&ModelState::unfitted(&target, 9), 1e-12));
    }

    #[test]
    fn query_bounds_are_inclusive() {
        let q = DataPointQuery {
            client_id: 1,
            exercise_id: 1,
            start: date(2024, 1, 1),
            end: date(2024, 1, 10),
        };
        assert!(q.contains(date(2024, 1, 1)));
        assert!(q.contains(date(2024, 1, 10)));
        assert!(!q.contains(date(2024, 1, 11)));
    }
}
