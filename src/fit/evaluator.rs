//! Scoring of the current regression against the buffered window.
//!
//! Algorithm, run once per day boundary:
//!
//! 1. Solve the accumulated regression.
//! 2. For each bucket, oldest first:
//!    - predict every point's intensity and square the error
//!    - add the bucket to a running (cumulative) MSE
//!    - if that running MSE beats the best state so far, replace it
//!
//! A bucket whose prediction count differs from its point count means a
//! prediction came back non-finite; the whole search is abandoned.

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::{ModelState, days_between};
use crate::error::ModelError;
use crate::fit::window::WindowBuffer;
use crate::math::{RegressionAccumulator, RunningMse, squared_errors};
use crate::models::{clamp_coefficients, predict};

/// Re-solve and score, replacing `best` whenever a strictly lower MSE appears.
///
/// `latest` is the date of the most recently scanned point; the time-frame
/// length of a replacement state is measured from the target date to it.
/// Returns whether `best` was replaced.
pub fn evaluate(
    lr: &RegressionAccumulator,
    window: &WindowBuffer,
    latest: NaiveDate,
    best: &mut ModelState,
) -> Result<bool, ModelError> {
    let Some(first_date) = window.first_date() else {
        return Ok(false);
    };
    let solution = lr.solve()?;

    let mut running = RunningMse::default();
    let mut replaced = false;
    for bucket in window.buckets() {
        let actual: Vec<f64> = bucket.points.iter().map(|p| p.intensity).collect();
        let predicted: Vec<f64> = bucket
            .points
            .iter()
            .filter_map(|p| predict(&solution.coefficients, p))
            .collect();
        running.add(&squared_errors(&actual, &predicted)?);

        let Some(mse) = running.mean() else {
            continue;
        };
        if mse < best.mse {
            best.coefficients = clamp_coefficients(&solution.coefficients);
            best.rcond = solution.rcond;
            best.window = days_between(first_date, bucket.date);
            best.time_frame = days_between(best.date, latest);
            best.mse = mse;
            replaced = true;
            debug!(
                client_id = best.client_id,
                exercise_id = best.exercise_id,
                date = %best.date,
                window = best.window,
                time_frame = best.time_frame,
                mse,
                rcond = solution.rcond,
                "model state improved"
            );
        }
    }
    Ok(replaced)
}
