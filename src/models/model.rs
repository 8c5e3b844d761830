//! The fatigue-aware intensity model.
//!
//! Intensity is predicted as a fixed linear combination of terms built from a
//! workout's reps `R`, effort `E`, sets `S` and the two fatigue measures:
//!
//! ```text
//! I = c0 - c1*Fw - c2*Fe - c3*(R-1)(S-1) - c4*(R-1)^2 + c5*E - c6*(S-1)^2
//! ```
//!
//! The model is linear in `c`, so the design row carries the signs and the
//! regression solves for the magnitudes directly.

use crate::domain::{COEFFICIENT_COUNT, DataPoint};

/// Coefficients that represent physical magnitudes and must not go negative.
pub const NON_NEGATIVE_TERMS: [usize; 4] = [0, 4, 5, 6];

/// Fill a design row for the given data point.
///
/// The row includes the constant term first (intercept).
pub fn fill_design_row(point: &DataPoint, out: &mut [f64; COEFFICIENT_COUNT]) {
    let r = point.reps - 1.0;
    let s = point.sets - 1.0;
    out[0] = 1.0;
    out[1] = -point.inter_workout_fatigue;
    out[2] = -point.inter_exercise_fatigue;
    out[3] = -(r * s);
    out[4] = -(r * r);
    out[5] = point.effort;
    out[6] = -(s * s);
}

/// Predict intensity for `point`.
///
/// Returns `None` when the prediction is not a finite number.
pub fn predict(coefficients: &[f64; COEFFICIENT_COUNT], point: &DataPoint) -> Option<f64> {
    let mut row = [0.0; COEFFICIENT_COUNT];
    fill_design_row(point, &mut row);
    let y: f64 = row.iter().zip(coefficients.iter()).map(|(x, c)| x * c).sum();
    y.is_finite().then_some(y)
}

/// Clamp the non-negative terms of a raw solve to zero.
pub fn clamp_coefficients(raw: &[f64; COEFFICIENT_COUNT]) -> [f64; COEFFICIENT_COUNT] {
    let mut out = *raw;
    for idx in NON_NEGATIVE_TERMS {
        out[idx] = out[idx].max(0.0);
    }
    out
}
