//! Incremental ordinary least squares.
//!
//! A search scans hundreds of points and re-solves the regression at every day
//! boundary, so we never keep the design matrix around. Instead we keep the
//! sufficient statistics of the normal equations:
//!
//! ```text
//! (X^T X) β = X^T y
//! ```
//!
//! and update them in place as each point arrives.
//!
//! Implementation choices:
//! - The normal matrix is tiny (7x7) and fixed-size, so we use nalgebra's
//!   stack-allocated `SMatrix` and an LU solve.
//! - Before solving we equilibrate by the diagonal so `rcond` reflects genuine
//!   collinearity rather than the raw scale of the design terms (reps² is in
//!   the tens, fatigue is below one).
//! - `rcond` is the reciprocal 1-norm condition number of the equilibrated
//!   matrix. Anything within a few orders of magnitude of machine epsilon is
//!   reported as instability instead of returning arbitrary coefficients.

use nalgebra::{SMatrix, SVector};

use crate::domain::{COEFFICIENT_COUNT, DataPoint};
use crate::error::ModelError;
use crate::models::fill_design_row;

/// Machine precision of the solve.
pub const WORKING_PRECISION: f64 = f64::EPSILON;

/// Solves with `rcond` below this are treated as singular.
pub const INSTABILITY_RCOND: f64 = 1e4 * WORKING_PRECISION;

type NormalMatrix = SMatrix<f64, COEFFICIENT_COUNT, COEFFICIENT_COUNT>;
type NormalVector = SVector<f64, COEFFICIENT_COUNT>;

/// Running sums for the fatigue-aware regression.
#[derive(Debug, Clone)]
pub struct RegressionAccumulator {
    n: usize,
    xtx: NormalMatrix,
    xty: NormalVector,
}

/// Output of a successful solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionSolution {
    pub coefficients: [f64; COEFFICIENT_COUNT],
    pub rcond: f64,
}

impl Default for RegressionAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl RegressionAccumulator {
    pub fn new() -> Self {
        Self {
            n: 0,
            xtx: NormalMatrix::zeros(),
            xty: NormalVector::zeros(),
        }
    }

    /// Number of points folded in so far.
    pub fn observations(&self) -> usize {
        self.n
    }

    /// Fold one observation into the sums.
    pub fn update(&mut self, point: &DataPoint) {
        let mut row = [0.0; COEFFICIENT_COUNT];
        fill_design_row(point, &mut row);
        let x = NormalVector::from(row);

        self.xtx += x * x.transpose();
        self.xty += x * point.intensity;
        self.n += 1;
    }

    /// Solve the normal equations accumulated so far.
    pub fn solve(&self) -> Result<RegressionSolution, ModelError> {
        let singular = |rcond: f64| ModelError::NumericInstability { rcond };

        if self.n == 0 {
            return Err(singular(0.0));
        }

        // Jacobi scaling: A_s = D^-1/2 A D^-1/2 with D = diag(A).
        let mut scale = NormalVector::zeros();
        for i in 0..COEFFICIENT_COUNT {
            let d = self.xtx[(i, i)];
            if !(d.is_finite() && d > 0.0) {
                return Err(singular(0.0));
            }
            scale[i] = 1.0 / d.sqrt();
        }
        let a = NormalMatrix::from_fn(|i, j| self.xtx[(i, j)] * scale[i] * scale[j]);
        let b = self.xty.component_mul(&scale);

        let lu = a.lu();
        let Some(inverse) = lu.try_inverse() else {
            return Err(singular(0.0));
        };

        let rcond = 1.0 / (norm1(&a) * norm1(&inverse));
        if !rcond.is_finite() || rcond < INSTABILITY_RCOND {
            return Err(singular(if rcond.is_finite() { rcond } else { 0.0 }));
        }

        let Some(z) = lu.solve(&b) else {
            return Err(singular(rcond));
        };
        let beta = z.component_mul(&scale);
        if beta.iter().any(|v| !v.is_finite()) {
            return Err(singular(rcond));
        }

        let mut coefficients = [0.0; COEFFICIENT_COUNT];
        coefficients.copy_from_slice(beta.as_slice());
        Ok(RegressionSolution {
            coefficients,
            rcond,
        })
    }
}

/// Maximum absolute column sum.
fn norm1(m: &NormalMatrix) -> f64 {
    m.column_iter()
        .map(|col| col.iter().map(|v| v.abs()).sum::<f64>())
        .fold(0.0, f64::max)
}
