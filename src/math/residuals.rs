//! Squared-error helpers shared by the evaluator and reports.

use crate::error::ModelError;

/// Element-wise squared error between `actual` and `predicted`.
///
/// Mismatched lengths mean a prediction was lost upstream, so the pair cannot
/// be scored at all.
pub fn squared_errors(actual: &[f64], predicted: &[f64]) -> Result<Vec<f64>, ModelError> {
    if actual.len() != predicted.len() {
        return Err(ModelError::PredictionLengthMismatch {
            predicted: predicted.len(),
            actual: actual.len(),
        });
    }
    Ok(actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p) * (a - p))
        .collect())
}

/// Running mean of squared errors over several batches.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningMse {
    sum_sq: f64,
    count: usize,
}

impl RunningMse {
    pub fn add(&mut self, squared: &[f64]) {
        self.sum_sq += squared.iter().sum::<f64>();
        self.count += squared.len();
    }

    /// `None` until at least one value has been added.
    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum_sq / self.count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn squared_errors_require_equal_lengths() {
        let err = squared_errors(&[1.0, 2.0], &[1.0]).unwrap_err();
        assert_eq!(
            err,
            ModelError::PredictionLengthMismatch {
                predicted: 1,
                actual: 2
            }
        );
    }

    #[test]
    fn running_mse_is_cumulative() {
        let mut mse = RunningMse::default();
        assert_eq!(mse.mean(), None);

        mse.add(&squared_errors(&[1.0, 2.0], &[0.0, 2.0]).unwrap());
        assert_eq!(mse.mean(), Some(0.5));

        mse.add(&squared_errors(&[3.0], &[1.0]).unwrap());
        assert!((mse.mean().unwrap() - 5.0 / 3.0).abs() < 1e-12);
    }
}
