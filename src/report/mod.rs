//! Reporting utilities: outcome tallies and formatted terminal output.

pub mod format;

pub use format::*;

use std::collections::BTreeMap;

use crate::error::ErrorKind;
use crate::fit::SearchOutcome;

/// Aggregate view of one coordinator run.
#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeSummary {
    pub total: usize,
    pub fitted: usize,
    /// Searches that finished without any window day being scored.
    pub unscored: usize,
    pub failures: BTreeMap<ErrorKind, usize>,
    /// Mean MSE over fitted states, if any.
    pub mean_mse: Option<f64>,
}

/// Count successes and failures by kind.
pub fn summarize(outcomes: &[SearchOutcome]) -> OutcomeSummary {
    let mut failures = BTreeMap::new();
    let mut fitted = 0usize;
    let mut unscored = 0usize;
    let mut mse_sum = 0.0;
    for outcome in outcomes {
        match &outcome.result {
            Ok(ms) if ms.is_fitted() => {
                fitted += 1;
                mse_sum += ms.mse;
            }
            Ok(_) => unscored += 1,
            Err(err) => *failures.entry(err.kind()).or_insert(0) += 1,
        }
    }
    OutcomeSummary {
        total: outcomes.len(),
        fitted,
        unscored,
        failures,
        mean_mse: (fitted > 0).then(|| mse_sum / fitted as f64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MissingTarget, ModelState};
    use crate::error::ModelError;
    use chrono::NaiveDate;

    fn target(day: u32) -> MissingTarget {
        MissingTarget {
            client_id: 1,
            exercise_id: 1,
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
        }
    }

    #[test]
    fn summarize_counts_by_kind() {
        let mut ok = ModelState::unfitted(&target(3), 1);
        ok.mse = 0.04;
        let outcomes = vec![
            SearchOutcome {
                target: target(1),
                result: Err(ModelError::NumericInstability { rcond: 0.0 }),
            },
            SearchOutcome {
                target: target(2),
                result: Err(ModelError::NumericInstability { rcond: 1e-20 }),
            },
            SearchOutcome {
                target: target(3),
                result: Ok(ok),
            },
            SearchOutcome {
                target: target(4),
                result: Ok(ModelState::unfitted(&target(4), 1)),
            },
        ];

        let summary = summarize(&outcomes);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.fitted, 1);
        assert_eq!(summary.unscored, 1);
        assert_eq!(summary.failures.get(&ErrorKind::NumericInstability), Some(&2));
        assert_eq!(summary.mean_mse, Some(0.04));
    }

    #[test]
    fn empty_run_has_no_mean() {
        let summary = summarize(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.mean_mse, None);
    }
}
