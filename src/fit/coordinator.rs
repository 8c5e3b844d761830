//! Discovery of missing model states and dispatch across the worker pool.
//!
//! The coordinator does no modeling itself:
//! - ask the store which targets lack a model state
//! - run one independent search per target on a bounded rayon pool
//! - persist every successful state and hand back all outcomes
//!
//! Searches share nothing but the read-only engine and the store, so one
//! failing target never affects its siblings.

use rayon::prelude::*;
use tracing::{info, warn};

use crate::domain::{ClientId, MethodId, MissingTarget, ModelState};
use crate::error::ModelError;
use crate::fit::scanner::SlidingWindow;
use crate::store::Store;

/// Name under which sliding-window model states are registered in the store.
pub const SLIDING_WINDOW_METHOD: &str = "Sliding Window";

/// Result of the search for one target.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub target: MissingTarget,
    pub result: Result<ModelState, ModelError>,
}

impl SlidingWindow {
    /// Find, fit and persist every missing model state of `client_id`.
    ///
    /// Errors are only returned when discovery itself fails; per-target
    /// failures are reported in the returned outcomes.
    pub fn generate_client_model_states<S: Store + ?Sized>(
        &self,
        store: &S,
        client_id: ClientId,
    ) -> Result<Vec<SearchOutcome>, ModelError> {
        let method_id = store.resolve_method_id(SLIDING_WINDOW_METHOD)?;
        let targets = store
            .missing_targets(client_id, method_id)?
            .collect::<Result<Vec<_>, _>>()?;
        info!(
            client_id,
            method_id,
            targets = targets.len(),
            workers = self.workers(),
            "searching for missing model states"
        );

        let mut outcomes = self.search_targets(store, method_id, &targets)?;
        persist_outcomes(store, &mut outcomes);
        Ok(outcomes)
    }

    /// Run one search per target on a pool of `self.workers()` threads.
    ///
    /// Outcomes come back in the same order as `targets`. Nothing is persisted.
    pub fn search_targets<S: Store + ?Sized>(
        &self,
        store: &S,
        method_id: MethodId,
        targets: &[MissingTarget],
    ) -> Result<Vec<SearchOutcome>, ModelError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers())
            .thread_name(|i| format!("sliding-window-{i}"))
            .build()
            .map_err(|e| ModelError::Configuration(format!("failed to start worker pool: {e}")))?;

        let outcomes: Vec<SearchOutcome> = pool.install(|| {
            targets
                .par_iter()
                .map(|target| SearchOutcome {
                    target: *target,
                    result: self.generate_model_state(store, method_id, target),
                })
                .collect()
        });

        for outcome in &outcomes {
            if let Err(err) = &outcome.result {
                warn!(
                    client_id = outcome.target.client_id,
                    exercise_id = outcome.target.exercise_id,
                    date = %outcome.target.date,
                    error = %err,
                    "search failed"
                );
            }
        }
        Ok(outcomes)
    }
}

/// Insert every successful state, recording its id or the persist failure.
fn persist_outcomes<S: Store + ?Sized>(store: &S, outcomes: &mut [SearchOutcome]) {
    let mut persisted = 0usize;
    for outcome in outcomes.iter_mut() {
        let inserted = match &outcome.result {
            Ok(state) => store.persist_model_state(state),
            Err(_) => continue,
        };
        match inserted {
            Ok(id) => {
                if let Ok(state) = &mut outcome.result {
                    state.id = Some(id);
                }
                persisted += 1;
            }
            Err(err) => {
                warn!(
                    client_id = outcome.target.client_id,
                    exercise_id = outcome.target.exercise_id,
                    date = %outcome.target.date,
                    error = %err,
                    "failed to persist model state"
                );
                outcome.result = Err(err.into());
            }
        }
    }
    info!(persisted, total = outcomes.len(), "model states persisted");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sample::{DEFAULT_COEFFICIENTS, SampleConfig, generate_training_log};
    use crate::error::{ErrorKind, StoreError};
    use crate::store::MemoryStore;
    use chrono::NaiveDate;

    fn sample_store() -> MemoryStore {
        let rows = generate_training_log(&SampleConfig {
            client_id: 1,
            exercise_ids: vec![1, 2],
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            days: 60,
            session_interval: 2,
            points_per_session: 5,
            coefficients: DEFAULT_COEFFICIENTS,
            noise_sd: 0.01,
            seed: 8,
        })
        .unwrap();
        let mut store = MemoryStore::new();
        store.register_method(SLIDING_WINDOW_METHOD);
        store.insert_logs(rows);
        store
    }

    #[test]
    fn unregistered_method_fails_discovery() {
        let engine = SlidingWindow::new((30, 1), (10, 1), 2).unwrap();
        let store = MemoryStore::new();
        let err = engine.generate_client_model_states(&store, 1).unwrap_err();
        assert_eq!(
            err,
            ModelError::DataAccess(StoreError::UnknownMethod(SLIDING_WINDOW_METHOD.to_string()))
        );
    }

    #[test]
    fn every_target_gets_an_outcome_and_successes_are_persisted() {
        let engine = SlidingWindow::new((30, 1), (10, 1), 3).unwrap();
        let store = sample_store();

        let outcomes = engine.generate_client_model_states(&store, 1).unwrap();
        // 30 sessions per exercise, one target per session date.
        assert_eq!(outcomes.len(), 60);

        let ok: Vec<&ModelState> = outcomes.iter().filter_map(|o| o.result.as_ref().ok()).collect();
        assert!(ok.iter().any(|ms| ms.is_fitted()));
        assert!(ok.iter().all(|ms| ms.id.is_some()));
        assert_eq!(store.model_states().unwrap().len(), ok.len());

        // The earliest dates have no history inside their window.
        let first = &outcomes[0];
        assert_eq!(
            first.result.as_ref().unwrap_err().kind(),
            ErrorKind::InsufficientData
        );
    }

    #[test]
    fn second_run_only_retries_failed_targets() {
        let engine = SlidingWindow::new((30, 1), (10, 1), 2).unwrap();
        let store = sample_store();

        let first = engine.generate_client_model_states(&store, 1).unwrap();
        let failed = first.iter().filter(|o| o.result.is_err()).count();

        let second = engine.generate_client_model_states(&store, 1).unwrap();
        assert_eq!(second.len(), failed);
        assert!(second.iter().all(|o| o.result.is_err()));
    }
}
