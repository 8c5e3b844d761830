//! Shared "fit pipeline" logic behind `lift fit`.
//!
//! Keeping this in one place keeps the command handler about presentation:
//! CSV ingest -> in-memory store -> coordinator run -> fitted states

use tracing::{info, warn};

use crate::domain::{FitConfig, ModelState};
use crate::error::AppError;
use crate::fit::{SLIDING_WINDOW_METHOD, SearchOutcome, SlidingWindow};
use crate::io::ingest::{IngestedLog, load_training_log};
use crate::store::MemoryStore;

/// All computed outputs of a single `lift fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedLog,
    pub engine: SlidingWindow,
    pub outcomes: Vec<SearchOutcome>,
    /// Fitted states, with their store ids.
    pub states: Vec<ModelState>,
}

/// Execute the full pipeline and return the computed outputs.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput, AppError> {
    // Reject bad limits before touching the file system.
    let engine = SlidingWindow::new(config.time_frame, config.window, config.workers)?;

    let ingest = load_training_log(&config.csv_path)?;
    for row_error in &ingest.row_errors {
        warn!(line = row_error.line, "skipped row: {}", row_error.message);
    }
    info!(
        rows_read = ingest.rows_read,
        rows = ingest.rows.len(),
        skipped = ingest.row_errors.len(),
        path = %config.csv_path.display(),
        "training log loaded"
    );

    let mut store = MemoryStore::new();
    store.register_method(SLIDING_WINDOW_METHOD);
    store.insert_logs(ingest.rows.iter().copied());

    let outcomes = engine.generate_client_model_states(&store, config.client_id)?;
    if outcomes.is_empty() {
        return Err(AppError::new(
            3,
            format!("Client {} has no training-log dates to model.", config.client_id),
        ));
    }
    // Unscored states are persisted but carry no usable coefficients.
    let states = outcomes
        .iter()
        .filter_map(|o| o.result.as_ref().ok())
        .filter(|ms| ms.is_fitted())
        .cloned()
        .collect();

    Ok(RunOutput {
        ingest,
        engine,
        outcomes,
        states,
    })
}
