//! Export model states and training logs.
//!
//! CSV exports are meant to be easy to consume in spreadsheets or downstream
//! scripts; the JSON export is the full serde representation of each state.

use std::fs::File;
use std::path::Path;

use crate::domain::{ModelState, TrainingLog};
use crate::error::AppError;
use crate::io::ingest::TRAINING_LOG_COLUMNS;

/// Columns of the model-state CSV export, in order.
pub const MODEL_STATE_COLUMNS: [&str; 16] = [
    "id",
    "client_id",
    "exercise_id",
    "date",
    "method_id",
    "c0",
    "c1",
    "c2",
    "c3",
    "c4",
    "c5",
    "c6",
    "time_frame",
    "window",
    "rcond",
    "mse",
];

/// Write model states to a CSV file.
pub fn write_model_states_csv(path: &Path, states: &[ModelState]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    writer
        .write_record(MODEL_STATE_COLUMNS)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for ms in states {
        let mut record = vec![
            ms.id.map(|id| id.to_string()).unwrap_or_default(),
            ms.client_id.to_string(),
            ms.exercise_id.to_string(),
            ms.date.to_string(),
            ms.method_id.to_string(),
        ];
        record.extend(ms.coefficients.iter().map(|c| format!("{c:.10}")));
        record.push(ms.time_frame.to_string());
        record.push(ms.window.to_string());
        record.push(format!("{:e}", ms.rcond));
        record.push(format!("{:.10}", ms.mse));

        writer
            .write_record(&record)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Write model states as a pretty-printed JSON array.
pub fn write_model_states_json(path: &Path, states: &[ModelState]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, states)
        .map_err(|e| AppError::new(2, format!("Failed to write export JSON: {e}")))?;
    Ok(())
}

/// Read model states back from a JSON export.
pub fn read_model_states_json(path: &Path) -> Result<Vec<ModelState>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open model-state JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file)
        .map_err(|e| AppError::new(2, format!("Invalid model-state JSON: {e}")))
}

/// Write a training log in the format `ingest` reads.
pub fn write_training_log_csv(path: &Path, rows: &[TrainingLog]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create CSV '{}': {e}", path.display())))?;

    writer
        .write_record(TRAINING_LOG_COLUMNS)
        .map_err(|e| AppError::new(2, format!("Failed to write CSV header: {e}")))?;

    for row in rows {
        let p = &row.point;
        writer
            .write_record([
                row.client_id.to_string(),
                row.exercise_id.to_string(),
                p.date.to_string(),
                p.intensity.to_string(),
                p.reps.to_string(),
                p.effort.to_string(),
                p.sets.to_string(),
                p.inter_workout_fatigue.to_string(),
                p.inter_exercise_fatigue.to_string(),
            ])
            .map_err(|e| AppError::new(2, format!("Failed to write CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush CSV: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MissingTarget;
    use chrono::NaiveDate;

    fn state() -> ModelState {
        let target = MissingTarget {
            client_id: 7,
            exercise_id: 2,
            date: NaiveDate::from_ymd_opt(2024, 8, 1).unwrap(),
        };
        let mut ms = ModelState::unfitted(&target, 1);
        ms.id = Some(3);
        ms.coefficients = [0.9, 0.1, 0.0, 0.01, 0.02, 0.03, 0.0];
        ms.window = 4;
        ms.time_frame = 9;
        ms.rcond = 1.5e-4;
        ms.mse = 0.0025;
        ms
    }

    #[test]
    fn json_export_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("states.json");
        write_model_states_json(&path, &[state()]).unwrap();
        let back = read_model_states_json(&path).unwrap();
        assert_eq!(back, vec![state()]);
    }

    #[test]
    fn csv_export_has_declared_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("states.csv");
        write_model_states_csv(&path, &[state()]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), MODEL_STATE_COLUMNS.join(","));
        let row: Vec<&str> = lines.next().unwrap().split(',').collect();
        assert_eq!(row.len(), MODEL_STATE_COLUMNS.len());
        assert_eq!(row[0], "3");
        assert_eq!(row[3], "2024-08-01");
        assert_eq!(row[13], "4");
    }
}
