//! Training-log CSV ingest.
//!
//! Turns a workout-log export into validated `TrainingLog` rows.
//!
//! Design goals:
//! - **Declared schema**: the columns below are the whole contract
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Separation of concerns**: no modeling logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;

use crate::domain::{DataPoint, TrainingLog};
use crate::error::AppError;

/// Columns every training-log CSV must carry (header names are case-insensitive).
pub const TRAINING_LOG_COLUMNS: [&str; 9] = [
    "client_id",
    "exercise_id",
    "date",
    "intensity",
    "reps",
    "effort",
    "sets",
    "inter_workout_fatigue",
    "inter_exercise_fatigue",
];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: valid rows plus what was skipped.
#[derive(Debug, Clone)]
pub struct IngestedLog {
    pub rows: Vec<TrainingLog>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Load a training log from a CSV file on disk.
pub fn load_training_log(path: &Path) -> Result<IngestedLog, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to open CSV '{}': {e}", path.display()),
        )
    })?;
    read_training_log(file)
}

/// Parse a training log from any CSV reader.
pub fn read_training_log<R: Read>(input: R) -> Result<IngestedLog, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);
    for column in TRAINING_LOG_COLUMNS {
        if !header_map.contains_key(column) {
            return Err(AppError::new(2, format!("Missing required column: `{column}`")));
        }
    }

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header, and CSV lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let parsed = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| parse_row(&record, &header_map));
        match parsed {
            Ok(row) => rows.push(row),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    if rows.is_empty() {
        return Err(AppError::new(3, "No valid training-log rows remain after validation."));
    }

    Ok(IngestedLog {
        rows,
        row_errors,
        rows_read,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<TrainingLog, String> {
    let client_id = parse_id(get_required(record, header_map, "client_id")?, "client_id")?;
    let exercise_id = parse_id(get_required(record, header_map, "exercise_id")?, "exercise_id")?;
    let date = parse_date(get_required(record, header_map, "date")?)?;

    let value = |name: &str| -> Result<f64, String> {
        parse_f64(get_required(record, header_map, name)?, name)
    };
    let point = DataPoint {
        date,
        intensity: value("intensity")?,
        reps: value("reps")?,
        effort: value("effort")?,
        sets: value("sets")?,
        inter_workout_fatigue: value("inter_workout_fatigue")?,
        inter_exercise_fatigue: value("inter_exercise_fatigue")?,
    };
    if point.reps < 1.0 || point.sets < 1.0 {
        return Err("`reps` and `sets` must be at least 1.".to_string());
    }

    Ok(TrainingLog {
        client_id,
        exercise_id,
        point,
    })
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn parse_id(s: &str, name: &str) -> Result<i64, String> {
    s.parse::<i64>()
        .map_err(|_| format!("Invalid `{name}` '{s}': expected an integer."))
}

fn parse_f64(s: &str, name: &str) -> Result<f64, String> {
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(format!("Invalid `{name}` '{s}': expected a finite number.")),
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    // ISO dates are preferred, but a couple of common export formats are accepted.
    const FMTS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, YYYY/MM/DD, DD/MM/YYYY."
    ))
}
