use chrono::NaiveDate;
use thiserror::Error;

/// Error surfaced by the `lift` binary, carrying the process exit code.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        let exit_code = match err.kind() {
            ErrorKind::Configuration => 2,
            ErrorKind::InsufficientData => 3,
            _ => 4,
        };
        AppError::new(exit_code, err.to_string())
    }
}

/// Failure reported by a store implementation.
///
/// The engine never inspects these beyond passing them through.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("search method '{0}' is not registered")]
    UnknownMethod(String),

    #[error("store query failed: {0}")]
    Query(String),

    #[error("failed to persist model state: {0}")]
    Persist(String),
}

/// Errors produced while building an engine or running a single search.
///
/// Every variant except `Configuration` is scoped to exactly one search.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("invalid limits: {0}")]
    Configuration(String),

    #[error(transparent)]
    DataAccess(#[from] StoreError),

    #[error("no data in selected window: date {target} window {window_far}..{window_near} days")]
    InsufficientData {
        target: NaiveDate,
        window_far: i64,
        window_near: i64,
    },

    #[error("regression is singular to working precision (rcond={rcond:e})")]
    NumericInstability { rcond: f64 },

    #[error("prediction count {predicted} does not match actual count {actual}")]
    PredictionLengthMismatch { predicted: usize, actual: usize },
}

/// Discriminant of [`ModelError`], handy for tallies and comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorKind {
    Configuration,
    DataAccess,
    InsufficientData,
    NumericInstability,
    PredictionLengthMismatch,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 5] = [
        ErrorKind::Configuration,
        ErrorKind::DataAccess,
        ErrorKind::InsufficientData,
        ErrorKind::NumericInstability,
        ErrorKind::PredictionLengthMismatch,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::DataAccess => "data access",
            ErrorKind::InsufficientData => "insufficient data",
            ErrorKind::NumericInstability => "numeric instability",
            ErrorKind::PredictionLengthMismatch => "prediction length mismatch",
        }
    }
}

impl ModelError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ModelError::Configuration(_) => ErrorKind::Configuration,
            ModelError::DataAccess(_) => ErrorKind::DataAccess,
            ModelError::InsufficientData { .. } => ErrorKind::InsufficientData,
            ModelError::NumericInstability { .. } => ErrorKind::NumericInstability,
            ModelError::PredictionLengthMismatch { .. } => ErrorKind::PredictionLengthMismatch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_pass_through_unmodified() {
        let inner = StoreError::Query("connection reset".to_string());
        let err = ModelError::from(inner.clone());
        assert_eq!(err.kind(), ErrorKind::DataAccess);
        assert_eq!(err.to_string(), inner.to_string());
        assert_eq!(err, ModelError::DataAccess(inner));
    }

    #[test]
    fn app_error_exit_codes_follow_error_kind() {
        let cfg: AppError = ModelError::Configuration("bad".into()).into();
        assert_eq!(cfg.exit_code(), 2);

        let num: AppError = ModelError::NumericInstability { rcond: 1e-20 }.into();
        assert_eq!(num.exit_code(), 4);
    }

    #[test]
    fn insufficient_data_message_cites_target_and_window() {
        let err = ModelError::InsufficientData {
            target: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            window_far: -10,
            window_near: -7,
        };
        let msg = err.to_string();
        assert!(msg.contains("2024-03-01"), "{msg}");
        assert!(msg.contains("-10..-7"), "{msg}");
    }
}
