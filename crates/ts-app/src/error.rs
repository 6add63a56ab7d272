//! Error types for the ts-app service layer.

use std::path::PathBuf;

/// Application error type that wraps errors from the backend crates
/// and gives CLI and GUI frontends one error to report.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("Snapshot validation failed: {0}")]
    Validation(String),

    #[error("Failed to read edit file: {path}")]
    EditFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid edit file {path}: {message}")]
    EditFileParse { path: PathBuf, message: String },

    #[error("Network error: {0}")]
    Network(#[from] ts_core::TsError),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Report not found: {0}")]
    ReportNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for ts-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<ts_records::RecordsError> for AppError {
    fn from(err: ts_records::RecordsError) -> Self {
        match err {
            ts_records::RecordsError::Validation(e) => AppError::Validation(e.to_string()),
            other => AppError::Snapshot(other.to_string()),
        }
    }
}

impl From<ts_results::ResultsError> for AppError {
    fn from(err: ts_results::ResultsError) -> Self {
        match err {
            ts_results::ResultsError::ReportNotFound { run_id } => AppError::ReportNotFound(run_id),
            other => AppError::Results(other.to_string()),
        }
    }
}
