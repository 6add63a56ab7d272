//! ts-results: comparison reports and their on-disk store.

pub mod hash;
pub mod store;
pub mod types;

pub use hash::compute_run_id;
pub use store::ReportStore;
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Report not found: {run_id}")]
    ReportNotFound { run_id: String },

    #[error("Invalid path: {message}")]
    InvalidPath { message: String },
}
