//! ts-records: validated snapshot records and their file format.

pub mod config;
pub mod schema;
pub mod validate;

pub use config::*;
pub use schema::*;
pub use validate::{ValidationError, validate_snapshot};

pub const LATEST_VERSION: u32 = 1;

pub type RecordsResult<T> = Result<T, RecordsError>;

#[derive(thiserror::Error, Debug)]
pub enum RecordsError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn load_yaml(path: &std::path::Path) -> RecordsResult<Snapshot> {
    let content = std::fs::read_to_string(path)?;
    let snapshot: Snapshot = serde_yaml::from_str(&content)?;
    validate_snapshot(&snapshot)?;
    Ok(snapshot)
}

pub fn save_yaml(path: &std::path::Path, snapshot: &Snapshot) -> RecordsResult<()> {
    validate_snapshot(snapshot)?;
    let content = serde_yaml::to_string(snapshot)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &std::path::Path) -> RecordsResult<Snapshot> {
    let content = std::fs::read_to_string(path)?;
    let snapshot: Snapshot = serde_json::from_str(&content)?;
    validate_snapshot(&snapshot)?;
    Ok(snapshot)
}

pub fn save_json(path: &std::path::Path, snapshot: &Snapshot) -> RecordsResult<()> {
    validate_snapshot(snapshot)?;
    let content = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load by extension: `.json` as JSON, everything else as YAML.
pub fn load_snapshot(path: &std::path::Path) -> RecordsResult<Snapshot> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => load_json(path),
        _ => load_yaml(path),
    }
}
