//! Content-based hashing for run IDs.

use sha2::{Digest, Sha256};
use ts_graph::EditCommand;
use ts_records::{AnalysisConfig, Snapshot};

/// Same snapshot, edit and configuration give the same id.
pub fn compute_run_id(snapshot: &Snapshot, edit: &EditCommand, config: &AnalysisConfig) -> String {
    let mut hasher = Sha256::new();

    let snapshot_json = serde_json::to_string(snapshot).unwrap_or_default();
    hasher.update(snapshot_json.as_bytes());

    let edit_json = serde_json::to_string(edit).unwrap_or_default();
    hasher.update(edit_json.as_bytes());

    let config_json = serde_json::to_string(config).unwrap_or_default();
    hasher.update(config_json.as_bytes());

    let result = hasher.finalize();
    format!("{:x}", result)
}
