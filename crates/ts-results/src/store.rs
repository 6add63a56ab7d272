//! Report storage API.

use crate::types::{ComparisonReport, ReportManifest};
use crate::{ResultsError, ResultsResult};
use std::fs;
use std::path::{Path, PathBuf};

const REPORT_FILE: &str = "report.json";

/// Reports on disk, one directory per run id: `<root>/<run_id>/report.json`.
#[derive(Debug, Clone)]
pub struct ReportStore {
    root_dir: PathBuf,
}

impl ReportStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    /// Store kept next to a snapshot file, under `.transit-spread/reports`.
    pub fn for_snapshot(snapshot_path: &Path) -> ResultsResult<Self> {
        let snapshot_dir = snapshot_path
            .parent()
            .ok_or_else(|| ResultsError::InvalidPath {
                message: "snapshot path has no parent directory".to_string(),
            })?;
        Self::new(snapshot_dir.join(".transit-spread").join("reports"))
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn report_path(&self, run_id: &str) -> PathBuf {
        self.root_dir.join(run_id).join(REPORT_FILE)
    }

    pub fn has_report(&self, run_id: &str) -> bool {
        self.report_path(run_id).exists()
    }

    pub fn save(&self, report: &ComparisonReport) -> ResultsResult<PathBuf> {
        let run_dir = self.root_dir.join(&report.manifest.run_id);
        fs::create_dir_all(&run_dir)?;

        let path = run_dir.join(REPORT_FILE);
        fs::write(&path, serde_json::to_string_pretty(report)?)?;
        Ok(path)
    }

    pub fn load(&self, run_id: &str) -> ResultsResult<ComparisonReport> {
        let path = self.report_path(run_id);
        if !path.exists() {
            return Err(ResultsError::ReportNotFound {
                run_id: run_id.to_string(),
            });
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Manifests of the reports for `snapshot`, oldest first.
    /// Unreadable entries are skipped.
    pub fn list(&self, snapshot: &str) -> ResultsResult<Vec<ReportManifest>> {
        let mut manifests = Vec::new();

        if !self.root_dir.exists() {
            return Ok(manifests);
        }

        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            if entry.path().is_dir() {
                let run_id = entry.file_name().to_string_lossy().to_string();
                if let Ok(report) = self.load(&run_id)
                    && report.manifest.snapshot == snapshot
                {
                    manifests.push(report.manifest);
                }
            }
        }

        manifests.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.run_id.cmp(&b.run_id)));
        Ok(manifests)
    }

    pub fn delete(&self, run_id: &str) -> ResultsResult<()> {
        let run_dir = self.root_dir.join(run_id);
        if run_dir.exists() {
            fs::remove_dir_all(run_dir)?;
        }
        Ok(())
    }
}
