//! Simulation execution with report caching.

use std::path::{Path, PathBuf};

use ts_graph::EditCommand;
use ts_records::{AnalysisConfig, SpreadConfig};
use ts_results::{ComparisonReport, ReportManifest, ReportStore, value_snapshots};
use ts_sim::Comparison;

use crate::error::AppResult;
use crate::snapshot_service;

#[derive(Debug, Clone)]
pub struct SimulationOptions {
    /// Reuse a stored report with the same run id instead of recomputing.
    pub use_cache: bool,
    /// Write the report to the snapshot's report store.
    pub persist: bool,
    /// Replaces the snapshot's own spread configuration.
    pub spread: Option<SpreadConfig>,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            persist: true,
            spread: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimulationRequest<'a> {
    pub snapshot_path: &'a Path,
    pub edit: EditCommand,
    pub options: SimulationOptions,
}

#[derive(Debug, Clone)]
pub struct SimulationResponse {
    pub run_id: String,
    pub report: ComparisonReport,
    pub loaded_from_cache: bool,
    /// Where the report was written, when it was.
    pub report_path: Option<PathBuf>,
}

/// Simulate one edit against the snapshot at `request.snapshot_path`.
pub fn run_simulation(request: &SimulationRequest) -> AppResult<SimulationResponse> {
    let snapshot = snapshot_service::load_snapshot(request.snapshot_path)?;
    let config = effective_config(&snapshot.config, &request.options);
    let run_id = ts_results::compute_run_id(&snapshot, &request.edit, &config);

    let store = ReportStore::for_snapshot(request.snapshot_path)?;
    if request.options.use_cache && store.has_report(&run_id) {
        tracing::info!(%run_id, "using cached report");
        let report = store.load(&run_id)?;
        return Ok(SimulationResponse {
            run_id,
            report,
            loaded_from_cache: true,
            report_path: None,
        });
    }

    let (simulator, baseline) = snapshot_service::build_baseline(&snapshot, &config)?;
    let comparison = simulator.simulate(&baseline, &request.edit)?;
    let report = build_report(&run_id, &snapshot.name, &config, &comparison);

    let report_path = if request.options.persist {
        Some(store.save(&report)?)
    } else {
        None
    };

    Ok(SimulationResponse {
        run_id,
        report,
        loaded_from_cache: false,
        report_path,
    })
}

/// Persistable form of a comparison, stamped with the current time.
pub fn build_report(
    run_id: &str,
    snapshot_name: &str,
    config: &AnalysisConfig,
    comparison: &Comparison,
) -> ComparisonReport {
    let (vertices, edges) = value_snapshots(&comparison.graph);
    ComparisonReport {
        manifest: ReportManifest {
            run_id: run_id.to_string(),
            snapshot: snapshot_name.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            edit: comparison.edit.clone(),
            measure: config.spread.measure,
        },
        baseline_spread: comparison.baseline_spread,
        edited_spread: comparison.edited_spread,
        delta: comparison.delta,
        vertices,
        edges,
    }
}

pub fn list_reports(snapshot_path: &Path) -> AppResult<Vec<ReportManifest>> {
    let snapshot = snapshot_service::load_snapshot(snapshot_path)?;
    let store = ReportStore::for_snapshot(snapshot_path)?;
    Ok(store.list(&snapshot.name)?)
}

pub fn load_report(snapshot_path: &Path, run_id: &str) -> AppResult<ComparisonReport> {
    let store = ReportStore::for_snapshot(snapshot_path)?;
    Ok(store.load(run_id)?)
}

fn effective_config(config: &AnalysisConfig, options: &SimulationOptions) -> AnalysisConfig {
    let mut config = config.clone();
    if let Some(spread) = &options.spread {
        config.spread = spread.clone();
    }
    config
}
