//! Snapshot loading, validation, and introspection.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use ts_analysis::RidershipSource;
use ts_core::{EdgeKind, VertexKind};
use ts_graph::{EditCommand, Graph, GraphBuilder};
use ts_records::{AnalysisConfig, Snapshot};
use ts_sim::{Baseline, Simulator};

use crate::error::{AppError, AppResult};

/// Counts describing a snapshot's network.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotSummary {
    pub name: String,
    pub vertices: BTreeMap<VertexKind, usize>,
    pub edges: BTreeMap<EdgeKind, usize>,
    pub lines: usize,
    pub ridership_records: usize,
    pub total_ridership: f64,
}

/// Load and validate a snapshot (YAML or JSON, by extension).
pub fn load_snapshot(path: &Path) -> AppResult<Snapshot> {
    let snapshot = ts_records::load_snapshot(path)?;
    tracing::debug!(path = %path.display(), name = %snapshot.name, "loaded snapshot");
    Ok(snapshot)
}

pub fn build_graph(snapshot: &Snapshot) -> AppResult<Graph> {
    Ok(GraphBuilder::new(snapshot.config.build.clone()).build(snapshot)?)
}

/// Simulator over the snapshot's ridership, configured by `config`.
pub fn build_simulator(snapshot: &Snapshot, config: &AnalysisConfig) -> AppResult<Simulator> {
    let source = RidershipSource::from_snapshot(snapshot)?;
    Ok(Simulator::new(
        Arc::new(source),
        config.estimator.clone(),
        config.spread.clone(),
    ))
}

/// Graph, simulator and estimated baseline in one go.
pub fn build_baseline(
    snapshot: &Snapshot,
    config: &AnalysisConfig,
) -> AppResult<(Simulator, Baseline)> {
    let graph = GraphBuilder::new(config.build.clone()).build(snapshot)?;
    let simulator = build_simulator(snapshot, config)?;
    let baseline = simulator.baseline(&graph)?;
    Ok((simulator, baseline))
}

/// Build the graph and estimate it, failing on any record problem.
pub fn summarize(snapshot: &Snapshot) -> AppResult<SnapshotSummary> {
    let (_, baseline) = build_baseline(snapshot, &snapshot.config)?;
    let graph = &baseline.graph;

    let mut vertices = BTreeMap::new();
    for v in graph.vertices() {
        *vertices.entry(v.kind).or_insert(0) += 1;
    }
    let mut edges = BTreeMap::new();
    for e in graph.edges() {
        *edges.entry(e.kind).or_insert(0) += 1;
    }

    Ok(SnapshotSummary {
        name: snapshot.name.clone(),
        vertices,
        edges,
        lines: graph.line_count(),
        ridership_records: snapshot.ridership.len(),
        total_ridership: graph.vertices().filter_map(|v| v.ridership()).sum(),
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EditFile {
    Many(Vec<EditCommand>),
    One(EditCommand),
}

/// Read edits from a YAML file holding one command or a list of them.
pub fn load_edits(path: &Path) -> AppResult<Vec<EditCommand>> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::EditFileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let file: EditFile = serde_yaml::from_str(&content).map_err(|e| AppError::EditFileParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(match file {
        EditFile::Many(edits) => edits,
        EditFile::One(edit) => vec![edit],
    })
}
