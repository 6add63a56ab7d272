//! Report data types.

use serde::{Deserialize, Serialize};
use ts_core::{EdgeKind, VertexKind};
use ts_graph::{EditCommand, Graph, Origin};
use ts_records::SpreadMeasure;

pub type RunId = String;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportManifest {
    pub run_id: RunId,
    /// Name of the snapshot the baseline was built from.
    pub snapshot: String,
    pub timestamp: String,
    pub edit: EditCommand,
    pub measure: SpreadMeasure,
}

/// One simulated edit, as persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComparisonReport {
    pub manifest: ReportManifest,
    pub baseline_spread: f64,
    pub edited_spread: f64,
    pub delta: f64,
    /// Per-vertex values of the edited graph.
    pub vertices: Vec<VertexValueSnapshot>,
    /// Per-edge values of the edited graph.
    pub edges: Vec<EdgeValueSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VertexValueSnapshot {
    pub key: String,
    pub kind: VertexKind,
    /// True for vertices introduced by an edit.
    #[serde(default)]
    pub added: bool,
    pub ridership: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EdgeValueSnapshot {
    pub kind: EdgeKind,
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<String>,
    pub flow: Option<f64>,
}

/// Flatten a graph's values into key-addressed rows, in id order.
pub fn value_snapshots(graph: &Graph) -> (Vec<VertexValueSnapshot>, Vec<EdgeValueSnapshot>) {
    let vertices = graph
        .vertices()
        .map(|v| VertexValueSnapshot {
            key: v.key.clone(),
            kind: v.kind,
            added: v.origin == Origin::Edit,
            ridership: v.ridership(),
        })
        .collect();

    let key_of = |id| graph.vertex(id).map_or_else(String::new, |v| v.key.clone());
    let edges = graph
        .edges()
        .map(|e| EdgeValueSnapshot {
            kind: e.kind,
            from: key_of(e.endpoints.0),
            to: key_of(e.endpoints.1),
            lines: e
                .lines
                .iter()
                .filter_map(|&l| graph.line(l))
                .map(|l| l.key.clone())
                .collect(),
            flow: e.flow(),
        })
        .collect();

    (vertices, edges)
}
