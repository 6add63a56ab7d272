//! Stable indexing for dense numeric passes.
//!
//! Provides bidirectional mappings between graph ids (VertexId, EdgeId)
//! and contiguous indices (0..N). Ids survive edits with gaps; analysis code
//! wants plain vectors.

use ts_core::{EdgeId, Id, TsResult, VertexId};

use crate::error::GraphError;
use crate::graph::Graph;

/// Contiguous indices for the vertices and edges of one graph.
///
/// Indices follow id order. O(1) lookup both ways.
#[derive(Debug, Clone)]
pub struct IndexMap {
    /// Contiguous list of vertex IDs (index -> VertexId).
    vertex_ids: Vec<VertexId>,

    /// Contiguous list of edge IDs (index -> EdgeId).
    edge_ids: Vec<EdgeId>,

    /// Reverse lookup: VertexId -> index.
    /// Sized to max(VertexId.index) + 1; None for removed ids.
    vertex_to_idx: Vec<Option<usize>>,

    /// Reverse lookup: EdgeId -> index.
    edge_to_idx: Vec<Option<usize>>,
}

impl IndexMap {
    /// Build an index map from a graph.
    pub fn from_graph(graph: &Graph) -> Self {
        let vertex_ids: Vec<VertexId> = graph.vertices().map(|v| v.id).collect();
        let edge_ids: Vec<EdgeId> = graph.edges().map(|e| e.id).collect();

        Self {
            vertex_to_idx: reverse(&vertex_ids),
            edge_to_idx: reverse(&edge_ids),
            vertex_ids,
            edge_ids,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_ids.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_ids.len()
    }

    /// Get the contiguous index for a vertex ID.
    pub fn vertex_idx(&self, id: VertexId) -> TsResult<usize> {
        self.vertex_to_idx
            .get(id.index() as usize)
            .and_then(|&opt| opt)
            .ok_or_else(|| GraphError::IdNotFound { what: "VertexId" }.into())
    }

    /// Get the contiguous index for an edge ID.
    pub fn edge_idx(&self, id: EdgeId) -> TsResult<usize> {
        self.edge_to_idx
            .get(id.index() as usize)
            .and_then(|&opt| opt)
            .ok_or_else(|| GraphError::IdNotFound { what: "EdgeId" }.into())
    }

    /// Get the vertex ID for a contiguous index (panics if out of bounds).
    pub fn vertex_id(&self, i: usize) -> VertexId {
        self.vertex_ids[i]
    }

    /// Get the edge ID for a contiguous index (panics if out of bounds).
    pub fn edge_id(&self, i: usize) -> EdgeId {
        self.edge_ids[i]
    }

    pub fn vertex_ids(&self) -> &[VertexId] {
        &self.vertex_ids
    }

    pub fn edge_ids(&self) -> &[EdgeId] {
        &self.edge_ids
    }
}

fn reverse(ids: &[Id]) -> Vec<Option<usize>> {
    let len = ids.iter().map(|id| id.index() as usize + 1).max().unwrap_or(0);
    let mut to_idx = vec![None; len];
    for (i, id) in ids.iter().enumerate() {
        to_idx[id.index() as usize] = Some(i);
    }
    to_idx
}
