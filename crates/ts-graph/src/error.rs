//! Graph invariant violations.

use ts_core::{EdgeId, LineId, TsError, VertexId};

/// Structural inconsistencies found by `validate::check_invariants`.
///
/// These indicate a bug in graph construction or editing, never bad input:
/// input problems are reported as `TsError` variants directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// An edge refers to a vertex that doesn't exist.
    DanglingEdge { edge: EdgeId, vertex: VertexId },

    /// An edge connects a vertex to itself.
    SelfLoop { edge: EdgeId, vertex: VertexId },

    /// Two edges of the same kind join the same pair.
    DuplicateEdge { edge: EdgeId, existing: EdgeId },

    /// A route-adjacency edge with no contributing line.
    OrphanRouteEdge { edge: EdgeId },

    /// An edge names a line that isn't registered.
    UnknownContributor { edge: EdgeId, line: LineId },

    /// A line's stop list references a missing vertex.
    DanglingLineStop { line: LineId, vertex: VertexId },

    /// Key index and arena disagree.
    KeyIndexMismatch { key: String },

    /// Edge lookup index and edge arena disagree.
    EdgeIndexMismatch { edge: EdgeId },

    /// An id at or above the allocator's high-water mark.
    IdNotIssued { what: &'static str },

    /// An id not present in an index map.
    IdNotFound { what: &'static str },

    /// Estimated value that is negative or not finite.
    BadEstimate { what: &'static str, id: String },
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::DanglingEdge { edge, vertex } => {
                write!(f, "Edge {} refers to non-existent vertex {}", edge, vertex)
            }
            GraphError::SelfLoop { edge, vertex } => {
                write!(f, "Edge {} loops on vertex {}", edge, vertex)
            }
            GraphError::DuplicateEdge { edge, existing } => {
                write!(f, "Edge {} duplicates edge {}", edge, existing)
            }
            GraphError::OrphanRouteEdge { edge } => {
                write!(f, "Route edge {} has no contributing line", edge)
            }
            GraphError::UnknownContributor { edge, line } => {
                write!(f, "Edge {} names unregistered line {}", edge, line)
            }
            GraphError::DanglingLineStop { line, vertex } => {
                write!(f, "Line {} lists non-existent vertex {}", line, vertex)
            }
            GraphError::KeyIndexMismatch { key } => {
                write!(f, "Key index entry '{}' doesn't match the arena", key)
            }
            GraphError::EdgeIndexMismatch { edge } => {
                write!(f, "Edge {} is missing from the edge index", edge)
            }
            GraphError::IdNotIssued { what } => {
                write!(f, "{} id was never issued by the allocator", what)
            }
            GraphError::IdNotFound { what } => write!(f, "{} not found in index", what),
            GraphError::BadEstimate { what, id } => {
                write!(f, "{} on {} is negative or not finite", what, id)
            }
        }
    }
}

impl std::error::Error for GraphError {}

impl From<GraphError> for TsError {
    fn from(err: GraphError) -> Self {
        TsError::Invariant {
            what: err.to_string(),
        }
    }
}
