//! Graph invariant checks.

use std::collections::BTreeMap;

use ts_core::{EdgeKind, TsResult};

use crate::error::GraphError;
use crate::graph::{EdgeKey, Graph};

/// Check every structural invariant of `graph`:
/// referential integrity, no self-loops, at most one edge per kind and pair,
/// route edges backed by registered lines, and index/arena agreement.
pub fn check_invariants(graph: &Graph) -> TsResult<()> {
    check_vertices(graph)?;
    check_edges(graph)?;
    check_lines(graph)?;
    Ok(())
}

fn check_vertices(graph: &Graph) -> TsResult<()> {
    if graph.vertex_keys.len() != graph.vertices.len() {
        let key = graph
            .vertices
            .values()
            .find(|v| graph.vertex_keys.get(&v.key) != Some(&v.id))
            .map_or_else(String::new, |v| v.key.clone());
        return Err(GraphError::KeyIndexMismatch { key }.into());
    }
    for (key, id) in &graph.vertex_keys {
        match graph.vertices.get(id) {
            Some(v) if &v.key == key => {}
            _ => return Err(GraphError::KeyIndexMismatch { key: key.clone() }.into()),
        }
    }
    for id in graph.vertices.keys() {
        if id.index() >= graph.vertex_ids.issued() {
            return Err(GraphError::IdNotIssued { what: "Vertex" }.into());
        }
    }
    Ok(())
}

fn check_edges(graph: &Graph) -> TsResult<()> {
    let mut seen: BTreeMap<EdgeKey, _> = BTreeMap::new();

    for edge in graph.edges.values() {
        let (a, b) = edge.endpoints;
        if edge.id.index() >= graph.edge_ids.issued() {
            return Err(GraphError::IdNotIssued { what: "Edge" }.into());
        }
        if a == b {
            return Err(GraphError::SelfLoop {
                edge: edge.id,
                vertex: a,
            }
            .into());
        }
        for v in [a, b] {
            if !graph.vertices.contains_key(&v) {
                return Err(GraphError::DanglingEdge {
                    edge: edge.id,
                    vertex: v,
                }
                .into());
            }
        }

        let key = EdgeKey::new(edge.kind, a, b);
        if let Some(&existing) = seen.get(&key) {
            return Err(GraphError::DuplicateEdge {
                edge: edge.id,
                existing,
            }
            .into());
        }
        seen.insert(key, edge.id);
        if graph.edge_index.get(&key) != Some(&edge.id) {
            return Err(GraphError::EdgeIndexMismatch { edge: edge.id }.into());
        }

        if edge.kind == EdgeKind::RouteAdjacency && edge.lines.is_empty() {
            return Err(GraphError::OrphanRouteEdge { edge: edge.id }.into());
        }
        for line in &edge.lines {
            if !graph.lines.contains_key(line) {
                return Err(GraphError::UnknownContributor {
                    edge: edge.id,
                    line: *line,
                }
                .into());
            }
        }
    }

    if graph.edge_index.len() != graph.edges.len() {
        let stray = graph
            .edge_index
            .values()
            .find(|id| !graph.edges.contains_key(id))
            .copied();
        if let Some(edge) = stray {
            return Err(GraphError::EdgeIndexMismatch { edge }.into());
        }
    }
    Ok(())
}

fn check_lines(graph: &Graph) -> TsResult<()> {
    for line in graph.lines.values() {
        for &stop in &line.stops {
            if !graph.vertices.contains_key(&stop) {
                return Err(GraphError::DanglingLineStop {
                    line: line.id,
                    vertex: stop,
                }
                .into());
            }
        }
        if graph.line_keys.get(&line.key) != Some(&line.id) {
            return Err(GraphError::KeyIndexMismatch {
                key: line.key.clone(),
            }
            .into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Origin;
    use ts_core::{Location, TsError, VertexKind};

    fn two_stop_graph() -> Graph {
        let mut graph = Graph::new();
        let a = graph
            .insert_vertex(
                "A".into(),
                VertexKind::SubwayStop,
                "A".into(),
                Location::default(),
                Origin::Snapshot,
            )
            .unwrap();
        let b = graph
            .insert_vertex(
                "B".into(),
                VertexKind::SubwayStop,
                "B".into(),
                Location::default(),
                Origin::Snapshot,
            )
            .unwrap();
        graph
            .register_line("L".into(), "L".into(), vec![a, b], Origin::Snapshot)
            .unwrap();
        graph
    }

    #[test]
    fn validate_empty_graph() {
        assert!(check_invariants(&Graph::new()).is_ok());
    }

    #[test]
    fn validate_consistent_graph() {
        assert!(check_invariants(&two_stop_graph()).is_ok());
    }

    #[test]
    fn detects_dangling_edge() {
        let mut graph = two_stop_graph();
        let a = graph.vertex_by_key("A").unwrap().id;
        // Bypass the cascading removal.
        graph.vertices.remove(&a);
        graph.vertex_keys.remove("A");

        let err = check_invariants(&graph).unwrap_err();
        assert!(matches!(err, TsError::Invariant { .. }));
        assert!(err.to_string().contains("non-existent vertex"));
    }

    #[test]
    fn detects_orphan_route_edge() {
        let mut graph = two_stop_graph();
        for edge in graph.edges.values_mut() {
            edge.lines.clear();
        }
        let err = check_invariants(&graph).unwrap_err();
        assert!(err.to_string().contains("no contributing line"));
    }
}
