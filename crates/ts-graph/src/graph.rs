//! Core graph data structures.

use std::collections::{BTreeMap, BTreeSet};

use ts_core::{
    EdgeId, EdgeKind, IdAllocator, LineId, Location, Real, TsError, TsResult, VertexId,
    VertexKind,
};

use crate::error::GraphError;

/// Where a vertex or line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Built from the snapshot records.
    Snapshot,
    /// Introduced by an edit.
    Edit,
}

/// A stop, surface line, or bike docking station.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub id: VertexId,
    /// External record identifier. Unique among live vertices.
    pub key: String,
    pub kind: VertexKind,
    pub name: String,
    pub location: Location,
    pub origin: Origin,
    pub(crate) ridership: Option<Real>,
}

impl Vertex {
    /// Estimated ridership, `None` until the estimator has run on this graph.
    pub fn ridership(&self) -> Option<Real> {
        self.ridership
    }
}

/// A direct connection between two vertices.
///
/// Edges are undirected; `endpoints` is stored low id first.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: EdgeId,
    pub endpoints: (VertexId, VertexId),
    pub kind: EdgeKind,
    /// Lines contributing to a route-adjacency edge. Empty for other kinds.
    pub lines: BTreeSet<LineId>,
    pub(crate) flow: Option<Real>,
}

impl Edge {
    pub fn flow(&self) -> Option<Real> {
        self.flow
    }

    pub fn touches(&self, v: VertexId) -> bool {
        self.endpoints.0 == v || self.endpoints.1 == v
    }

    /// The endpoint that isn't `v`, if `v` is an endpoint.
    pub fn other(&self, v: VertexId) -> Option<VertexId> {
        if self.endpoints.0 == v {
            Some(self.endpoints.1)
        } else if self.endpoints.1 == v {
            Some(self.endpoints.0)
        } else {
            None
        }
    }
}

/// A registered ordered stop sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub id: LineId,
    pub key: String,
    pub name: String,
    pub stops: Vec<VertexId>,
    pub origin: Origin,
}

impl Line {
    /// Consecutive stop pairs in line order.
    pub fn segments(&self) -> impl Iterator<Item = (VertexId, VertexId)> + '_ {
        self.stops.windows(2).map(|w| (w[0], w[1]))
    }
}

/// Trace of a vertex removed by an edit.
#[derive(Debug, Clone, PartialEq)]
pub struct Tombstone {
    pub key: String,
    pub kind: VertexKind,
    /// Keys of the vertex's neighbours at the moment it was removed.
    pub neighbours: Vec<String>,
}

/// Lookup key for the at-most-one-edge-per-kind-and-pair rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct EdgeKey {
    pub kind: EdgeKind,
    pub lo: VertexId,
    pub hi: VertexId,
}

impl EdgeKey {
    pub fn new(kind: EdgeKind, a: VertexId, b: VertexId) -> Self {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        Self { kind, lo, hi }
    }
}

/// Ridership and flow values for every vertex and edge of a graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Estimates {
    pub ridership: BTreeMap<VertexId, Real>,
    pub flow: BTreeMap<EdgeId, Real>,
}

/// The transit network: arenas of vertices, edges and lines keyed by ids
/// that are never reused, plus the indexes that keep keys and edge pairs unique.
///
/// Copying a graph is a plain `clone()`; the baseline and any number of edited
/// copies never share mutable state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Graph {
    pub(crate) vertices: BTreeMap<VertexId, Vertex>,
    pub(crate) edges: BTreeMap<EdgeId, Edge>,
    pub(crate) lines: BTreeMap<LineId, Line>,

    pub(crate) vertex_keys: BTreeMap<String, VertexId>,
    pub(crate) line_keys: BTreeMap<String, LineId>,
    pub(crate) edge_index: BTreeMap<EdgeKey, EdgeId>,

    pub(crate) tombstones: BTreeMap<String, Tombstone>,
    pub(crate) retired_lines: BTreeSet<String>,

    pub(crate) vertex_ids: IdAllocator,
    pub(crate) edge_ids: IdAllocator,
    pub(crate) line_ids: IdAllocator,

    /// Bumped by every successful edit.
    pub(crate) revision: u64,
}

impl Graph {
    /// An empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// All vertices, in id order.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.values()
    }

    /// All edges, in id order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// All lines, in registration order.
    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.lines.values()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(&id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    pub fn line(&self, id: LineId) -> Option<&Line> {
        self.lines.get(&id)
    }

    pub fn vertex_by_key(&self, key: &str) -> Option<&Vertex> {
        self.vertex_keys.get(key).and_then(|id| self.vertices.get(id))
    }

    pub fn line_by_key(&self, key: &str) -> Option<&Line> {
        self.line_keys.get(key).and_then(|id| self.lines.get(id))
    }

    /// Resolve a key, failing with `UnknownVertex`.
    pub fn require_vertex(&self, key: &str) -> TsResult<&Vertex> {
        self.vertex_by_key(key).ok_or_else(|| TsError::UnknownVertex {
            id: key.to_string(),
        })
    }

    /// The edge of `kind` between `a` and `b`, in either order.
    pub fn edge_between(&self, kind: EdgeKind, a: VertexId, b: VertexId) -> Option<&Edge> {
        self.edge_index
            .get(&EdgeKey::new(kind, a, b))
            .and_then(|id| self.edges.get(id))
    }

    /// Edges touching `v`, in edge id order. Linear in the edge count.
    pub fn incident_edges(&self, v: VertexId) -> impl Iterator<Item = &Edge> {
        self.edges.values().filter(move |e| e.touches(v))
    }

    /// Vertex → incident edge ids, built in one pass.
    pub fn adjacency(&self) -> BTreeMap<VertexId, Vec<EdgeId>> {
        let mut adj: BTreeMap<VertexId, Vec<EdgeId>> =
            self.vertices.keys().map(|&v| (v, Vec::new())).collect();
        for edge in self.edges.values() {
            for v in [edge.endpoints.0, edge.endpoints.1] {
                adj.entry(v).or_default().push(edge.id);
            }
        }
        adj
    }

    pub fn tombstone(&self, key: &str) -> Option<&Tombstone> {
        self.tombstones.get(key)
    }

    /// Tombstones of vertices removed by edits, ordered by key.
    pub fn tombstones(&self) -> impl Iterator<Item = &Tombstone> {
        self.tombstones.values()
    }

    pub fn is_retired_line(&self, key: &str) -> bool {
        self.retired_lines.contains(key)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether every vertex and edge carries an estimate.
    pub fn is_estimated(&self) -> bool {
        self.vertices.values().all(|v| v.ridership.is_some())
            && self.edges.values().all(|e| e.flow.is_some())
    }

    /// Copy of this graph carrying `estimates`.
    ///
    /// Every vertex and edge must be covered, with finite non-negative values;
    /// entries for ids not in the graph are rejected.
    pub fn with_estimates(&self, estimates: Estimates) -> TsResult<Graph> {
        let mut graph = self.clone();
        for (id, vertex) in graph.vertices.iter_mut() {
            let value = estimates.ridership.get(id).copied().ok_or_else(|| {
                TsError::NotEstimated {
                    id: vertex.key.clone(),
                }
            })?;
            if !value.is_finite() || value < 0.0 {
                return Err(GraphError::BadEstimate {
                    what: "ridership",
                    id: vertex.key.clone(),
                }
                .into());
            }
            vertex.ridership = Some(value);
        }
        for (id, edge) in graph.edges.iter_mut() {
            let value = estimates.flow.get(id).copied().ok_or_else(|| TsError::Invariant {
                what: format!("no flow estimate for edge {id}"),
            })?;
            if !value.is_finite() || value < 0.0 {
                return Err(GraphError::BadEstimate {
                    what: "flow",
                    id: id.to_string(),
                }
                .into());
            }
            edge.flow = Some(value);
        }
        if estimates.ridership.len() != graph.vertices.len()
            || estimates.flow.len() != graph.edges.len()
        {
            return Err(TsError::Invariant {
                what: "estimates reference ids outside the graph".to_string(),
            });
        }
        Ok(graph)
    }

    /// Drop every estimate. Structure changes make them stale.
    pub(crate) fn clear_estimates(&mut self) {
        for v in self.vertices.values_mut() {
            v.ridership = None;
        }
        for e in self.edges.values_mut() {
            e.flow = None;
        }
    }

    pub(crate) fn insert_vertex(
        &mut self,
        key: String,
        kind: VertexKind,
        name: String,
        location: Location,
        origin: Origin,
    ) -> TsResult<VertexId> {
        if self.vertex_keys.contains_key(&key) {
            return Err(TsError::DuplicateVertex { id: key });
        }
        let id = self.vertex_ids.allocate()?;
        self.tombstones.remove(&key);
        self.vertex_keys.insert(key.clone(), id);
        self.vertices.insert(
            id,
            Vertex {
                id,
                key,
                kind,
                name,
                location,
                origin,
                ridership: None,
            },
        );
        Ok(id)
    }

    /// Get or create the edge of `kind` between `a` and `b`. Returns its id.
    pub(crate) fn connect(
        &mut self,
        kind: EdgeKind,
        a: VertexId,
        b: VertexId,
    ) -> TsResult<EdgeId> {
        if a == b {
            return Err(TsError::Invariant {
                what: format!("refusing to create a self-loop on vertex {a}"),
            });
        }
        for v in [a, b] {
            if !self.vertices.contains_key(&v) {
                return Err(TsError::Invariant {
                    what: format!("refusing to connect missing vertex {v}"),
                });
            }
        }
        let key = EdgeKey::new(kind, a, b);
        if let Some(&id) = self.edge_index.get(&key) {
            return Ok(id);
        }
        let id = self.edge_ids.allocate()?;
        self.edge_index.insert(key, id);
        self.edges.insert(
            id,
            Edge {
                id,
                endpoints: (key.lo, key.hi),
                kind,
                lines: BTreeSet::new(),
                flow: None,
            },
        );
        Ok(id)
    }

    /// Register a line over existing vertices and lay its route edges.
    ///
    /// Callers have already checked the stop list; a consecutive pair
    /// already joined by another line's route edge gains this line as a
    /// contributor instead of getting a second edge.
    pub(crate) fn register_line(
        &mut self,
        key: String,
        name: String,
        stops: Vec<VertexId>,
        origin: Origin,
    ) -> TsResult<LineId> {
        let id = self.line_ids.allocate()?;
        for w in stops.windows(2) {
            let edge_id = self.connect(EdgeKind::RouteAdjacency, w[0], w[1])?;
            if let Some(edge) = self.edges.get_mut(&edge_id) {
                edge.lines.insert(id);
            }
        }
        self.retired_lines.remove(&key);
        self.line_keys.insert(key.clone(), id);
        self.lines.insert(
            id,
            Line {
                id,
                key,
                name,
                stops,
                origin,
            },
        );
        Ok(id)
    }

    /// Remove a vertex and every edge touching it, then close the gap it
    /// leaves in each line: the stops on either side get a route edge
    /// credited to that line. Returns the tombstone that was recorded.
    pub(crate) fn remove_vertex(&mut self, id: VertexId) -> TsResult<Tombstone> {
        let vertex = self
            .vertices
            .remove(&id)
            .ok_or(GraphError::IdNotFound { what: "vertex" })?;
        self.vertex_keys.remove(&vertex.key);

        let incident: Vec<EdgeId> = self
            .edges
            .values()
            .filter(|e| e.touches(id))
            .map(|e| e.id)
            .collect();
        let mut neighbours = BTreeSet::new();
        for edge_id in incident {
            if let Some(edge) = self.edges.remove(&edge_id) {
                self.edge_index
                    .remove(&EdgeKey::new(edge.kind, edge.endpoints.0, edge.endpoints.1));
                if let Some(other) = edge.other(id).and_then(|o| self.vertices.get(&o)) {
                    neighbours.insert(other.key.clone());
                }
            }
        }

        let mut rejoined: Vec<(LineId, Vec<VertexId>)> = Vec::new();
        for line in self.lines.values_mut() {
            if !line.stops.contains(&id) {
                continue;
            }
            line.stops.retain(|&s| s != id);
            // [A, B, A] without B is just A.
            line.stops.dedup();
            rejoined.push((line.id, line.stops.clone()));
        }
        for (line_id, stops) in rejoined {
            for w in stops.windows(2) {
                let edge_id = self.connect(EdgeKind::RouteAdjacency, w[0], w[1])?;
                if let Some(edge) = self.edges.get_mut(&edge_id) {
                    edge.lines.insert(line_id);
                }
            }
        }

        let tombstone = Tombstone {
            key: vertex.key.clone(),
            kind: vertex.kind,
            neighbours: neighbours.into_iter().collect(),
        };
        self.tombstones.insert(vertex.key, tombstone.clone());
        Ok(tombstone)
    }

    /// Unregister a line. Route edges it shares with other lines survive;
    /// edges it alone contributed are deleted. Returns how many were deleted.
    pub(crate) fn remove_line(&mut self, id: LineId) -> Option<usize> {
        let line = self.lines.remove(&id)?;
        self.line_keys.remove(&line.key);
        self.retired_lines.insert(line.key);

        let mut orphaned = Vec::new();
        for edge in self.edges.values_mut() {
            if edge.lines.remove(&id) && edge.lines.is_empty() {
                orphaned.push(edge.id);
            }
        }
        for edge_id in &orphaned {
            if let Some(edge) = self.edges.remove(edge_id) {
                self.edge_index
                    .remove(&EdgeKey::new(edge.kind, edge.endpoints.0, edge.endpoints.1));
            }
        }
        Some(orphaned.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(graph: &mut Graph, key: &str) -> VertexId {
        graph
            .insert_vertex(
                key.to_string(),
                VertexKind::SubwayStop,
                key.to_string(),
                Location::default(),
                Origin::Snapshot,
            )
            .unwrap()
    }

    #[test]
    fn edge_key_is_unordered() {
        let mut graph = Graph::new();
        let a = vertex(&mut graph, "A");
        let b = vertex(&mut graph, "B");
        assert_eq!(
            EdgeKey::new(EdgeKind::Transfer, a, b),
            EdgeKey::new(EdgeKind::Transfer, b, a)
        );
        assert_ne!(
            EdgeKey::new(EdgeKind::Transfer, a, b),
            EdgeKey::new(EdgeKind::Proximity, a, b)
        );
    }

    #[test]
    fn connect_is_idempotent_per_kind() {
        let mut graph = Graph::new();
        let a = vertex(&mut graph, "A");
        let b = vertex(&mut graph, "B");
        let e1 = graph.connect(EdgeKind::Transfer, a, b).unwrap();
        let e2 = graph.connect(EdgeKind::Transfer, b, a).unwrap();
        let e3 = graph.connect(EdgeKind::Proximity, a, b).unwrap();
        assert_eq!(e1, e2);
        assert_ne!(e1, e3);
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.connect(EdgeKind::Transfer, a, a).is_err());
    }

    #[test]
    fn remove_vertex_cascades_and_records_neighbours() {
        let mut graph = Graph::new();
        let a = vertex(&mut graph, "A");
        let b = vertex(&mut graph, "B");
        let c = vertex(&mut graph, "C");
        graph
            .register_line("L".into(), "L".into(), vec![a, b, c], Origin::Snapshot)
            .unwrap();

        let tomb = graph.remove_vertex(b).unwrap();
        assert_eq!(tomb.neighbours, vec!["A".to_string(), "C".to_string()]);
        assert_eq!(graph.line_by_key("L").unwrap().stops, vec![a, c]);
        assert_eq!(graph.edge_count(), 1);
        let bridge = graph.edge_between(EdgeKind::RouteAdjacency, a, c).unwrap();
        assert_eq!(bridge.lines.len(), 1);
        assert!(graph.tombstone("B").is_some());
        assert!(graph.vertex_by_key("B").is_none());
    }

    #[test]
    fn removing_a_loop_stop_collapses_the_line() {
        let mut graph = Graph::new();
        let a = vertex(&mut graph, "A");
        let b = vertex(&mut graph, "B");
        graph
            .register_line("L".into(), "L".into(), vec![a, b, a], Origin::Snapshot)
            .unwrap();

        graph.remove_vertex(b).unwrap();
        assert_eq!(graph.line_by_key("L").unwrap().stops, vec![a]);
        assert_eq!(graph.edge_count(), 0);
        assert!(matches!(
            graph.remove_vertex(b),
            Err(TsError::Invariant { .. })
        ));
    }

    #[test]
    fn shared_edge_survives_line_removal() {
        let mut graph = Graph::new();
        let a = vertex(&mut graph, "A");
        let b = vertex(&mut graph, "B");
        let c = vertex(&mut graph, "C");
        let l1 = graph
            .register_line("1".into(), "One".into(), vec![a, b, c], Origin::Snapshot)
            .unwrap();
        graph
            .register_line("2".into(), "Two".into(), vec![b, c], Origin::Snapshot)
            .unwrap();
        assert_eq!(graph.edge_count(), 2);

        assert_eq!(graph.remove_line(l1), Some(1));
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.edge_between(EdgeKind::RouteAdjacency, b, c).is_some());
        assert!(graph.is_retired_line("1"));
    }

    #[test]
    fn ids_are_not_reused() {
        let mut graph = Graph::new();
        let a = vertex(&mut graph, "A");
        graph.remove_vertex(a).unwrap();
        let a2 = vertex(&mut graph, "A");
        assert_ne!(a, a2);
        assert!(graph.tombstone("A").is_none());
    }

    #[test]
    fn with_estimates_requires_full_coverage() {
        let mut graph = Graph::new();
        let a = vertex(&mut graph, "A");
        let b = vertex(&mut graph, "B");
        let e = graph.connect(EdgeKind::Transfer, a, b).unwrap();

        let mut estimates = Estimates::default();
        estimates.ridership.insert(a, 1.0);
        assert!(matches!(
            graph.with_estimates(estimates.clone()),
            Err(TsError::NotEstimated { .. })
        ));

        estimates.ridership.insert(b, 2.0);
        estimates.flow.insert(e, 0.5);
        let estimated = graph.with_estimates(estimates.clone()).unwrap();
        assert!(estimated.is_estimated());
        assert!(!graph.is_estimated());

        estimates.ridership.insert(b, -2.0);
        assert!(graph.with_estimates(estimates).is_err());
    }
}
