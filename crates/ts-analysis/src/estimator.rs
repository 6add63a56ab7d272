//! Ridership estimation over a (possibly edited) graph.
//!
//! Vertex ridership comes straight from the records attributed to each
//! vertex. Edits are reflected two ways: ridership recorded at a removed
//! station moves to the neighbours it had, and a station added by an edit
//! takes a share of each route neighbour's ridership. Edge flow is then
//! derived from vertex ridership and the line totals.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use ts_core::{EdgeKind, LineId, Real, TsError, TsResult, VertexId, VertexKind};
use ts_graph::{Estimates, Graph, IndexMap, Origin};
use ts_records::{DisplacementPolicy, EstimatorConfig, RidershipKind, RidershipRecord};

use crate::ridership::RidershipSource;

/// Where a ridership record lands in a given graph.
#[derive(Debug, Clone, PartialEq)]
enum Target {
    Vertex(VertexId),
    Line(LineId),
    /// Recorded at a station an edit removed.
    Displaced(String),
    /// Recorded against a line an edit removed.
    Retired,
}

/// Assigns ridership to every vertex and flow to every edge.
#[derive(Debug, Clone, Default)]
pub struct RidershipEstimator {
    config: EstimatorConfig,
}

impl RidershipEstimator {
    pub fn new(config: EstimatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Estimated copy of `graph`. `graph` itself is not touched.
    ///
    /// Fails with `UnresolvedReference` on the first record whose target is
    /// neither in the graph nor removed from it by an edit.
    #[tracing::instrument(skip_all, fields(revision = graph.revision(), records = source.len()))]
    pub fn estimate(&self, graph: &Graph, source: &RidershipSource) -> TsResult<Graph> {
        let index = IndexMap::from_graph(graph);
        let mut ridership = vec![0.0; index.vertex_count()];
        let mut recorded = vec![false; index.vertex_count()];
        let mut line_totals: BTreeMap<LineId, Real> = BTreeMap::new();
        let mut displaced: BTreeMap<String, Real> = BTreeMap::new();

        for record in source.records() {
            match resolve(graph, record)? {
                Target::Vertex(v) => {
                    let i = index.vertex_idx(v)?;
                    ridership[i] += record.count;
                    recorded[i] = true;
                }
                Target::Line(l) => *line_totals.entry(l).or_insert(0.0) += record.count,
                Target::Displaced(key) => *displaced.entry(key).or_insert(0.0) += record.count,
                Target::Retired => {}
            }
        }

        self.absorb_displaced(graph, &index, &displaced, &mut ridership)?;
        self.capture_for_new_stations(graph, &index, &recorded, &mut ridership)?;

        let mut flow = vec![0.0; index.edge_count()];
        allocate_line_flow(graph, &index, &line_totals, &ridership, &mut flow)?;
        self.local_flow(graph, &index, &ridership, &mut flow)?;

        let estimates = Estimates {
            ridership: index.vertex_ids().iter().copied().zip(ridership).collect(),
            flow: index.edge_ids().iter().copied().zip(flow).collect(),
        };
        let estimated = graph.with_estimates(estimates)?;
        tracing::debug!(
            lines = line_totals.len(),
            displaced = displaced.len(),
            "ridership estimated"
        );
        Ok(estimated)
    }

    /// Move ridership recorded at removed stations onto their surviving
    /// neighbours. A neighbour that was itself removed passes the share on to
    /// its own neighbours, so a run of removals still lands on live stations.
    fn absorb_displaced(
        &self,
        graph: &Graph,
        index: &IndexMap,
        displaced: &BTreeMap<String, Real>,
        ridership: &mut [Real],
    ) -> TsResult<()> {
        for (key, &amount) in displaced {
            if self.config.displacement == DisplacementPolicy::Drop {
                tracing::debug!(station = %key, amount, "displaced ridership dropped");
                continue;
            }
            let survivors = surviving_neighbours(graph, key);
            if survivors.is_empty() {
                tracing::warn!(
                    station = %key,
                    amount,
                    "removed station has no surviving neighbours; its ridership is lost"
                );
                continue;
            }
            let share = amount / survivors.len() as Real;
            for v in survivors {
                ridership[index.vertex_idx(v)?] += share;
            }
        }
        Ok(())
    }

    /// Each edit-added station with no records of its own takes a fraction of
    /// every route neighbour's ridership, in vertex id order.
    fn capture_for_new_stations(
        &self,
        graph: &Graph,
        index: &IndexMap,
        recorded: &[bool],
        ridership: &mut [Real],
    ) -> TsResult<()> {
        let capture = self.config.new_station_capture;
        let adjacency = graph.adjacency();
        for vertex in graph.vertices() {
            let i = index.vertex_idx(vertex.id)?;
            if vertex.origin != Origin::Edit || recorded[i] {
                continue;
            }
            let neighbours: BTreeSet<VertexId> = adjacency
                .get(&vertex.id)
                .into_iter()
                .flatten()
                .filter_map(|&e| graph.edge(e))
                .filter(|e| e.kind == EdgeKind::RouteAdjacency)
                .filter_map(|e| e.other(vertex.id))
                .collect();
            for n in neighbours {
                let j = index.vertex_idx(n)?;
                let taken = ridership[j] * capture;
                ridership[j] -= taken;
                ridership[i] += taken;
            }
        }
        Ok(())
    }

    /// Proximity and transfer edges.
    fn local_flow(
        &self,
        graph: &Graph,
        index: &IndexMap,
        ridership: &[Real],
        flow: &mut [Real],
    ) -> TsResult<()> {
        let mut proximity_degree: BTreeMap<VertexId, usize> = BTreeMap::new();
        for edge in graph.edges().filter(|e| e.kind == EdgeKind::Proximity) {
            if let Some(bike) = bike_end(graph, edge.endpoints) {
                *proximity_degree.entry(bike).or_insert(0) += 1;
            }
        }

        for edge in graph.edges() {
            let (a, b) = edge.endpoints;
            let value = match edge.kind {
                EdgeKind::RouteAdjacency => continue,
                EdgeKind::Transfer => {
                    let ra = ridership[index.vertex_idx(a)?];
                    let rb = ridership[index.vertex_idx(b)?];
                    self.config.transfer_share * ra.min(rb)
                }
                EdgeKind::Proximity => match bike_end(graph, edge.endpoints) {
                    Some(bike) => {
                        let degree = proximity_degree.get(&bike).copied().unwrap_or(1);
                        ridership[index.vertex_idx(bike)?] / degree as Real
                    }
                    None => 0.0,
                },
            };
            flow[index.edge_idx(edge.id)?] = value;
        }
        Ok(())
    }
}

fn resolve(graph: &Graph, record: &RidershipRecord) -> TsResult<Target> {
    let key = record.target.as_str();
    let as_vertex = || {
        if let Some(v) = graph.vertex_by_key(key) {
            Some(Target::Vertex(v.id))
        } else {
            graph
                .tombstone(key)
                .map(|_| Target::Displaced(key.to_string()))
        }
    };
    let as_line = || {
        if let Some(l) = graph.line_by_key(key) {
            Some(Target::Line(l.id))
        } else {
            graph.is_retired_line(key).then_some(Target::Retired)
        }
    };

    let found = if record.kind == RidershipKind::LineTotal {
        as_line().or_else(as_vertex)
    } else {
        as_vertex().or_else(as_line)
    };
    found.ok_or_else(|| TsError::UnresolvedReference {
        id: key.to_string(),
    })
}

/// Live vertices reached from the tombstone `key` by walking through
/// neighbours that are tombstoned too.
fn surviving_neighbours(graph: &Graph, key: &str) -> BTreeSet<VertexId> {
    let mut survivors = BTreeSet::new();
    let mut seen: BTreeSet<&str> = BTreeSet::from([key]);
    let mut queue = VecDeque::from([key]);
    while let Some(current) = queue.pop_front() {
        let Some(tombstone) = graph.tombstone(current) else {
            continue;
        };
        for neighbour in &tombstone.neighbours {
            if let Some(vertex) = graph.vertex_by_key(neighbour) {
                survivors.insert(vertex.id);
            } else if seen.insert(neighbour.as_str()) {
                queue.push_back(neighbour.as_str());
            }
        }
    }
    survivors
}

/// Spread each line's total across the route edges it still contributes to,
/// weighted by the ridership at both ends of each segment.
fn allocate_line_flow(
    graph: &Graph,
    index: &IndexMap,
    line_totals: &BTreeMap<LineId, Real>,
    ridership: &[Real],
    flow: &mut [Real],
) -> TsResult<()> {
    for line in graph.lines() {
        let total = line_totals.get(&line.id).copied().unwrap_or(0.0);
        if total == 0.0 {
            continue;
        }

        let mut seen = BTreeSet::new();
        let mut segments: Vec<(usize, Real)> = Vec::new();
        for (a, b) in line.segments() {
            let Some(edge) = graph.edge_between(EdgeKind::RouteAdjacency, a, b) else {
                continue;
            };
            if !edge.lines.contains(&line.id) || !seen.insert(edge.id) {
                continue;
            }
            let weight = ridership[index.vertex_idx(a)?] + ridership[index.vertex_idx(b)?];
            segments.push((index.edge_idx(edge.id)?, weight));
        }

        if segments.is_empty() {
            tracing::debug!(line = %line.key, total, "line has no route edges left");
            continue;
        }
        let weight_sum: Real = segments.iter().map(|(_, w)| w).sum();
        let count = segments.len() as Real;
        for (i, weight) in segments {
            flow[i] += if weight_sum > 0.0 {
                total * weight / weight_sum
            } else {
                total / count
            };
        }
    }
    Ok(())
}

fn bike_end(graph: &Graph, (a, b): (VertexId, VertexId)) -> Option<VertexId> {
    [a, b]
        .into_iter()
        .find(|&v| graph.vertex(v).is_some_and(|v| v.kind == VertexKind::BikeStation))
}
