//! Graph construction from snapshot records.

use std::collections::HashSet;

use rayon::prelude::*;
use ts_core::{EdgeKind, Location, TsError, TsResult, VertexId, VertexKind, m, to_m};
use ts_records::{BikeStationRecord, BuildConfig, LineRecord, Snapshot, StopRecord};

use crate::graph::{Graph, Origin};
use crate::validate;

/// Builds the baseline graph from validated records.
///
/// Vertices are created first (stops, then bike stations), then route edges
/// per line, then transfer and proximity edges from the configured radii.
/// The result is checked against every graph invariant before it is returned.
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    config: BuildConfig,
}

impl GraphBuilder {
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Build from a whole snapshot. Ridership records are ignored here.
    pub fn build(&self, snapshot: &Snapshot) -> TsResult<Graph> {
        self.build_from_records(&snapshot.stops, &snapshot.bike_stations, &snapshot.lines)
    }

    #[tracing::instrument(skip_all, fields(stops = stops.len(), bikes = bike_stations.len(), lines = lines.len()))]
    pub fn build_from_records(
        &self,
        stops: &[StopRecord],
        bike_stations: &[BikeStationRecord],
        lines: &[LineRecord],
    ) -> TsResult<Graph> {
        let mut graph = Graph::new();

        for stop in stops {
            add_record_vertex(&mut graph, &stop.id, stop.mode, &stop.name, stop.location)?;
        }
        for station in bike_stations {
            add_record_vertex(
                &mut graph,
                &station.id,
                VertexKind::BikeStation,
                &station.name,
                station.location,
            )?;
        }

        let mut line_keys = HashSet::new();
        for line in lines {
            if !line_keys.insert(line.id.as_str()) {
                return Err(TsError::malformed(
                    format!("line {}", line.id),
                    "line id appears more than once",
                ));
            }
            let stops = resolve_line_stops(&graph, line)?;
            graph.register_line(line.id.clone(), line.name.clone(), stops, Origin::Snapshot)?;
        }

        let transfers = self.transfer_pairs(&graph);
        for &(a, b) in &transfers {
            graph.connect(EdgeKind::Transfer, a, b)?;
        }

        let proximity = self.proximity_pairs(&graph);
        for &(bike, stop) in &proximity {
            graph.connect(EdgeKind::Proximity, bike, stop)?;
        }

        validate::check_invariants(&graph)?;
        tracing::debug!(
            vertices = graph.vertex_count(),
            edges = graph.edge_count(),
            transfers = transfers.len(),
            proximity = proximity.len(),
            "built transit graph"
        );
        Ok(graph)
    }

    /// Pairs of co-located non-bike vertices of different kinds.
    fn transfer_pairs(&self, graph: &Graph) -> Vec<(VertexId, VertexId)> {
        let radius = m(self.config.transfer_radius_m);
        let candidates: Vec<(VertexId, VertexKind, Location)> = graph
            .vertices()
            .filter(|v| v.kind.can_join_line())
            .map(|v| (v.id, v.kind, v.location))
            .collect();

        let mut pairs: Vec<(VertexId, VertexId)> = candidates
            .par_iter()
            .enumerate()
            .flat_map_iter(|(i, &(a, kind_a, loc_a))| {
                candidates[i + 1..]
                    .iter()
                    .filter(move |&&(_, kind_b, loc_b)| {
                        kind_a != kind_b && loc_a.within(&loc_b, radius)
                    })
                    .map(move |&(b, _, _)| (a, b))
            })
            .collect();
        pairs.sort_unstable();
        pairs
    }

    /// Each bike station paired with its nearest stops inside the proximity radius.
    fn proximity_pairs(&self, graph: &Graph) -> Vec<(VertexId, VertexId)> {
        let radius = m(self.config.proximity_radius_m);
        let links = self.config.proximity_links;
        let stops: Vec<(VertexId, Location)> = graph
            .vertices()
            .filter(|v| v.kind.can_join_line())
            .map(|v| (v.id, v.location))
            .collect();
        let bikes: Vec<(VertexId, Location)> = graph
            .vertices()
            .filter(|v| v.kind == VertexKind::BikeStation)
            .map(|v| (v.id, v.location))
            .collect();

        let mut pairs: Vec<(VertexId, VertexId)> = bikes
            .par_iter()
            .flat_map_iter(|&(bike, loc)| {
                let mut near: Vec<(f64, VertexId)> = stops
                    .iter()
                    .filter(|(_, stop_loc)| loc.within(stop_loc, radius))
                    .map(|&(stop, stop_loc)| (to_m(loc.distance(&stop_loc)), stop))
                    .collect();
                near.sort_by(|x, y| x.0.total_cmp(&y.0).then(x.1.cmp(&y.1)));
                near.into_iter().take(links).map(move |(_, stop)| (bike, stop))
            })
            .collect();
        pairs.sort_unstable();
        pairs
    }
}

fn add_record_vertex(
    graph: &mut Graph,
    key: &str,
    kind: VertexKind,
    name: &str,
    location: Location,
) -> TsResult<()> {
    match graph.vertex_by_key(key) {
        // Same id, same mode: the same stop reported twice. First record wins.
        Some(existing) if existing.kind == kind => Ok(()),
        Some(existing) => {
            tracing::warn!(id = key, first = %existing.kind, second = %kind, "conflicting vertex kinds");
            Err(TsError::DuplicateVertex { id: key.to_string() })
        }
        None => {
            graph.insert_vertex(
                key.to_string(),
                kind,
                name.to_string(),
                location,
                Origin::Snapshot,
            )?;
            Ok(())
        }
    }
}

fn resolve_line_stops(graph: &Graph, line: &LineRecord) -> TsResult<Vec<VertexId>> {
    let record = || format!("line {}", line.id);
    if line.stops.len() < 2 {
        return Err(TsError::malformed(record(), "a line needs at least two stops"));
    }
    let mut resolved = Vec::with_capacity(line.stops.len());
    for key in &line.stops {
        let vertex = graph.vertex_by_key(key).ok_or_else(|| {
            TsError::malformed(record(), format!("references unknown stop {key}"))
        })?;
        if !vertex.kind.can_join_line() {
            return Err(TsError::malformed(
                record(),
                format!("{key} is a bike station and cannot be on a line"),
            ));
        }
        if resolved.last() == Some(&vertex.id) {
            return Err(TsError::malformed(
                record(),
                format!("stop {key} repeats consecutively"),
            ));
        }
        resolved.push(vertex.id);
    }
    Ok(resolved)
}
