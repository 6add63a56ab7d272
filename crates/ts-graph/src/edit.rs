//! Structural edits: add/remove a station or a line.
//!
//! Every edit runs against a private copy of the caller's graph. The copy is
//! returned only after the whole edit succeeded and the invariants were
//! re-checked, so a failed edit leaves nothing behind.

use serde::{Deserialize, Serialize};
use ts_core::{Location, TsError, TsResult, VertexId, VertexKind, midpoint};

use crate::graph::{Graph, Origin, Vertex};
use crate::validate;

/// Description of a station to add.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StationSpec {
    pub key: String,
    pub kind: VertexKind,
    #[serde(default)]
    pub name: String,
    /// Explicit position. When absent, the station is placed at the running
    /// midpoint of the `near` stations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub near: Vec<String>,
}

impl StationSpec {
    pub fn new(key: impl Into<String>, kind: VertexKind, location: Location) -> Self {
        let key = key.into();
        Self {
            name: key.clone(),
            key,
            kind,
            location: Some(location),
            near: Vec::new(),
        }
    }

    /// The spec that would re-create `vertex` as it is now.
    pub fn of(vertex: &Vertex) -> Self {
        Self {
            key: vertex.key.clone(),
            kind: vertex.kind,
            name: vertex.name.clone(),
            location: Some(vertex.location),
            near: Vec::new(),
        }
    }
}

/// One structural edit, as issued by a frontend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditCommand {
    AddStation(StationSpec),
    RemoveStation {
        key: String,
    },
    AddLine {
        key: String,
        #[serde(default)]
        name: String,
        stops: Vec<String>,
    },
    RemoveLine {
        key: String,
    },
}

impl EditCommand {
    /// Short human-readable form for logs and reports.
    pub fn describe(&self) -> String {
        match self {
            EditCommand::AddStation(spec) => format!("add station {} ({})", spec.key, spec.kind),
            EditCommand::RemoveStation { key } => format!("remove station {key}"),
            EditCommand::AddLine { key, stops, .. } => {
                format!("add line {key} over {} stops", stops.len())
            }
            EditCommand::RemoveLine { key } => format!("remove line {key}"),
        }
    }
}

/// Applies edits copy-on-write.
#[derive(Debug, Clone, Copy, Default)]
pub struct EditEngine;

impl EditEngine {
    pub fn new() -> Self {
        Self
    }

    /// Apply `edit` to a copy of `graph`.
    ///
    /// The returned graph carries no estimates (its structure changed) and a
    /// revision one higher than `graph`'s. On error `graph` is untouched.
    #[tracing::instrument(skip_all, fields(edit = %edit.describe(), revision = graph.revision()))]
    pub fn apply(&self, graph: &Graph, edit: &EditCommand) -> TsResult<Graph> {
        let mut next = graph.clone();
        match edit {
            EditCommand::AddStation(spec) => add_station(&mut next, spec)?,
            EditCommand::RemoveStation { key } => remove_station(&mut next, key)?,
            EditCommand::AddLine { key, name, stops } => add_line(&mut next, key, name, stops)?,
            EditCommand::RemoveLine { key } => remove_line(&mut next, key)?,
        }
        next.clear_estimates();
        next.revision += 1;
        validate::check_invariants(&next)?;
        tracing::debug!(
            vertices = next.vertex_count(),
            edges = next.edge_count(),
            "edit applied"
        );
        Ok(next)
    }

    /// Apply edits in order; stops at the first failure.
    pub fn apply_all(&self, graph: &Graph, edits: &[EditCommand]) -> TsResult<Graph> {
        let mut current = graph.clone();
        for edit in edits {
            current = self.apply(&current, edit)?;
        }
        Ok(current)
    }

    pub fn add_station(&self, graph: &Graph, spec: StationSpec) -> TsResult<Graph> {
        self.apply(graph, &EditCommand::AddStation(spec))
    }

    pub fn remove_station(&self, graph: &Graph, key: &str) -> TsResult<Graph> {
        self.apply(
            graph,
            &EditCommand::RemoveStation {
                key: key.to_string(),
            },
        )
    }

    pub fn add_line(&self, graph: &Graph, key: &str, stops: &[&str]) -> TsResult<Graph> {
        self.apply(
            graph,
            &EditCommand::AddLine {
                key: key.to_string(),
                name: key.to_string(),
                stops: stops.iter().map(|s| s.to_string()).collect(),
            },
        )
    }

    pub fn remove_line(&self, graph: &Graph, key: &str) -> TsResult<Graph> {
        self.apply(
            graph,
            &EditCommand::RemoveLine {
                key: key.to_string(),
            },
        )
    }
}

fn add_station(graph: &mut Graph, spec: &StationSpec) -> TsResult<()> {
    if graph.vertex_by_key(&spec.key).is_some() {
        return Err(TsError::DuplicateVertex {
            id: spec.key.clone(),
        });
    }
    let location = match spec.location {
        Some(location) => location,
        None => {
            let mut points = Vec::with_capacity(spec.near.len());
            for key in &spec.near {
                points.push(graph.require_vertex(key)?.location);
            }
            midpoint(&points).ok_or_else(|| {
                TsError::invalid_edit(format!(
                    "station {} needs a location or at least one `near` station",
                    spec.key
                ))
            })?
        }
    };
    if !location.is_finite() {
        return Err(TsError::invalid_edit(format!(
            "station {} has a non-finite location",
            spec.key
        )));
    }
    let name = if spec.name.is_empty() {
        spec.key.clone()
    } else {
        spec.name.clone()
    };
    graph.insert_vertex(spec.key.clone(), spec.kind, name, location, Origin::Edit)?;
    Ok(())
}

fn remove_station(graph: &mut Graph, key: &str) -> TsResult<()> {
    let id = graph.require_vertex(key)?.id;
    if let Some(line) = graph
        .lines()
        .find(|l| !l.stops.is_empty() && l.stops.iter().all(|&s| s == id))
    {
        return Err(TsError::invalid_edit(format!(
            "{key} is the last stop of line {}; remove the line first",
            line.key
        )));
    }
    let tombstone = graph.remove_vertex(id)?;
    tracing::debug!(key, neighbours = tombstone.neighbours.len(), "station removed");
    Ok(())
}

fn add_line(graph: &mut Graph, key: &str, name: &str, stops: &[String]) -> TsResult<()> {
    let mut resolved: Vec<VertexId> = Vec::with_capacity(stops.len());
    let mut kinds = Vec::with_capacity(stops.len());
    for stop in stops {
        let vertex = graph.require_vertex(stop)?;
        resolved.push(vertex.id);
        kinds.push((stop, vertex.kind));
    }

    if graph.line_by_key(key).is_some() {
        return Err(TsError::invalid_edit(format!("line {key} already exists")));
    }
    if resolved.len() < 2 {
        return Err(TsError::invalid_edit(format!(
            "line {key} needs at least two stops"
        )));
    }
    if let Some((stop, _)) = kinds.iter().find(|(_, kind)| !kind.can_join_line()) {
        return Err(TsError::invalid_edit(format!(
            "{stop} is a bike station and cannot be on line {key}"
        )));
    }
    if let Some(w) = resolved.windows(2).find(|w| w[0] == w[1]) {
        let repeated = graph
            .vertex(w[0])
            .map_or_else(String::new, |v| v.key.clone());
        return Err(TsError::invalid_edit(format!(
            "line {key} repeats stop {repeated} consecutively"
        )));
    }

    let name = if name.is_empty() { key } else { name };
    graph.register_line(key.to_string(), name.to_string(), resolved, Origin::Edit)?;
    Ok(())
}

fn remove_line(graph: &mut Graph, key: &str) -> TsResult<()> {
    let id = graph
        .line_by_key(key)
        .map(|l| l.id)
        .ok_or_else(|| TsError::UnknownLine { id: key.to_string() })?;
    let deleted = graph
        .remove_line(id)
        .ok_or_else(|| TsError::UnknownLine { id: key.to_string() })?;
    tracing::debug!(key, deleted_edges = deleted, "line removed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GraphBuilder;
    use ts_core::EdgeKind;
    use ts_records::{LineRecord, StopRecord};

    fn line_graph() -> Graph {
        let stops: Vec<StopRecord> = ["A", "B", "C"]
            .iter()
            .enumerate()
            .map(|(i, id)| StopRecord {
                id: id.to_string(),
                name: id.to_string(),
                location: Location::new(1000.0 * i as f64, 0.0),
                mode: VertexKind::SubwayStop,
            })
            .collect();
        let lines = [LineRecord {
            id: "1".into(),
            name: "One".into(),
            stops: vec!["A".into(), "B".into(), "C".into()],
        }];
        GraphBuilder::default()
            .build_from_records(&stops, &[], &lines)
            .unwrap()
    }

    #[test]
    fn add_station_has_no_edges_and_no_ridership() {
        let graph = line_graph();
        let spec = StationSpec::new("D", VertexKind::SubwayStop, Location::new(3000.0, 0.0));
        let edited = EditEngine::new().add_station(&graph, spec).unwrap();

        let d = edited.vertex_by_key("D").unwrap();
        assert_eq!(d.origin, Origin::Edit);
        assert!(d.ridership().is_none());
        assert_eq!(edited.incident_edges(d.id).count(), 0);
        assert_eq!(edited.revision(), graph.revision() + 1);
        assert_eq!(graph.vertex_count(), 3);
    }

    #[test]
    fn add_station_duplicate_key() {
        let graph = line_graph();
        let spec = StationSpec::new("B", VertexKind::SubwayStop, Location::default());
        let err = EditEngine::new().add_station(&graph, spec).unwrap_err();
        assert_eq!(err, TsError::DuplicateVertex { id: "B".into() });
    }

    #[test]
    fn add_station_placed_between_neighbours() {
        let graph = line_graph();
        let spec = StationSpec {
            key: "AB".into(),
            kind: VertexKind::SubwayStop,
            name: String::new(),
            location: None,
            near: vec!["A".into(), "B".into()],
        };
        let edited = EditEngine::new().add_station(&graph, spec).unwrap();
        let ab = edited.vertex_by_key("AB").unwrap();
        assert_eq!(ab.location, Location::new(500.0, 0.0));
        assert_eq!(ab.name, "AB");
    }

    #[test]
    fn add_station_without_position_is_invalid() {
        let graph = line_graph();
        let spec = StationSpec {
            key: "X".into(),
            kind: VertexKind::SubwayStop,
            name: String::new(),
            location: None,
            near: vec![],
        };
        let err = EditEngine::new().add_station(&graph, spec).unwrap_err();
        assert!(matches!(err, TsError::InvalidEdit { .. }));
    }

    #[test]
    fn remove_station_cascades_and_rejoins_the_line() {
        let graph = line_graph();
        let edited = EditEngine::new().remove_station(&graph, "B").unwrap();
        assert_eq!(edited.vertex_count(), 2);
        assert!(edited.tombstone("B").is_some());
        assert_eq!(graph.edge_count(), 2);

        assert_eq!(edited.edge_count(), 1);
        assert!(edited.adjacent("A", "C").unwrap());
        let line = edited.line_by_key("1").unwrap();
        assert!(edited.edges().all(|e| e.lines.contains(&line.id)));
    }

    #[test]
    fn remove_last_stop_of_looping_line_is_invalid() {
        let engine = EditEngine::new();
        let graph = engine.add_line(&line_graph(), "L", &["A", "B", "A"]).unwrap();
        let graph = engine.remove_line(&graph, "1").unwrap();

        let graph = engine.remove_station(&graph, "B").unwrap();
        let a = graph.vertex_by_key("A").unwrap().id;
        assert_eq!(graph.line_by_key("L").unwrap().stops, vec![a]);

        let err = engine.remove_station(&graph, "A").unwrap_err();
        assert!(matches!(err, TsError::InvalidEdit { .. }), "{err}");
        assert_eq!(graph.line_by_key("L").unwrap().stops, vec![a]);
    }

    #[test]
    fn remove_last_stop_of_line_is_invalid() {
        let engine = EditEngine::new();
        let graph = line_graph();
        let graph = engine.remove_station(&graph, "A").unwrap();
        let graph = engine.remove_station(&graph, "B").unwrap();
        let err = engine.remove_station(&graph, "C").unwrap_err();
        assert!(matches!(err, TsError::InvalidEdit { .. }));

        let graph = engine.remove_line(&graph, "1").unwrap();
        assert!(engine.remove_station(&graph, "C").is_ok());
    }

    #[test]
    fn add_line_shares_existing_edges() {
        let graph = line_graph();
        let edited = EditEngine::new().add_line(&graph, "2", &["C", "B", "A"]).unwrap();
        assert_eq!(edited.edge_count(), 2);
        assert!(
            edited
                .edges()
                .filter(|e| e.kind == EdgeKind::RouteAdjacency)
                .all(|e| e.lines.len() == 2)
        );
    }

    #[test]
    fn add_line_rejects_bad_shapes() {
        let engine = EditEngine::new();
        let graph = line_graph();
        for (key, stops) in [("1", vec!["A", "C"]), ("2", vec!["A"]), ("3", vec!["A", "A"])] {
            let err = engine.add_line(&graph, key, &stops).unwrap_err();
            assert!(matches!(err, TsError::InvalidEdit { .. }), "{key}: {err}");
        }
    }

    #[test]
    fn remove_unknown_line() {
        let err = EditEngine::new()
            .remove_line(&line_graph(), "99")
            .unwrap_err();
        assert_eq!(err, TsError::UnknownLine { id: "99".into() });
    }

    #[test]
    fn edit_command_yaml_shape() {
        let yaml = "op: add_line\nkey: '5'\nstops: [A, B]\n";
        let edit: EditCommand = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            edit,
            EditCommand::AddLine {
                key: "5".into(),
                name: String::new(),
                stops: vec!["A".into(), "B".into()],
            }
        );

        let yaml = "op: add_station\nkey: N\nkind: surface_line\nlocation: { x_m: 1.0, y_m: 2.0 }\n";
        let edit: EditCommand = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(edit, EditCommand::AddStation(ref s) if s.kind == VertexKind::SurfaceLine));
    }
}
