//! Read-only queries over a graph, addressed by external keys.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use ts_core::{TsError, TsResult, VertexId};

use crate::graph::Graph;

impl Graph {
    /// Keys of the vertices sharing an edge with `key`, sorted.
    pub fn neighbours(&self, key: &str) -> TsResult<Vec<String>> {
        let id = self.require_vertex(key)?.id;
        let keys: BTreeSet<String> = self
            .incident_edges(id)
            .filter_map(|e| e.other(id))
            .filter_map(|n| self.vertex(n))
            .map(|v| v.key.clone())
            .collect();
        Ok(keys.into_iter().collect())
    }

    /// Whether any edge joins `a` and `b`.
    pub fn adjacent(&self, a: &str, b: &str) -> TsResult<bool> {
        let a = self.require_vertex(a)?.id;
        let b = self.require_vertex(b)?.id;
        Ok(self.incident_edges(a).any(|e| e.other(a) == Some(b)))
    }

    /// Shortest path by hop count from `from` to `to`, as vertex keys,
    /// endpoints included. `None` when the two are not connected.
    ///
    /// Breadth-first over all edge kinds; neighbours are visited in id order,
    /// so the path returned for ties is stable.
    pub fn connected_path(&self, from: &str, to: &str) -> TsResult<Option<Vec<String>>> {
        let start = self.require_vertex(from)?.id;
        let goal = self.require_vertex(to)?.id;

        let adjacency = self.neighbour_ids();
        let mut previous: BTreeMap<VertexId, VertexId> = BTreeMap::new();
        let mut seen = BTreeSet::from([start]);
        let mut queue = VecDeque::from([start]);

        while let Some(v) = queue.pop_front() {
            if v == goal {
                return Ok(Some(self.trace_back(&previous, start, goal)));
            }
            for &n in adjacency.get(&v).into_iter().flatten() {
                if seen.insert(n) {
                    previous.insert(n, v);
                    queue.push_back(n);
                }
            }
        }
        Ok(None)
    }

    /// Keys of the vertices served by any of `lines`, sorted and deduplicated.
    pub fn vertices_on_lines<S: AsRef<str>>(&self, lines: &[S]) -> TsResult<Vec<String>> {
        let mut keys = BTreeSet::new();
        for line_key in lines {
            let line_key = line_key.as_ref();
            let line = self.line_by_key(line_key).ok_or_else(|| TsError::UnknownLine {
                id: line_key.to_string(),
            })?;
            keys.extend(
                line.stops
                    .iter()
                    .filter_map(|&s| self.vertex(s))
                    .map(|v| v.key.clone()),
            );
        }
        Ok(keys.into_iter().collect())
    }

    /// Keys of all registered lines, sorted.
    pub fn line_keys(&self) -> Vec<String> {
        self.line_keys.keys().cloned().collect()
    }

    fn neighbour_ids(&self) -> BTreeMap<VertexId, BTreeSet<VertexId>> {
        let mut adjacency: BTreeMap<VertexId, BTreeSet<VertexId>> = BTreeMap::new();
        for edge in self.edges() {
            let (a, b) = edge.endpoints;
            adjacency.entry(a).or_default().insert(b);
            adjacency.entry(b).or_default().insert(a);
        }
        adjacency
    }

    fn trace_back(
        &self,
        previous: &BTreeMap<VertexId, VertexId>,
        start: VertexId,
        goal: VertexId,
    ) -> Vec<String> {
        let mut path = vec![goal];
        let mut at = goal;
        while at != start {
            match previous.get(&at) {
                Some(&p) => {
                    path.push(p);
                    at = p;
                }
                None => break,
            }
        }
        path.reverse();
        path.into_iter()
            .filter_map(|id| self.vertex(id))
            .map(|v| v.key.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::GraphBuilder;
    use crate::graph::Graph;
    use ts_core::{Location, TsError, VertexKind};
    use ts_records::{BikeStationRecord, LineRecord, StopRecord};

    fn stop(id: &str, x: f64, mode: VertexKind) -> StopRecord {
        StopRecord {
            id: id.into(),
            name: id.into(),
            location: Location::new(x, 0.0),
            mode,
        }
    }

    fn line(id: &str, stops: &[&str]) -> LineRecord {
        LineRecord {
            id: id.into(),
            name: id.into(),
            stops: stops.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// A-B-C on line 1, C-D on line 2, a surface stop next to A,
    /// an isolated stop Z, a bike dock near D.
    fn network() -> Graph {
        let stops = [
            stop("A", 0.0, VertexKind::SubwayStop),
            stop("B", 1000.0, VertexKind::SubwayStop),
            stop("C", 2000.0, VertexKind::SubwayStop),
            stop("D", 3000.0, VertexKind::SubwayStop),
            stop("S", 50.0, VertexKind::SurfaceLine),
            stop("Z", 9000.0, VertexKind::SubwayStop),
        ];
        let bikes = [BikeStationRecord {
            id: "7001".into(),
            name: "Dock".into(),
            location: Location::new(3100.0, 0.0),
        }];
        let lines = [line("1", &["A", "B", "C"]), line("2", &["C", "D"])];
        GraphBuilder::default()
            .build_from_records(&stops, &bikes, &lines)
            .unwrap()
    }

    #[test]
    fn neighbours_cover_every_edge_kind() {
        let graph = network();
        assert_eq!(graph.neighbours("A").unwrap(), vec!["B", "S"]);
        assert_eq!(graph.neighbours("D").unwrap(), vec!["7001", "C"]);
        assert!(graph.neighbours("Z").unwrap().is_empty());
        assert!(matches!(
            graph.neighbours("nope"),
            Err(TsError::UnknownVertex { .. })
        ));
    }

    #[test]
    fn adjacency_is_symmetric() {
        let graph = network();
        assert!(graph.adjacent("A", "B").unwrap());
        assert!(graph.adjacent("B", "A").unwrap());
        assert!(!graph.adjacent("A", "C").unwrap());
    }

    #[test]
    fn shortest_path_crosses_lines() {
        let graph = network();
        let path = graph.connected_path("S", "7001").unwrap().unwrap();
        assert_eq!(path, vec!["S", "A", "B", "C", "D", "7001"]);
        assert_eq!(graph.connected_path("A", "A").unwrap().unwrap(), vec!["A"]);
        assert!(graph.connected_path("A", "Z").unwrap().is_none());
    }

    #[test]
    fn vertices_on_lines_deduplicates() {
        let graph = network();
        assert_eq!(
            graph.vertices_on_lines(&["1", "2"]).unwrap(),
            vec!["A", "B", "C", "D"]
        );
        assert!(matches!(
            graph.vertices_on_lines(&["9"]),
            Err(TsError::UnknownLine { .. })
        ));
        assert_eq!(graph.line_keys(), vec!["1", "2"]);
    }
}
