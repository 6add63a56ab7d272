//! End-to-end checks: records → graph → estimate → edit → compare.

use std::sync::Arc;

use ts_analysis::RidershipSource;
use ts_core::{Location, TsError, VertexKind};
use ts_graph::{EditCommand, Graph, GraphBuilder};
use ts_records::{
    EstimatorConfig, LineRecord, RidershipRecord, SpreadConfig, SpreadMeasure, StopRecord,
};
use ts_sim::Simulator;

fn three_stop_line() -> Graph {
    let stops: Vec<StopRecord> = ["A", "B", "C"]
        .iter()
        .enumerate()
        .map(|(i, id)| StopRecord {
            id: id.to_string(),
            name: id.to_string(),
            location: Location::new(1200.0 * i as f64, 0.0),
            mode: VertexKind::SubwayStop,
        })
        .collect();
    let lines = [LineRecord {
        id: "1".into(),
        name: "Line 1".into(),
        stops: vec!["A".into(), "B".into(), "C".into()],
    }];
    GraphBuilder::default()
        .build_from_records(&stops, &[], &lines)
        .unwrap()
}

fn simulator(counts: [f64; 3], spread: SpreadConfig) -> Simulator {
    let records = ["A", "B", "C"]
        .iter()
        .zip(counts)
        .map(|(id, count)| RidershipRecord::new(*id, count))
        .collect();
    Simulator::new(
        Arc::new(RidershipSource::new(records).unwrap()),
        EstimatorConfig::default(),
        spread,
    )
}

#[test]
fn equal_ridership_spread_is_zero() {
    let sim = simulator([10.0, 10.0, 10.0], SpreadConfig::default());
    let baseline = sim.baseline(&three_stop_line()).unwrap();
    assert_eq!(baseline.spread, 0.0);
}

#[test]
fn removing_middle_stop_reports_delta() {
    let sim = simulator([0.0, 20.0, 10.0], SpreadConfig::default());
    let baseline = sim.baseline(&three_stop_line()).unwrap();
    assert!(baseline.spread > 0.0);

    let edit = EditCommand::RemoveStation { key: "B".into() };
    let comparison = sim.simulate(&baseline, &edit).unwrap();

    assert_eq!(comparison.graph.vertex_count(), 2);
    assert_eq!(comparison.baseline_spread, baseline.spread);
    assert_eq!(
        comparison.delta,
        comparison.edited_spread - comparison.baseline_spread
    );
    // B's 20 riders split between A and C: [10, 20].
    assert!((comparison.edited_spread - 25.0).abs() < 1e-9);
    assert!(comparison.delta < 0.0);

    assert_eq!(baseline.graph.vertex_count(), 3);
    assert!(baseline.graph.is_estimated());
}

#[test]
fn consecutive_removals_keep_every_rider() {
    let sim = simulator([10.0, 20.0, 30.0], SpreadConfig::default());
    let baseline = sim.baseline(&three_stop_line()).unwrap();
    let edits = [
        EditCommand::RemoveStation { key: "B".into() },
        EditCommand::RemoveStation { key: "C".into() },
    ];

    let steps = sim.simulate_sequence(&baseline, &edits).unwrap();
    let total = |graph: &Graph| -> f64 { graph.vertices().filter_map(|v| v.ridership()).sum() };
    assert_eq!(total(&baseline.graph), 60.0);
    assert_eq!(total(&steps[0].graph), 60.0);
    assert_eq!(total(&steps[1].graph), 60.0);

    // A and C were joined when B went, so C's riders had somewhere to go.
    let last = &steps[1].graph;
    assert_eq!(last.vertex_by_key("A").unwrap().ridership(), Some(60.0));
    assert_eq!(steps[1].edited_spread, 0.0);
}

#[test]
fn stddev_matches_population_stddev() {
    let spread = SpreadConfig {
        measure: SpreadMeasure::StdDev,
        ..SpreadConfig::default()
    };
    let sim = simulator([0.0, 20.0, 10.0], spread);
    let baseline = sim.baseline(&three_stop_line()).unwrap();
    assert!((baseline.spread - (200.0_f64 / 3.0).sqrt()).abs() < 1e-9);
}

#[test]
fn add_line_with_unknown_stop_fails_cleanly() {
    let sim = simulator([1.0, 2.0, 3.0], SpreadConfig::default());
    let baseline = sim.baseline(&three_stop_line()).unwrap();
    let (vertices, edges) = (baseline.graph.vertex_count(), baseline.graph.edge_count());

    let edit = EditCommand::AddLine {
        key: "2".into(),
        name: String::new(),
        stops: vec!["A".into(), "GHOST".into()],
    };
    let err = sim.simulate(&baseline, &edit).unwrap_err();

    assert_eq!(err, TsError::UnknownVertex { id: "GHOST".into() });
    assert_eq!(baseline.graph.vertex_count(), vertices);
    assert_eq!(baseline.graph.edge_count(), edges);
}

#[test]
fn remove_unknown_station_leaves_baseline_equal() {
    let sim = simulator([1.0, 2.0, 3.0], SpreadConfig::default());
    let baseline = sim.baseline(&three_stop_line()).unwrap();
    let before = baseline.graph.clone();

    let err = sim
        .simulate(&baseline, &EditCommand::RemoveStation { key: "GHOST".into() })
        .unwrap_err();

    assert_eq!(err, TsError::UnknownVertex { id: "GHOST".into() });
    assert_eq!(baseline.graph, before);
}
