use proptest::prelude::*;
use ts_analysis::{RidershipEstimator, RidershipSource, SpreadMetric};
use ts_core::{Location, VertexKind};
use ts_graph::{Graph, GraphBuilder};
use ts_records::{
    BikeStationRecord, LineRecord, ModeFilter, RidershipKind, RidershipRecord, SpreadConfig,
    SpreadMeasure, StopRecord,
};

fn subway_line() -> Graph {
    let stops: Vec<StopRecord> = ["A", "B", "C"]
        .iter()
        .enumerate()
        .map(|(i, id)| StopRecord {
            id: id.to_string(),
            name: id.to_string(),
            location: Location::new(800.0 * i as f64, 0.0),
            mode: VertexKind::SubwayStop,
        })
        .collect();
    let lines = [LineRecord {
        id: "1".into(),
        name: "Yonge".into(),
        stops: vec!["A".into(), "B".into(), "C".into()],
    }];
    GraphBuilder::default()
        .build_from_records(&stops, &[], &lines)
        .unwrap()
}

fn mixed_network() -> Graph {
    let stops = vec![
        StopRecord {
            id: "A".into(),
            name: "A".into(),
            location: Location::new(0.0, 0.0),
            mode: VertexKind::SubwayStop,
        },
        StopRecord {
            id: "B".into(),
            name: "B".into(),
            location: Location::new(900.0, 0.0),
            mode: VertexKind::SubwayStop,
        },
        StopRecord {
            id: "B_CAR".into(),
            name: "B streetcar".into(),
            location: Location::new(920.0, 10.0),
            mode: VertexKind::SurfaceLine,
        },
        StopRecord {
            id: "E".into(),
            name: "E".into(),
            location: Location::new(920.0, 700.0),
            mode: VertexKind::SurfaceLine,
        },
    ];
    let bikes = vec![BikeStationRecord {
        id: "7000".into(),
        name: "Dock".into(),
        location: Location::new(0.0, 120.0),
    }];
    let lines = vec![
        LineRecord {
            id: "1".into(),
            name: "Subway".into(),
            stops: vec!["A".into(), "B".into()],
        },
        LineRecord {
            id: "505".into(),
            name: "Streetcar".into(),
            stops: vec!["B_CAR".into(), "E".into()],
        },
    ];
    GraphBuilder::default()
        .build_from_records(&stops, &bikes, &lines)
        .unwrap()
}

fn estimate(graph: &Graph, counts: &[(&str, f64)]) -> Graph {
    let source = RidershipSource::new(
        counts
            .iter()
            .map(|&(t, c)| RidershipRecord::new(t, c))
            .collect(),
    )
    .unwrap();
    RidershipEstimator::default()
        .estimate(graph, &source)
        .unwrap()
}

#[test]
fn even_ridership_has_zero_spread() {
    let estimated = estimate(&subway_line(), &[("A", 10.0), ("B", 10.0), ("C", 10.0)]);
    for measure in [SpreadMeasure::Variance, SpreadMeasure::StdDev, SpreadMeasure::Gini] {
        let metric = SpreadMetric::new(SpreadConfig {
            measure,
            ..SpreadConfig::default()
        });
        assert_eq!(metric.measure(&estimated).unwrap(), 0.0);
    }
}

#[test]
fn uneven_ridership_has_positive_spread() {
    let estimated = estimate(&subway_line(), &[("A", 0.0), ("B", 20.0), ("C", 10.0)]);
    let variance = SpreadMetric::default().measure(&estimated).unwrap();
    assert!(variance > 0.0);

    let stddev = SpreadMetric::new(SpreadConfig {
        measure: SpreadMeasure::StdDev,
        ..SpreadConfig::default()
    })
    .measure(&estimated)
    .unwrap();
    assert!((stddev * stddev - variance).abs() < 1e-9);
}

#[test]
fn mode_filter_selects_vertices() {
    let estimated = estimate(
        &mixed_network(),
        &[("A", 10.0), ("B", 10.0), ("B_CAR", 50.0), ("7000", 5.0)],
    );

    assert_eq!(SpreadMetric::default().measure(&estimated).unwrap(), 0.0);

    let all = SpreadMetric::new(SpreadConfig {
        modes: ModeFilter::All,
        ..SpreadConfig::default()
    });
    assert_eq!(all.values(&estimated).unwrap().len(), 5);
    assert!(all.measure(&estimated).unwrap() > 0.0);

    let surface = SpreadMetric::new(SpreadConfig {
        modes: ModeFilter::Kinds {
            kinds: vec![VertexKind::SurfaceLine],
        },
        ..SpreadConfig::default()
    });
    assert_eq!(surface.values(&estimated).unwrap(), vec![50.0, 0.0]);
}

fn arb_records() -> impl Strategy<Value = Vec<RidershipRecord>> {
    let target = prop::sample::select(vec!["A", "B", "B_CAR", "E", "7000", "1", "505"]);
    prop::collection::vec((target, 0.0..5000.0_f64), 0..30).prop_map(|rows| {
        rows.into_iter()
            .map(|(target, count)| {
                let record = RidershipRecord::new(target, count);
                if target == "1" || target == "505" {
                    record.with_kind(RidershipKind::LineTotal)
                } else {
                    record
                }
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn estimates_are_non_negative_and_deterministic(records in arb_records()) {
        let graph = mixed_network();
        let source = RidershipSource::new(records).unwrap();
        let estimator = RidershipEstimator::default();

        let first = estimator.estimate(&graph, &source).unwrap();
        let second = estimator.estimate(&graph, &source).unwrap();
        prop_assert_eq!(&first, &second);

        for v in first.vertices() {
            prop_assert!(v.ridership().unwrap() >= 0.0);
        }
        for e in first.edges() {
            prop_assert!(e.flow().unwrap() >= 0.0);
        }
        for measure in [SpreadMeasure::Variance, SpreadMeasure::StdDev, SpreadMeasure::Gini] {
            let metric = SpreadMetric::new(SpreadConfig { modes: ModeFilter::All, measure });
            prop_assert!(metric.measure(&first).unwrap() >= 0.0);
        }
    }
}
