//! Snapshot schema definitions.
//!
//! A snapshot is the validated output of the ingestion step: every stop,
//! bike station, line and historical ridership count for one period.

use serde::{Deserialize, Serialize};
use ts_core::{Location, VertexKind};

use crate::config::AnalysisConfig;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub stops: Vec<StopRecord>,
    #[serde(default)]
    pub bike_stations: Vec<BikeStationRecord>,
    #[serde(default)]
    pub lines: Vec<LineRecord>,
    #[serde(default)]
    pub ridership: Vec<RidershipRecord>,
    #[serde(default)]
    pub config: AnalysisConfig,
}

impl Snapshot {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: crate::LATEST_VERSION,
            name: name.into(),
            stops: Vec::new(),
            bike_stations: Vec::new(),
            lines: Vec::new(),
            ridership: Vec::new(),
            config: AnalysisConfig::default(),
        }
    }
}

/// A subway stop or a surface-transit line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StopRecord {
    pub id: String,
    pub name: String,
    pub location: Location,
    pub mode: VertexKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BikeStationRecord {
    pub id: String,
    pub name: String,
    pub location: Location,
}

/// Ordered stop sequence of one line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub stops: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RidershipKind {
    #[default]
    Boardings,
    Alightings,
    TripStarts,
    TripEnds,
    /// Aggregate for a whole line.
    LineTotal,
}

/// Historical count attributed to a stop, station or line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RidershipRecord {
    pub target: String,
    pub count: f64,
    #[serde(default)]
    pub kind: RidershipKind,
}

impl RidershipRecord {
    pub fn new(target: impl Into<String>, count: f64) -> Self {
        Self {
            target: target.into(),
            count,
            kind: RidershipKind::Boardings,
        }
    }

    pub fn with_kind(mut self, kind: RidershipKind) -> Self {
        self.kind = kind;
        self
    }
}
