//! Vertex and edge classifications shared by records, graph and analysis.

use core::fmt;

/// Transit mode of a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum VertexKind {
    SubwayStop,
    SurfaceLine,
    BikeStation,
}

impl VertexKind {
    pub const ALL: [VertexKind; 3] = [
        VertexKind::SubwayStop,
        VertexKind::SurfaceLine,
        VertexKind::BikeStation,
    ];

    /// Bike stations hang off the network via proximity links; they never sit on a line.
    pub fn can_join_line(self) -> bool {
        !matches!(self, VertexKind::BikeStation)
    }
}

impl fmt::Display for VertexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VertexKind::SubwayStop => "subway-stop",
            VertexKind::SurfaceLine => "surface-line",
            VertexKind::BikeStation => "bike-station",
        };
        f.write_str(s)
    }
}

/// Kind of connection an edge represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EdgeKind {
    /// Consecutive stops on one or more lines.
    RouteAdjacency,
    /// Co-located stops of different modes.
    Transfer,
    /// Bike station to a nearby stop.
    Proximity,
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EdgeKind::RouteAdjacency => "route-adjacency",
            EdgeKind::Transfer => "transfer",
            EdgeKind::Proximity => "proximity",
        };
        f.write_str(s)
    }
}
