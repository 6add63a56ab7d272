//! Analysis configuration carried alongside a snapshot.
//!
//! Every section has defaults, so a snapshot may omit `config` entirely or
//! override only the fields it cares about.

use serde::{Deserialize, Serialize};
use ts_core::VertexKind;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct AnalysisConfig {
    pub build: BuildConfig,
    pub estimator: EstimatorConfig,
    pub spread: SpreadConfig,
}

/// Graph construction thresholds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BuildConfig {
    /// Stops of different modes at most this far apart get a transfer edge.
    pub transfer_radius_m: f64,
    /// Bike stations link to stops within this radius.
    pub proximity_radius_m: f64,
    /// How many of the nearest stops each bike station links to.
    pub proximity_links: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            transfer_radius_m: 150.0,
            proximity_radius_m: 300.0,
            proximity_links: 1,
        }
    }
}

/// What happens to historical ridership of a station removed by an edit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DisplacementPolicy {
    /// Split equally among the neighbours it had when it was removed.
    #[default]
    AbsorbByNeighbours,
    /// Discard it.
    Drop,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EstimatorConfig {
    pub displacement: DisplacementPolicy,
    /// Fraction of each route neighbour's ridership an edit-added station takes over.
    pub new_station_capture: f64,
    /// Fraction of the smaller endpoint's ridership that crosses a transfer edge.
    pub transfer_share: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            displacement: DisplacementPolicy::AbsorbByNeighbours,
            new_station_capture: 1.0 / 3.0,
            transfer_share: 0.5,
        }
    }
}

/// Which vertices the spread metric looks at.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModeFilter {
    #[default]
    SubwayOnly,
    All,
    Kinds {
        kinds: Vec<VertexKind>,
    },
}

impl ModeFilter {
    pub fn includes(&self, kind: VertexKind) -> bool {
        match self {
            ModeFilter::SubwayOnly => kind == VertexKind::SubwayStop,
            ModeFilter::All => true,
            ModeFilter::Kinds { kinds } => kinds.contains(&kind),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SpreadMeasure {
    /// Population variance.
    #[default]
    Variance,
    /// Population standard deviation.
    StdDev,
    /// Gini coefficient, in `[0, 1)`.
    Gini,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct SpreadConfig {
    pub modes: ModeFilter,
    pub measure: SpreadMeasure,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_fills_defaults() {
        let yaml = "build:\n  transfer_radius_m: 50.0\nspread:\n  measure: gini\n";
        let config: AnalysisConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.build.transfer_radius_m, 50.0);
        assert_eq!(config.build.proximity_links, 1);
        assert_eq!(config.spread.measure, SpreadMeasure::Gini);
        assert_eq!(config.spread.modes, ModeFilter::SubwayOnly);
        assert_eq!(config.estimator, EstimatorConfig::default());
    }

    #[test]
    fn mode_filter_membership() {
        assert!(ModeFilter::SubwayOnly.includes(VertexKind::SubwayStop));
        assert!(!ModeFilter::SubwayOnly.includes(VertexKind::BikeStation));
        assert!(ModeFilter::All.includes(VertexKind::BikeStation));
        let kinds = ModeFilter::Kinds {
            kinds: vec![VertexKind::SurfaceLine],
        };
        assert!(kinds.includes(VertexKind::SurfaceLine));
        assert!(!kinds.includes(VertexKind::SubwayStop));
    }

    #[test]
    fn mode_filter_tagged_yaml() {
        let filter: ModeFilter =
            serde_yaml::from_str("type: kinds\nkinds: [subway_stop, bike_station]\n").unwrap();
        assert_eq!(
            filter,
            ModeFilter::Kinds {
                kinds: vec![VertexKind::SubwayStop, VertexKind::BikeStation]
            }
        );
    }
}
