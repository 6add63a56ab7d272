//! Ridership spread: how unevenly ridership is distributed over vertices.

use ts_core::{Real, TsError, TsResult, is_uniform, require_finite};
use ts_graph::Graph;
use ts_records::{SpreadConfig, SpreadMeasure};

/// Scalar spread of an estimated graph. Lower is more even.
#[derive(Debug, Clone, Default)]
pub struct SpreadMetric {
    config: SpreadConfig,
}

impl SpreadMetric {
    pub fn new(config: SpreadConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SpreadConfig {
        &self.config
    }

    /// Ridership of the vertices selected by the mode filter, in vertex id order.
    pub fn values(&self, graph: &Graph) -> TsResult<Vec<Real>> {
        graph
            .vertices()
            .filter(|v| self.config.modes.includes(v.kind))
            .map(|v| {
                v.ridership()
                    .ok_or_else(|| TsError::NotEstimated { id: v.key.clone() })
            })
            .collect()
    }

    pub fn measure(&self, graph: &Graph) -> TsResult<Real> {
        let values = self.values(graph)?;
        let spread = match self.config.measure {
            SpreadMeasure::Variance => variance(&values),
            SpreadMeasure::StdDev => variance(&values).sqrt(),
            SpreadMeasure::Gini => gini(&values),
        };
        require_finite(spread, "spread")
    }
}

/// Population variance, two-pass. Zero for fewer than two values or when
/// all values are equal.
pub fn variance(values: &[Real]) -> Real {
    if values.len() < 2 || is_uniform(values) {
        return 0.0;
    }
    let n = values.len() as Real;
    let mean = values.iter().sum::<Real>() / n;
    values.iter().map(|x| (x - mean) * (x - mean)).sum::<Real>() / n
}

/// Gini coefficient of non-negative values, clamped at zero.
pub fn gini(values: &[Real]) -> Real {
    if values.len() < 2 || is_uniform(values) {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let total: Real = sorted.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    let n = sorted.len() as Real;
    let ranked: Real = sorted
        .iter()
        .enumerate()
        .map(|(i, x)| (i as Real + 1.0) * x)
        .sum();
    (2.0 * ranked / (n * total) - (n + 1.0) / n).max(0.0)
}
