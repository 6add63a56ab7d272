//! Baseline vs. edited comparisons.

use std::sync::Arc;

use rayon::prelude::*;
use ts_analysis::{RidershipEstimator, RidershipSource, SpreadMetric};
use ts_core::{Real, TsError, TsResult};
use ts_graph::{EditCommand, EditEngine, Graph};
use ts_records::{EstimatorConfig, SpreadConfig};

use crate::progress::SimStage;

/// An estimated graph and its spread.
#[derive(Debug, Clone, PartialEq)]
pub struct Baseline {
    pub graph: Graph,
    pub spread: Real,
}

/// Outcome of one simulated edit.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub edit: EditCommand,
    pub baseline_spread: Real,
    pub edited_spread: Real,
    /// `edited_spread - baseline_spread`. Negative means the edit evened ridership out.
    pub delta: Real,
    /// The edited graph, estimated.
    pub graph: Graph,
}

/// Runs edit → estimate → measure against a fixed ridership source.
#[derive(Debug, Clone)]
pub struct Simulator {
    source: Arc<RidershipSource>,
    engine: EditEngine,
    estimator: RidershipEstimator,
    metric: SpreadMetric,
}

impl Simulator {
    pub fn new(
        source: Arc<RidershipSource>,
        estimator: EstimatorConfig,
        spread: SpreadConfig,
    ) -> Self {
        Self {
            source,
            engine: EditEngine::new(),
            estimator: RidershipEstimator::new(estimator),
            metric: SpreadMetric::new(spread),
        }
    }

    pub fn source(&self) -> &Arc<RidershipSource> {
        &self.source
    }

    pub fn metric(&self) -> &SpreadMetric {
        &self.metric
    }

    /// Estimate and measure a structural graph.
    pub fn baseline(&self, graph: &Graph) -> TsResult<Baseline> {
        let graph = self.estimator.estimate(graph, &self.source)?;
        let spread = self.metric.measure(&graph)?;
        Ok(Baseline { graph, spread })
    }

    /// Apply `edit` to a copy of the baseline graph and compare spreads.
    /// The baseline is never modified.
    #[tracing::instrument(skip_all, fields(edit = %edit.describe()))]
    pub fn simulate(&self, baseline: &Baseline, edit: &EditCommand) -> TsResult<Comparison> {
        self.simulate_observed(baseline, edit, &mut |_| true)?
            .ok_or_else(|| TsError::Invariant {
                what: "simulation stopped without an observer asking it to".to_string(),
            })
    }

    /// Like [`simulate`](Self::simulate), reporting each stage to `observer`
    /// before it runs. If the observer returns `false` the run stops and
    /// `Ok(None)` is returned.
    pub fn simulate_observed(
        &self,
        baseline: &Baseline,
        edit: &EditCommand,
        observer: &mut dyn FnMut(SimStage) -> bool,
    ) -> TsResult<Option<Comparison>> {
        if !observer(SimStage::ApplyingEdit) {
            return Ok(None);
        }
        let edited = self.engine.apply(&baseline.graph, edit)?;

        if !observer(SimStage::Estimating) {
            return Ok(None);
        }
        let edited = self.estimator.estimate(&edited, &self.source)?;

        if !observer(SimStage::Measuring) {
            return Ok(None);
        }
        let edited_spread = self.metric.measure(&edited)?;
        observer(SimStage::Completed);

        let comparison = compare(baseline, edit.clone(), edited, edited_spread);
        tracing::info!(
            baseline = comparison.baseline_spread,
            edited = comparison.edited_spread,
            delta = comparison.delta,
            "simulated edit"
        );
        Ok(Some(comparison))
    }

    /// Simulate independent edits against the same baseline, in parallel.
    /// Results are in input order.
    pub fn simulate_all(
        &self,
        baseline: &Baseline,
        edits: &[EditCommand],
    ) -> Vec<TsResult<Comparison>> {
        edits
            .par_iter()
            .map(|edit| self.simulate(baseline, edit))
            .collect()
    }

    /// Apply `edits` one after another. Comparison `i` reflects edits `0..=i`,
    /// always measured against the original baseline. Stops at the first
    /// failing edit.
    pub fn simulate_sequence(
        &self,
        baseline: &Baseline,
        edits: &[EditCommand],
    ) -> TsResult<Vec<Comparison>> {
        let mut current = baseline.graph.clone();
        let mut comparisons = Vec::with_capacity(edits.len());
        for edit in edits {
            let edited = self.engine.apply(&current, edit)?;
            let estimated = self.estimator.estimate(&edited, &self.source)?;
            let spread = self.metric.measure(&estimated)?;
            comparisons.push(compare(baseline, edit.clone(), estimated.clone(), spread));
            current = estimated;
        }
        Ok(comparisons)
    }
}

fn compare(baseline: &Baseline, edit: EditCommand, graph: Graph, edited_spread: Real) -> Comparison {
    Comparison {
        edit,
        baseline_spread: baseline.spread,
        edited_spread,
        delta: edited_spread - baseline.spread,
        graph,
    }
}
