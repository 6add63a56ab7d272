//! Cumulative editing with undo and reset.

use ts_core::{Real, TsResult};
use ts_graph::{EditCommand, Graph};

use crate::simulator::{Baseline, Comparison, Simulator};

/// An editing session over one baseline.
///
/// Each accepted edit builds on the previous state; a rejected edit leaves
/// the session as it was.
#[derive(Debug, Clone)]
pub struct Session {
    simulator: Simulator,
    baseline: Baseline,
    /// Accepted edits and the state each one produced, oldest first.
    history: Vec<(EditCommand, Baseline)>,
}

impl Session {
    /// Start a session from a structural graph.
    pub fn start(simulator: Simulator, graph: &Graph) -> TsResult<Self> {
        let baseline = simulator.baseline(graph)?;
        Ok(Self::from_baseline(simulator, baseline))
    }

    pub fn from_baseline(simulator: Simulator, baseline: Baseline) -> Self {
        Self {
            simulator,
            baseline,
            history: Vec::new(),
        }
    }

    pub fn baseline(&self) -> &Baseline {
        &self.baseline
    }

    /// The latest state, or the baseline when nothing has been applied.
    pub fn current(&self) -> &Baseline {
        self.history
            .last()
            .map_or(&self.baseline, |(_, state)| state)
    }

    pub fn spread(&self) -> Real {
        self.current().spread
    }

    /// Accepted edits, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &EditCommand> {
        self.history.iter().map(|(edit, _)| edit)
    }

    pub fn depth(&self) -> usize {
        self.history.len()
    }

    /// Apply `edit` on top of the current state. The returned comparison is
    /// against the session baseline, not the previous step.
    pub fn apply(&mut self, edit: EditCommand) -> TsResult<Comparison> {
        let step = self.simulator.simulate(self.current(), &edit)?;
        let state = Baseline {
            graph: step.graph.clone(),
            spread: step.edited_spread,
        };
        self.history.push((edit.clone(), state));
        tracing::debug!(depth = self.history.len(), edit = %edit.describe(), "session edit");

        Ok(Comparison {
            baseline_spread: self.baseline.spread,
            delta: step.edited_spread - self.baseline.spread,
            ..step
        })
    }

    /// Drop the latest edit. Returns it, or `None` at the baseline.
    pub fn undo(&mut self) -> Option<EditCommand> {
        self.history.pop().map(|(edit, _)| edit)
    }

    /// Back to the baseline. Returns how many edits were discarded.
    pub fn reset(&mut self) -> usize {
        let discarded = self.history.len();
        self.history.clear();
        discarded
    }
}
