/// Stages a simulation passes through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimStage {
    ApplyingEdit,
    Estimating,
    Measuring,
    Completed,
}

impl std::fmt::Display for SimStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SimStage::ApplyingEdit => "applying edit",
            SimStage::Estimating => "estimating ridership",
            SimStage::Measuring => "measuring spread",
            SimStage::Completed => "completed",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone)]
pub struct SimProgressEvent {
    /// Submission this event belongs to.
    pub generation: u64,
    pub stage: SimStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
}

impl SimProgressEvent {
    pub fn stage(generation: u64, stage: SimStage, elapsed_wall_s: f64) -> Self {
        Self {
            generation,
            stage,
            elapsed_wall_s,
            message: None,
        }
    }
}
