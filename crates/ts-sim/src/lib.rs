//! What-if simulation for transit-spread.
//!
//! Provides:
//! - Baseline vs. edited spread comparisons, single, batched and cumulative
//! - Editing sessions with undo and reset
//! - A background worker whose newer submissions supersede older ones

pub mod progress;
pub mod session;
pub mod simulator;
pub mod worker;

pub use progress::{SimProgressEvent, SimStage};
pub use session::Session;
pub use simulator::{Baseline, Comparison, Simulator};
pub use worker::{SimulationWorker, WorkerMessage};
