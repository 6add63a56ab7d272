//! Shared application service layer for transit-spread.
//!
//! This crate gives CLI and GUI frontends one interface for snapshot
//! loading, what-if simulation, and report persistence.

pub mod error;
pub mod simulation_service;
pub mod snapshot_service;

// Re-export key types for convenience
pub use error::{AppError, AppResult};
pub use simulation_service::{
    SimulationOptions, SimulationRequest, SimulationResponse, build_report, list_reports,
    load_report, run_simulation,
};
pub use snapshot_service::{
    SnapshotSummary, build_baseline, build_graph, build_simulator, load_edits, load_snapshot,
    summarize,
};
