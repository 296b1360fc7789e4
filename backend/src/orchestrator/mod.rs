//! Orchestrator - the allocation pass and its report
//!
//! See `engine.rs` for the pass loop and `report.rs` for the exported outcome.

pub mod engine;
pub mod report;

pub use engine::{
    simulate, AllocationEngine, AllocationOutcome, EngineConfig, EngineState, StepResult,
};
pub use report::{compute_fingerprint, LeadRecord, RunReport};
