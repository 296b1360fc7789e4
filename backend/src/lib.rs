//! Lead Allocator Core - Rust Engine
//!
//! Deterministic lead-to-advisor allocation simulator. Replays a time-ordered
//! lead table against an advisor pool under a chosen policy, so outcomes
//! (predicted conversions, balance, fairness) can be compared before a
//! policy goes live.
//!
//! # Architecture
//!
//! - **core**: Working-hours calendar and the decay clock
//! - **models**: Domain types (Advisor, Lead, AdvisorTable, EventLog)
//! - **policy**: Ranking policies and the mode registry
//! - **orchestrator**: The allocation pass and its report
//! - **results**: Post-pass summary statistics
//! - **scenario**: JSON scenario loading
//!
//! # Critical Invariants
//!
//! 1. Same advisors + leads + parameters always produce the same allocation
//! 2. Every lead is allocated exactly once, or the pass fails as a whole
//! 3. `current_allotment` never goes negative

// Module declarations
pub mod core;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod policy;
pub mod results;
pub mod scenario;

// Re-exports for convenience
pub use crate::core::calendar::{WorkingHours, WorkingHoursCalendar};
pub use crate::core::time::{DecayConfig, DecayStep, SimulationClock};
pub use error::AllocationError;
pub use models::{
    advisor::{Advisor, AdvisorId, Portfolio},
    event::{Event, EventLog},
    lead::{AdvisorPropensity, Lead, LeadAllocation},
    state::AdvisorTable,
};
pub use orchestrator::{
    simulate, AllocationEngine, AllocationOutcome, EngineConfig, EngineState, RunReport,
    StepResult,
};
pub use policy::{AllocationMode, AllocationPolicy, PolicyConfig};
pub use results::{aggregate, AdvisorSummary, FleetSummary, ResultSummary};
pub use scenario::Scenario;
