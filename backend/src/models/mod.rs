//! Domain models for the allocation simulator

pub mod advisor;
pub mod event;
pub mod lead;
pub mod state;

// Re-exports
pub use advisor::{Advisor, AdvisorId, Portfolio};
pub use event::{DecayKind, Event, EventLog};
pub use lead::{AdvisorPropensity, Lead, LeadAllocation};
pub use state::{AdvisorTable, ClusterLedger};
