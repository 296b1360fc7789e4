//! Post-pass rollups
//!
//! Consumes the advisor and lead tables a completed pass hands back. Nothing
//! here mutates engine state.

pub mod summary;

pub use summary::{aggregate, AdvisorSummary, FleetSummary, ResultSummary};
