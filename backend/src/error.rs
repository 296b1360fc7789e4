//! Allocation errors
//!
//! Every error aborts the whole pass. The engine is a deterministic
//! computation, so none of these are retryable without changing the input.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::models::advisor::{AdvisorId, Portfolio};

/// Errors surfaced by configuration, validation and the allocation pass
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AllocationError {
    /// Policy parameters or input tables are unusable
    #[error("Invalid configuration: {message}")]
    Configuration { message: String },

    /// No advisor serves the lead's portfolio
    #[error("No eligible advisor for lead {lead_id} (portfolio {portfolio})")]
    NoEligibleAdvisor { lead_id: i64, portfolio: Portfolio },

    /// Leads are not in non-decreasing `created` order
    #[error("Lead {lead_id} created at {created} precedes previous lead created at {previous}")]
    InputOrdering {
        lead_id: i64,
        created: NaiveDateTime,
        previous: NaiveDateTime,
    },

    /// A lead has no propensity entry for an advisor that must be scored
    #[error("Lead {lead_id} has no propensity for advisor {advisor_id}")]
    MissingPropensity { lead_id: i64, advisor_id: AdvisorId },

    /// Report could not be encoded
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// `step()` called after the pass completed or aborted
    #[error("Allocation pass already finished")]
    PassFinished,
}

impl AllocationError {
    pub fn configuration(message: impl Into<String>) -> Self {
        AllocationError::Configuration {
            message: message.into(),
        }
    }
}
