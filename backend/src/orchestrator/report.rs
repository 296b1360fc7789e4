//! Run Report - serializable outcome of one pass
//!
//! Bundles per-lead outputs, per-advisor rows and the fleet summary with a
//! SHA-256 fingerprint, so two runs can be compared for identical results
//! without diffing the full tables.
//!
//! # Critical Invariants
//!
//! - **Determinism**: same advisors + leads + policy produce the same fingerprint
//! - **Coverage**: the fingerprint covers every output field, not the event log

use crate::error::AllocationError;
use crate::models::advisor::{AdvisorId, Portfolio};
use crate::models::lead::Lead;
use crate::orchestrator::engine::AllocationOutcome;
use crate::policy::PolicyConfig;
use crate::results::{aggregate, AdvisorSummary, FleetSummary};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One lead row as exported after a pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadRecord {
    pub lead_id: i64,
    pub created: NaiveDateTime,
    pub portfolio: Portfolio,
    pub cluster: Option<String>,
    pub inherent: f64,
    pub allocated_ca: Option<AdvisorId>,
    pub allotment_at_allocation: Option<f64>,
    pub assessed_propensity: Option<f64>,
    pub allocated_propensity: Option<f64>,
}

impl From<&Lead> for LeadRecord {
    fn from(lead: &Lead) -> Self {
        let allocation = lead.allocation();
        LeadRecord {
            lead_id: lead.lead_id(),
            created: lead.created(),
            portfolio: lead.portfolio(),
            cluster: lead.cluster().map(str::to_string),
            inherent: lead.inherent(),
            allocated_ca: allocation.map(|a| a.advisor_id),
            allotment_at_allocation: allocation.map(|a| a.allotment_at_allocation),
            assessed_propensity: allocation.map(|a| a.assessed_propensity),
            allocated_propensity: allocation.map(|a| a.allocated_propensity),
        }
    }
}

/// Complete report of one pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub mode_id: u32,
    pub mode: String,
    pub policy: PolicyConfig,
    pub summary: FleetSummary,
    pub advisors: Vec<AdvisorSummary>,
    pub leads: Vec<LeadRecord>,

    /// Hex SHA-256 of the outputs above
    pub fingerprint: String,
}

/// Fingerprinted fields, borrowed so hashing never clones the tables
#[derive(Serialize)]
struct Fingerprinted<'a> {
    policy: &'a PolicyConfig,
    summary: &'a FleetSummary,
    advisors: &'a [AdvisorSummary],
    leads: &'a [LeadRecord],
}

impl RunReport {
    pub fn from_outcome(outcome: &AllocationOutcome) -> Result<Self, AllocationError> {
        let summary = aggregate(&outcome.advisors, &outcome.leads);
        let leads: Vec<LeadRecord> = outcome.leads.iter().map(LeadRecord::from).collect();
        let mode = outcome.policy.mode();

        let fingerprint = compute_fingerprint(&Fingerprinted {
            policy: &outcome.policy,
            summary: &summary.fleet,
            advisors: &summary.advisors,
            leads: &leads,
        })?;

        Ok(RunReport {
            mode_id: mode.id(),
            mode: mode.name().to_string(),
            policy: outcome.policy.clone(),
            summary: summary.fleet,
            advisors: summary.advisors,
            leads,
            fingerprint,
        })
    }

    /// Recompute the fingerprint from the report's own fields
    pub fn verify(&self) -> Result<bool, AllocationError> {
        let expected = compute_fingerprint(&Fingerprinted {
            policy: &self.policy,
            summary: &self.summary,
            advisors: &self.advisors,
            leads: &self.leads,
        })?;
        Ok(expected == self.fingerprint)
    }

    pub fn to_json_pretty(&self) -> Result<String, AllocationError> {
        serde_json::to_string_pretty(self).map_err(|e| {
            AllocationError::Serialization(format!("Report serialization failed: {}", e))
        })
    }
}

/// SHA256 over the JSON encoding of `value`
///
/// Struct fields serialize in declaration order and floats in their shortest
/// round-trip form, so equal values always hash equally.
pub fn compute_fingerprint<T: Serialize>(value: &T) -> Result<String, AllocationError> {
    let json = serde_json::to_string(value).map_err(|e| {
        AllocationError::Serialization(format!("Fingerprint serialization failed: {}", e))
    })?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}
