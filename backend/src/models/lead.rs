//! Lead model
//!
//! A lead is a unit of incoming work. Its inputs are immutable; its
//! allocation outputs are written exactly once by the engine.
//!
//! Leads must be supplied in non-decreasing `created` order. Decay and
//! round-robin recency both depend on it.

use crate::models::advisor::{AdvisorId, Portfolio};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Model output for one (lead, advisor) pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdvisorPropensity {
    /// Value used for scoring
    pub propensity: f64,

    /// Unmodified model output kept for reporting (defaults to `propensity`)
    #[serde(default)]
    pub assessed_propensity: Option<f64>,
}

impl AdvisorPropensity {
    pub fn new(propensity: f64) -> Self {
        Self {
            propensity,
            assessed_propensity: None,
        }
    }

    pub fn assessed(&self) -> f64 {
        self.assessed_propensity.unwrap_or(self.propensity)
    }
}

/// Allocation outputs, set once when the lead is committed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeadAllocation {
    pub advisor_id: AdvisorId,

    /// Advisor's `current_allotment` immediately after the commit
    pub allotment_at_allocation: f64,

    pub assessed_propensity: f64,

    /// Propensity the policy scored with (after any advisor override)
    pub allocated_propensity: f64,
}

/// An incoming lead
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use lead_allocator_core_rs::{AdvisorId, Lead, Portfolio};
///
/// let created = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap().and_hms_opt(10, 0, 0).unwrap();
/// let lead = Lead::new(1, created, Portfolio::Domestic, 0.4)
///     .with_propensity(AdvisorId(0), 0.6)
///     .with_cluster("north");
///
/// assert_eq!(lead.propensity_for(AdvisorId(0)).map(|p| p.propensity), Some(0.6));
/// assert!(lead.allocation().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    lead_id: i64,

    created: NaiveDateTime,

    portfolio: Portfolio,

    /// Advisor-independent baseline conversion estimate
    inherent: f64,

    #[serde(default)]
    cluster: Option<String>,

    #[serde(default)]
    per_advisor: BTreeMap<AdvisorId, AdvisorPropensity>,

    #[serde(default)]
    allocation: Option<LeadAllocation>,
}

impl Lead {
    pub fn new(lead_id: i64, created: NaiveDateTime, portfolio: Portfolio, inherent: f64) -> Self {
        Self {
            lead_id,
            created,
            portfolio,
            inherent,
            cluster: None,
            per_advisor: BTreeMap::new(),
            allocation: None,
        }
    }

    pub fn with_cluster(mut self, cluster: impl Into<String>) -> Self {
        self.cluster = Some(cluster.into());
        self
    }

    pub fn with_propensity(mut self, advisor_id: AdvisorId, propensity: f64) -> Self {
        self.per_advisor
            .insert(advisor_id, AdvisorPropensity::new(propensity));
        self
    }

    pub fn with_assessed_propensity(
        mut self,
        advisor_id: AdvisorId,
        propensity: f64,
        assessed: f64,
    ) -> Self {
        self.per_advisor.insert(
            advisor_id,
            AdvisorPropensity {
                propensity,
                assessed_propensity: Some(assessed),
            },
        );
        self
    }

    pub fn lead_id(&self) -> i64 {
        self.lead_id
    }

    pub fn created(&self) -> NaiveDateTime {
        self.created
    }

    pub fn portfolio(&self) -> Portfolio {
        self.portfolio
    }

    pub fn inherent(&self) -> f64 {
        self.inherent
    }

    pub fn cluster(&self) -> Option<&str> {
        self.cluster.as_deref()
    }

    pub fn propensity_for(&self, advisor_id: AdvisorId) -> Option<&AdvisorPropensity> {
        self.per_advisor.get(&advisor_id)
    }

    pub fn per_advisor(&self) -> &BTreeMap<AdvisorId, AdvisorPropensity> {
        &self.per_advisor
    }

    pub fn allocation(&self) -> Option<&LeadAllocation> {
        self.allocation.as_ref()
    }

    pub fn allocated_advisor(&self) -> Option<AdvisorId> {
        self.allocation.map(|a| a.advisor_id)
    }

    /// Input copy of this lead with any allocation outputs cleared
    pub fn unallocated(&self) -> Self {
        Self {
            allocation: None,
            ..self.clone()
        }
    }

    pub(crate) fn set_allocation(&mut self, allocation: LeadAllocation) {
        debug_assert!(self.allocation.is_none(), "lead allocated twice");
        self.allocation = Some(allocation);
    }
}
