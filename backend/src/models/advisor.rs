//! Advisor model
//!
//! Represents a course advisor ("CA") that leads are assigned to.
//! Each advisor has:
//! - Static profile (portfolio, location, decay modifier, optional overrides)
//! - Live workload state mutated by the engine during a pass
//!
//! # Workload counters
//!
//! - `current_allotment` (f64) decays as simulated time passes, never below 0
//! - `total_allotment` (u32) counts every lead ever assigned, never decays
//!
//! Both counters increase by exactly 1 when a lead is committed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable advisor identifier
///
/// Identity is explicit: storage order in the advisor table does not matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdvisorId(pub u32);

impl fmt::Display for AdvisorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Market segment served by an advisor and targeted by a lead
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Portfolio {
    Domestic,
    Canada,
}

impl fmt::Display for Portfolio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Portfolio::Domestic => write!(f, "Domestic"),
            Portfolio::Canada => write!(f, "Canada"),
        }
    }
}

fn never_allocated() -> i64 {
    -1
}

fn unit_modifier() -> f64 {
    1.0
}

/// Represents an advisor in the allocation pool
///
/// # Example
/// ```
/// use lead_allocator_core_rs::{Advisor, AdvisorId, Portfolio};
///
/// let advisor = Advisor::new(AdvisorId(0), "Alex", Portfolio::Domestic, "Adelaide")
///     .with_allotment_limit(3.0);
///
/// assert_eq!(advisor.current_allotment(), 0.0);
/// assert_eq!(advisor.total_allotment(), 0);
/// assert_eq!(advisor.last_allocated_id(), -1);
/// assert_eq!(advisor.allotment_limit(), Some(3.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advisor {
    id: AdvisorId,

    name: String,

    portfolio: Portfolio,

    /// Key into the working-hours calendar
    location: String,

    /// Multiplier applied to the daily linear decay
    #[serde(default = "unit_modifier")]
    decay_modifier: f64,

    /// Per-advisor tolerance override (None = policy-wide tolerance)
    #[serde(default)]
    allotment_limit: Option<f64>,

    /// Fixed propensity replacing the lead-specific estimate for this advisor
    #[serde(default)]
    overall_propensity: Option<f64>,

    /// Live workload, decays over simulated time
    #[serde(default)]
    current_allotment: f64,

    /// Leads ever assigned
    #[serde(default)]
    total_allotment: u32,

    /// Lead id of the most recent assignment (-1 = never allocated)
    #[serde(default = "never_allocated")]
    last_allocated_id: i64,

    /// Sum of `inherent` over leads received
    #[serde(default)]
    running_inherent: f64,
}

impl Advisor {
    /// Create an advisor with zeroed workload and no overrides
    pub fn new(
        id: AdvisorId,
        name: impl Into<String>,
        portfolio: Portfolio,
        location: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            portfolio,
            location: location.into(),
            decay_modifier: 1.0,
            allotment_limit: None,
            overall_propensity: None,
            current_allotment: 0.0,
            total_allotment: 0,
            last_allocated_id: -1,
            running_inherent: 0.0,
        }
    }

    pub fn with_decay_modifier(mut self, decay_modifier: f64) -> Self {
        self.decay_modifier = decay_modifier;
        self
    }

    pub fn with_allotment_limit(mut self, limit: f64) -> Self {
        self.allotment_limit = Some(limit);
        self
    }

    pub fn with_overall_propensity(mut self, propensity: f64) -> Self {
        self.overall_propensity = Some(propensity);
        self
    }

    /// Copy of this advisor with all live workload state zeroed
    ///
    /// Every pass starts from this, never from a previous pass's table.
    pub fn fresh(&self) -> Self {
        Self {
            current_allotment: 0.0,
            total_allotment: 0,
            last_allocated_id: -1,
            running_inherent: 0.0,
            ..self.clone()
        }
    }

    pub fn id(&self) -> AdvisorId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn portfolio(&self) -> Portfolio {
        self.portfolio
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn decay_modifier(&self) -> f64 {
        self.decay_modifier
    }

    pub fn allotment_limit(&self) -> Option<f64> {
        self.allotment_limit
    }

    pub fn overall_propensity(&self) -> Option<f64> {
        self.overall_propensity
    }

    pub fn current_allotment(&self) -> f64 {
        self.current_allotment
    }

    pub fn total_allotment(&self) -> u32 {
        self.total_allotment
    }

    pub fn last_allocated_id(&self) -> i64 {
        self.last_allocated_id
    }

    pub fn running_inherent(&self) -> f64 {
        self.running_inherent
    }

    /// Propensity used for scoring: the override if present, else the lead's estimate
    pub fn effective_propensity(&self, lead_propensity: f64) -> f64 {
        self.overall_propensity.unwrap_or(lead_propensity)
    }

    /// Subtract `amount` from the live allotment, clamped at zero
    pub(crate) fn decay_linear(&mut self, amount: f64) {
        self.current_allotment = (self.current_allotment - amount).max(0.0);
    }

    /// Multiply the live allotment by `factor` (expected in `[0, 1]`)
    pub(crate) fn decay_scale(&mut self, factor: f64) {
        self.current_allotment = (self.current_allotment * factor).max(0.0);
    }

    /// Record a committed lead; both allotment counters increase by 1
    pub(crate) fn record_allocation(&mut self, lead_id: i64, inherent: f64) {
        self.current_allotment += 1.0;
        self.total_allotment += 1;
        self.last_allocated_id = lead_id;
        self.running_inherent += inherent;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_decay_clamps_at_zero() {
        let mut advisor = Advisor::new(AdvisorId(0), "A", Portfolio::Domestic, "Adelaide");
        advisor.record_allocation(1, 0.2);
        advisor.decay_linear(5.0);
        assert_eq!(advisor.current_allotment(), 0.0);
        assert_eq!(advisor.total_allotment(), 1);
    }

    #[test]
    fn test_fresh_zeroes_workload_but_keeps_profile() {
        let mut advisor = Advisor::new(AdvisorId(3), "A", Portfolio::Canada, "Canada")
            .with_decay_modifier(0.5)
            .with_overall_propensity(0.3);
        advisor.record_allocation(7, 0.4);

        let fresh = advisor.fresh();
        assert_eq!(fresh.current_allotment(), 0.0);
        assert_eq!(fresh.total_allotment(), 0);
        assert_eq!(fresh.last_allocated_id(), -1);
        assert_eq!(fresh.running_inherent(), 0.0);
        assert_eq!(fresh.decay_modifier(), 0.5);
        assert_eq!(fresh.overall_propensity(), Some(0.3));
    }

    #[test]
    fn test_deserialize_defaults_live_state() {
        let json = r#"{"id": 2, "name": "Sam", "portfolio": "Domestic", "location": "Adelaide"}"#;
        let advisor: Advisor = serde_json::from_str(json).unwrap();
        assert_eq!(advisor.id(), AdvisorId(2));
        assert_eq!(advisor.decay_modifier(), 1.0);
        assert_eq!(advisor.last_allocated_id(), -1);
        assert_eq!(advisor.allotment_limit(), None);
    }
}
