//! Per-advisor and fleet-wide summary statistics
//!
//! For each advisor, over the leads allocated to them:
//!
//! ```text
//! averagePropensity    = cumulativePropensity / totalAllotment      (0 if none)
//! varianceToInherent   = cumulativePropensity / cumulativeInherent - 1 (0 if none)
//! predictedConversions = totalAllotment * averagePropensity
//! ```
//!
//! Fleet totals sum the advisor rows. Propensity sums use each lead's
//! assessed propensity, the value kept for reporting.

use crate::models::advisor::{Advisor, AdvisorId, Portfolio};
use crate::models::lead::Lead;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisorSummary {
    pub advisor_id: AdvisorId,
    pub name: String,
    pub portfolio: Portfolio,
    pub location: String,
    pub current_allotment: f64,
    pub total_allotment: u32,
    pub cumulative_propensity: f64,
    pub cumulative_inherent: f64,
    pub average_propensity: f64,
    pub variance_to_inherent: f64,
    pub predicted_conversions: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetSummary {
    pub total_leads: u64,
    pub cumulative_propensity: f64,
    pub cumulative_inherent: f64,
    pub average_propensity: f64,
    pub average_variance_to_inherent: f64,
    pub predicted_conversions: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSummary {
    /// One row per advisor, in advisor table order
    pub advisors: Vec<AdvisorSummary>,
    pub fleet: FleetSummary,
}

#[derive(Default)]
struct Totals {
    propensity: f64,
    inherent: f64,
}

fn ratio_less_one(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator - 1.0
    }
}

/// Fold a completed pass into summary rows
///
/// Unallocated leads are ignored.
///
/// # Example
/// ```
/// use lead_allocator_core_rs::results::aggregate;
/// use lead_allocator_core_rs::{Advisor, AdvisorId, Portfolio};
///
/// let advisors = vec![Advisor::new(AdvisorId(0), "Alex", Portfolio::Domestic, "Adelaide")];
/// let summary = aggregate(&advisors, &[]);
///
/// assert_eq!(summary.advisors[0].average_propensity, 0.0);
/// assert_eq!(summary.fleet.total_leads, 0);
/// ```
pub fn aggregate(advisors: &[Advisor], leads: &[Lead]) -> ResultSummary {
    let mut totals: HashMap<AdvisorId, Totals> = HashMap::new();
    for lead in leads {
        if let Some(allocation) = lead.allocation() {
            let entry = totals.entry(allocation.advisor_id).or_default();
            entry.propensity += allocation.assessed_propensity;
            entry.inherent += lead.inherent();
        }
    }

    let rows: Vec<AdvisorSummary> = advisors
        .iter()
        .map(|advisor| {
            let (propensity, inherent) = totals
                .get(&advisor.id())
                .map(|t| (t.propensity, t.inherent))
                .unwrap_or((0.0, 0.0));
            let total = advisor.total_allotment();
            let average_propensity = if total == 0 {
                0.0
            } else {
                propensity / total as f64
            };

            AdvisorSummary {
                advisor_id: advisor.id(),
                name: advisor.name().to_string(),
                portfolio: advisor.portfolio(),
                location: advisor.location().to_string(),
                current_allotment: advisor.current_allotment(),
                total_allotment: total,
                cumulative_propensity: propensity,
                cumulative_inherent: inherent,
                average_propensity,
                variance_to_inherent: ratio_less_one(propensity, inherent),
                predicted_conversions: total as f64 * average_propensity,
            }
        })
        .collect();

    let total_leads: u64 = rows.iter().map(|r| r.total_allotment as u64).sum();
    let cumulative_propensity: f64 = rows.iter().map(|r| r.cumulative_propensity).sum();
    let cumulative_inherent: f64 = rows.iter().map(|r| r.cumulative_inherent).sum();

    let fleet = FleetSummary {
        total_leads,
        cumulative_propensity,
        cumulative_inherent,
        average_propensity: if total_leads == 0 {
            0.0
        } else {
            cumulative_propensity / total_leads as f64
        },
        average_variance_to_inherent: ratio_less_one(cumulative_propensity, cumulative_inherent),
        predicted_conversions: rows.iter().map(|r| r.predicted_conversions).sum(),
    };

    ResultSummary {
        advisors: rows,
        fleet,
    }
}
