//! Allocation Policy Module
//!
//! This module defines the ranking interface every assignment policy
//! implements, plus the policy families themselves.
//!
//! # Overview
//!
//! For each lead the engine builds an immutable snapshot of the advisors a
//! policy may choose from (`Candidate`s): the advisor's lead-specific
//! propensity, working-hours flag and decayed workload. A policy turns that
//! snapshot into a strict total order; the first advisor wins. Policies never
//! mutate advisors. The engine commits the winner.
//!
//! # Policy Interface
//!
//! ```rust
//! use lead_allocator_core_rs::policy::{AllocationPolicy, Candidate, RankContext};
//! use lead_allocator_core_rs::AdvisorId;
//!
//! struct LowestIdFirst;
//!
//! impl AllocationPolicy for LowestIdFirst {
//!     fn name(&self) -> &'static str {
//!         "Lowest id first"
//!     }
//!
//!     fn rank(&self, candidates: &[Candidate], _ctx: &RankContext) -> Vec<AdvisorId> {
//!         let mut ids: Vec<AdvisorId> = candidates.iter().map(|c| c.advisor_id).collect();
//!         ids.sort();
//!         ids
//!     }
//! }
//! ```
//!
//! Available policies (see `AllocationMode` for the registry):
//! 1. **Round robin**: rotation by recency, working hours preferred
//! 2. **Most suitable**: highest propensity, optionally ignoring eligibility
//! 3. **Allotment tolerance**: most suitable within a workload cap
//!    (fixed, proportional or per-advisor)
//! 4. **Balance**: weighted propensity/allotment score (linear, proportional,
//!    per-cluster, difficulty-adjusted)
//!
//! Ties always fall through to the next criterion and finally to the
//! candidate order supplied by the engine (advisor table order), so a given
//! input always produces the same ranking.

use crate::models::advisor::AdvisorId;
use std::cmp::Ordering;

pub mod balance;
pub mod config;
pub mod most_suitable;
pub mod round_robin;
pub mod tolerance;

pub use balance::{BalancePolicy, BalanceVariant};
pub use config::{parameter_values, AllocationMode, ParameterSpec, PolicyConfig};
pub use most_suitable::{MostSuitableAggressivePolicy, MostSuitableUnconstrainedPolicy};
pub use round_robin::RoundRobinPolicy;
pub use tolerance::{AllotmentTolerancePolicy, ToleranceMode};

/// Snapshot of one advisor as seen while scoring one lead
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub advisor_id: AdvisorId,

    /// Scoring propensity (after the advisor's overall override)
    pub propensity: f64,

    /// Unmodified model output, carried through for reporting
    pub assessed_propensity: f64,

    pub in_working_hours: bool,

    /// Live allotment after this lead's decay step
    pub current_allotment: f64,

    pub total_allotment: u32,

    pub last_allocated_id: i64,

    pub running_inherent: f64,

    pub allotment_limit: Option<f64>,

    /// Leads previously assigned to this advisor within the lead's cluster
    pub cluster_allotment: u32,
}

/// Pass-level facts available while ranking one lead
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankContext {
    pub lead_id: i64,

    /// Sum of `inherent` over leads committed before this one
    pub inherent_seen: f64,

    /// Leads committed before this one
    pub leads_seen: usize,
}

/// Which advisors a policy chooses from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateScope {
    /// Advisors whose portfolio matches the lead
    Eligible,
    /// The whole advisor pool, ignoring portfolio
    WholePool,
}

/// Ranking function over one lead's candidates
pub trait AllocationPolicy {
    /// Display name
    fn name(&self) -> &'static str;

    fn scope(&self) -> CandidateScope {
        CandidateScope::Eligible
    }

    /// True if a winner outside working hours means the policy fell back
    fn falls_back_out_of_hours(&self) -> bool {
        false
    }

    /// Strict total order over `candidates`, best first
    ///
    /// `candidates` is never empty and arrives in advisor table order.
    fn rank(&self, candidates: &[Candidate], ctx: &RankContext) -> Vec<AdvisorId>;
}

/// Stable sort of `candidates` by `compare`, returning advisor ids best first
pub(crate) fn order_by<F>(candidates: &[Candidate], mut compare: F) -> Vec<AdvisorId>
where
    F: FnMut(&Candidate, &Candidate) -> Ordering,
{
    let mut order: Vec<&Candidate> = candidates.iter().collect();
    order.sort_by(|a, b| compare(a, b));
    order.into_iter().map(|c| c.advisor_id).collect()
}

/// In-hours advisors before out-of-hours advisors
pub(crate) fn working_hours_first(a: &Candidate, b: &Candidate) -> Ordering {
    b.in_working_hours.cmp(&a.in_working_hours)
}

pub(crate) fn ascending(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

pub(crate) fn descending(a: f64, b: f64) -> Ordering {
    ascending(b, a)
}

pub(crate) fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn candidate(id: u32, propensity: f64, current_allotment: f64) -> Candidate {
        Candidate {
            advisor_id: AdvisorId(id),
            propensity,
            assessed_propensity: propensity,
            in_working_hours: true,
            current_allotment,
            total_allotment: current_allotment as u32,
            last_allocated_id: -1,
            running_inherent: 0.0,
            allotment_limit: None,
            cluster_allotment: 0,
        }
    }

    pub fn ctx() -> RankContext {
        RankContext {
            lead_id: 1,
            inherent_seen: 0.0,
            leads_seen: 0,
        }
    }

    pub fn ids(raw: &[u32]) -> Vec<AdvisorId> {
        raw.iter().map(|&id| AdvisorId(id)).collect()
    }
}
