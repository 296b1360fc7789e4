//! Allotment Tolerance Policies
//!
//! Most suitable advisor, so long as their live (decayed) allotment is not too
//! far above the least-loaded eligible advisor.
//!
//! # Cap
//!
//! With `lowest` the minimum `current_allotment` among candidates:
//! - fixed:        `cap = lowest + tolerance`
//! - proportional: `cap = lowest * (1 + tolerance / 100)`
//! - per-advisor:  `cap = lowest + advisor.allotment_limit` (policy tolerance
//!   when the advisor has no limit)
//!
//! An advisor is within the cap when `current_allotment <= cap`.
//!
//! # Ranking
//!
//! 1. In working hours first
//! 2. Within cap before over cap
//! 3. Both over cap: least over wins (per-advisor: most headroom left)
//! 4. Descending propensity
//! 5. Ascending allotment

use super::{
    ascending, descending, order_by, working_hours_first, AllocationPolicy, Candidate,
    RankContext,
};
use crate::models::advisor::AdvisorId;
use std::cmp::Ordering;

/// How the allotment cap is derived
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToleranceMode {
    /// Cap is `tolerance` leads above the lowest allotment
    Fixed { tolerance: f64 },

    /// Cap is `tolerance_percent` percent above the lowest allotment
    Proportional { tolerance_percent: f64 },

    /// Cap uses each advisor's own limit, `default_tolerance` when unset
    PerAdvisor { default_tolerance: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AllotmentTolerancePolicy {
    mode: ToleranceMode,
}

impl AllotmentTolerancePolicy {
    pub fn new(mode: ToleranceMode) -> Self {
        Self { mode }
    }

    pub fn fixed(tolerance: f64) -> Self {
        Self::new(ToleranceMode::Fixed { tolerance })
    }

    pub fn proportional(tolerance_percent: f64) -> Self {
        Self::new(ToleranceMode::Proportional { tolerance_percent })
    }

    pub fn per_advisor(default_tolerance: f64) -> Self {
        Self::new(ToleranceMode::PerAdvisor { default_tolerance })
    }

    pub fn mode(&self) -> ToleranceMode {
        self.mode
    }

    /// Allotment cap for `candidate` given the pool's lowest allotment
    pub fn cap_for(&self, candidate: &Candidate, lowest: f64) -> f64 {
        match self.mode {
            ToleranceMode::Fixed { tolerance } => lowest + tolerance,
            ToleranceMode::Proportional { tolerance_percent } => {
                lowest * (1.0 + tolerance_percent / 100.0)
            }
            ToleranceMode::PerAdvisor { default_tolerance } => {
                lowest + candidate.allotment_limit.unwrap_or(default_tolerance)
            }
        }
    }

    fn compare_over_cap(&self, a: &Candidate, cap_a: f64, b: &Candidate, cap_b: f64) -> Ordering {
        match self.mode {
            ToleranceMode::PerAdvisor { .. } => {
                descending(cap_a - a.current_allotment, cap_b - b.current_allotment)
            }
            _ => ascending(a.current_allotment, b.current_allotment),
        }
    }
}

/// Minimum live allotment among candidates
pub fn lowest_allotment(candidates: &[Candidate]) -> f64 {
    candidates
        .iter()
        .map(|c| c.current_allotment)
        .fold(f64::INFINITY, f64::min)
}

impl AllocationPolicy for AllotmentTolerancePolicy {
    fn name(&self) -> &'static str {
        match self.mode {
            ToleranceMode::Fixed { .. } => "Most Suitable (Fixed allotment tolerance)",
            ToleranceMode::Proportional { .. } => "Most Suitable (Proportional allotment tolerance)",
            ToleranceMode::PerAdvisor { .. } => "Most Suitable (Per-advisor allotment tolerance)",
        }
    }

    fn rank(&self, candidates: &[Candidate], _ctx: &RankContext) -> Vec<AdvisorId> {
        let lowest = lowest_allotment(candidates);

        order_by(candidates, |a, b| {
            let cap_a = self.cap_for(a, lowest);
            let cap_b = self.cap_for(b, lowest);
            let a_within = a.current_allotment <= cap_a;
            let b_within = b.current_allotment <= cap_b;

            working_hours_first(a, b)
                .then(b_within.cmp(&a_within))
                .then_with(|| {
                    if !a_within && !b_within {
                        self.compare_over_cap(a, cap_a, b, cap_b)
                    } else {
                        Ordering::Equal
                    }
                })
                .then(descending(a.propensity, b.propensity))
                .then(ascending(a.current_allotment, b.current_allotment))
        })
    }
}
