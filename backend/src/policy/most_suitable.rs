//! Most Suitable Policies
//!
//! Always give the lead to the advisor most likely to convert it.

use super::{
    ascending, descending, order_by, working_hours_first, AllocationPolicy, Candidate,
    CandidateScope, RankContext,
};
use crate::models::advisor::AdvisorId;

/// Whole pool, descending propensity; ties keep table order
#[derive(Debug, Clone, Copy, Default)]
pub struct MostSuitableUnconstrainedPolicy;

impl AllocationPolicy for MostSuitableUnconstrainedPolicy {
    fn name(&self) -> &'static str {
        "Most Suitable (Unconstrained)"
    }

    fn scope(&self) -> CandidateScope {
        CandidateScope::WholePool
    }

    fn rank(&self, candidates: &[Candidate], _ctx: &RankContext) -> Vec<AdvisorId> {
        order_by(candidates, |a, b| descending(a.propensity, b.propensity))
    }
}

/// Eligible advisors: in working hours, then propensity, then fewest leads ever
#[derive(Debug, Clone, Copy, Default)]
pub struct MostSuitableAggressivePolicy;

impl AllocationPolicy for MostSuitableAggressivePolicy {
    fn name(&self) -> &'static str {
        "Most Suitable (Aggressive)"
    }

    fn rank(&self, candidates: &[Candidate], _ctx: &RankContext) -> Vec<AdvisorId> {
        order_by(candidates, |a, b| {
            working_hours_first(a, b)
                .then(descending(a.propensity, b.propensity))
                .then(a.total_allotment.cmp(&b.total_allotment))
                .then(ascending(a.current_allotment, b.current_allotment))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::test_support::{candidate, ctx, ids};

    #[test]
    fn test_unconstrained_ties_keep_encounter_order() {
        let candidates = [
            candidate(3, 0.4, 9.0),
            candidate(1, 0.8, 0.0),
            candidate(2, 0.4, 0.0),
        ];
        let order = MostSuitableUnconstrainedPolicy.rank(&candidates, &ctx());
        assert_eq!(order, ids(&[1, 3, 2]));
    }

    #[test]
    fn test_aggressive_working_hours_beat_propensity() {
        let mut best = candidate(0, 0.9, 0.0);
        best.in_working_hours = false;
        let working = candidate(1, 0.2, 0.0);

        let order = MostSuitableAggressivePolicy.rank(&[best, working], &ctx());
        assert_eq!(order, ids(&[1, 0]));
    }

    #[test]
    fn test_aggressive_total_allotment_breaks_ties() {
        let busy = candidate(0, 0.5, 4.0);
        let idle = candidate(1, 0.5, 1.0);

        let order = MostSuitableAggressivePolicy.rank(&[busy, idle], &ctx());
        assert_eq!(order, ids(&[1, 0]));
    }
}
