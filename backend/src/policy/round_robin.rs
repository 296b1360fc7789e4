//! Round Robin Policy
//!
//! Hands leads out in rotation: the advisor whose last assignment is oldest
//! (or who has never been assigned) goes first.
//!
//! # Behavior
//!
//! - **Constrained**: rotates among portfolio-eligible advisors, preferring
//!   the first advisor in rotation who is in working hours. If nobody is, the
//!   first advisor in rotation is used anyway.
//! - **Unconstrained**: rotates through the whole pool, ignoring portfolio
//!   and working hours.

use super::{order_by, AllocationPolicy, Candidate, CandidateScope, RankContext};
use crate::models::advisor::AdvisorId;

/// Rotation by `last_allocated_id` (-1 = never allocated, sorts first)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundRobinPolicy {
    constrained: bool,
}

impl RoundRobinPolicy {
    pub fn constrained() -> Self {
        Self { constrained: true }
    }

    pub fn unconstrained() -> Self {
        Self { constrained: false }
    }
}

impl AllocationPolicy for RoundRobinPolicy {
    fn name(&self) -> &'static str {
        if self.constrained {
            "Round Robin"
        } else {
            "Round Robin (Unconstrained)"
        }
    }

    fn scope(&self) -> CandidateScope {
        if self.constrained {
            CandidateScope::Eligible
        } else {
            CandidateScope::WholePool
        }
    }

    fn falls_back_out_of_hours(&self) -> bool {
        self.constrained
    }

    fn rank(&self, candidates: &[Candidate], _ctx: &RankContext) -> Vec<AdvisorId> {
        if self.constrained {
            // First in-hours advisor in rotation, else first in rotation
            order_by(candidates, |a, b| {
                b.in_working_hours
                    .cmp(&a.in_working_hours)
                    .then(a.last_allocated_id.cmp(&b.last_allocated_id))
            })
        } else {
            order_by(candidates, |a, b| a.last_allocated_id.cmp(&b.last_allocated_id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::test_support::{candidate, ctx, ids};

    #[test]
    fn test_never_allocated_goes_first() {
        let mut a = candidate(0, 0.5, 1.0);
        a.last_allocated_id = 4;
        let b = candidate(1, 0.5, 0.0);

        let order = RoundRobinPolicy::constrained().rank(&[a, b], &ctx());
        assert_eq!(order, ids(&[1, 0]));
    }

    #[test]
    fn test_prefers_in_hours_advisor_later_in_rotation() {
        let mut a = candidate(0, 0.5, 0.0);
        a.in_working_hours = false;
        let mut b = candidate(1, 0.5, 1.0);
        b.last_allocated_id = 9;

        let order = RoundRobinPolicy::constrained().rank(&[a, b], &ctx());
        assert_eq!(order, ids(&[1, 0]));
    }

    #[test]
    fn test_falls_back_to_rotation_when_nobody_in_hours() {
        let mut a = candidate(0, 0.5, 0.0);
        a.in_working_hours = false;
        a.last_allocated_id = 7;
        let mut b = candidate(1, 0.5, 0.0);
        b.in_working_hours = false;
        b.last_allocated_id = 3;

        let order = RoundRobinPolicy::constrained().rank(&[a, b], &ctx());
        assert_eq!(order, ids(&[1, 0]));
    }

    #[test]
    fn test_unconstrained_ignores_working_hours() {
        let mut a = candidate(0, 0.5, 0.0);
        a.in_working_hours = false;
        let mut b = candidate(1, 0.5, 0.0);
        b.last_allocated_id = 2;

        let policy = RoundRobinPolicy::unconstrained();
        assert_eq!(policy.scope(), CandidateScope::WholePool);
        assert_eq!(policy.rank(&[a, b], &ctx()), ids(&[0, 1]));
    }
}
