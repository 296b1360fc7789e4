//! Propensity/Allotment Balance Policies
//!
//! Score each candidate on a weighted blend of how suitable they are and how
//! far their workload sits below the average, then rank:
//! in working hours first, descending score, ascending allotment.
//!
//! # Score terms
//!
//! - propensity (linear): `propensity * w_p`
//! - propensity (proportional): `(propensity - avg_p) / avg_p * w_p`, 0 when
//!   `avg_p <= 0`, with `avg_p` the mean candidate propensity for this lead
//! - allotment: `(avg_load - load) * w_a`, with `avg_load` the mean load of
//!   in-hours candidates (all candidates when nobody is in hours). `load` is
//!   the live allotment, or for the per-cluster variant the number of leads
//!   already received in this lead's cluster
//! - difficulty (difficulty variant only, subtracted):
//!   `(running_inherent - avg_inherent) / avg_inherent * w_d`, 0 when
//!   `avg_inherent <= 0`, with `avg_inherent` the mean `inherent` of the
//!   leads committed so far divided by the in-hours candidate count

use super::{
    ascending, descending, mean, working_hours_first, AllocationPolicy, Candidate, RankContext,
};
use crate::models::advisor::AdvisorId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceVariant {
    Linear,
    Proportional,
    PerClusterProportional,
    DifficultyProportional,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalancePolicy {
    variant: BalanceVariant,
    propensity_weighting: f64,
    allotment_weighting: f64,
    difficulty_weighting: f64,
}

impl BalancePolicy {
    pub fn new(variant: BalanceVariant, propensity_weighting: f64, allotment_weighting: f64) -> Self {
        Self {
            variant,
            propensity_weighting,
            allotment_weighting,
            difficulty_weighting: 0.0,
        }
    }

    pub fn with_difficulty_weighting(mut self, difficulty_weighting: f64) -> Self {
        self.difficulty_weighting = difficulty_weighting;
        self
    }

    pub fn variant(&self) -> BalanceVariant {
        self.variant
    }

    fn load(&self, candidate: &Candidate) -> f64 {
        match self.variant {
            BalanceVariant::PerClusterProportional => candidate.cluster_allotment as f64,
            _ => candidate.current_allotment,
        }
    }

    /// Score every candidate, in candidate order
    pub fn scores(&self, candidates: &[Candidate], ctx: &RankContext) -> Vec<f64> {
        let in_hours: Vec<&Candidate> = candidates.iter().filter(|c| c.in_working_hours).collect();
        let reference: Vec<&Candidate> = if in_hours.is_empty() {
            candidates.iter().collect()
        } else {
            in_hours
        };

        let average_load = mean(reference.iter().map(|c| self.load(c))).unwrap_or(0.0);
        let average_propensity = mean(candidates.iter().map(|c| c.propensity)).unwrap_or(0.0);
        let mean_inherent_seen = if ctx.leads_seen == 0 {
            0.0
        } else {
            ctx.inherent_seen / ctx.leads_seen as f64
        };
        let average_inherent = mean_inherent_seen / reference.len().max(1) as f64;

        candidates
            .iter()
            .map(|c| {
                let propensity_score = match self.variant {
                    BalanceVariant::Linear => c.propensity * self.propensity_weighting,
                    _ if average_propensity > 0.0 => {
                        (c.propensity - average_propensity) / average_propensity
                            * self.propensity_weighting
                    }
                    _ => 0.0,
                };

                let allotment_score = (average_load - self.load(c)) * self.allotment_weighting;

                let difficulty_score = match self.variant {
                    BalanceVariant::DifficultyProportional if average_inherent > 0.0 => {
                        (c.running_inherent - average_inherent) / average_inherent
                            * self.difficulty_weighting
                    }
                    _ => 0.0,
                };

                propensity_score + allotment_score - difficulty_score
            })
            .collect()
    }
}

impl AllocationPolicy for BalancePolicy {
    fn name(&self) -> &'static str {
        match self.variant {
            BalanceVariant::Linear => "Propensity/Allotment Balance (Linear)",
            BalanceVariant::Proportional => "Propensity/Allotment Balance (Proportional)",
            BalanceVariant::PerClusterProportional => {
                "Propensity/Allotment Balance (Per-Cluster, Proportional)"
            }
            BalanceVariant::DifficultyProportional => {
                "Propensity/Allotment/Difficulty Balance (Proportional)"
            }
        }
    }

    fn rank(&self, candidates: &[Candidate], ctx: &RankContext) -> Vec<AdvisorId> {
        let mut scored: Vec<(&Candidate, f64)> =
            candidates.iter().zip(self.scores(candidates, ctx)).collect();

        scored.sort_by(|(a, score_a), (b, score_b)| {
            working_hours_first(a, b)
                .then(descending(*score_a, *score_b))
                .then(ascending(a.current_allotment, b.current_allotment))
        });
        scored.into_iter().map(|(c, _)| c.advisor_id).collect()
    }
}
