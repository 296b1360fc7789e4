//! Allocation state
//!
//! Holds the mutable state threaded through one allocation pass:
//! - `AdvisorTable`: arena of advisors with an id -> slot lookup
//! - `ClusterLedger`: per-cluster assignment counts
//!
//! # Critical Invariants
//!
//! 1. **Unique identity**: each `AdvisorId` appears exactly once
//! 2. **Non-negativity**: every `current_allotment` stays >= 0
//! 3. **Conservation**: sum of `total_allotment` equals leads committed

use crate::error::AllocationError;
use crate::models::advisor::{Advisor, AdvisorId, Portfolio};
use std::collections::{BTreeMap, HashMap};

/// Advisor arena keyed by explicit id
///
/// Storage order is the encounter order used for stable tie-breaking;
/// identity never depends on it.
///
/// # Example
///
/// ```rust
/// use lead_allocator_core_rs::{Advisor, AdvisorId, AdvisorTable, Portfolio};
///
/// let table = AdvisorTable::new(vec![
///     Advisor::new(AdvisorId(10), "A", Portfolio::Domestic, "Adelaide"),
///     Advisor::new(AdvisorId(4), "B", Portfolio::Canada, "Canada"),
/// ])
/// .unwrap();
///
/// assert_eq!(table.len(), 2);
/// assert_eq!(table.get(AdvisorId(4)).unwrap().name(), "B");
/// assert_eq!(table.eligible_for(Portfolio::Domestic), vec![AdvisorId(10)]);
/// ```
#[derive(Debug, Clone)]
pub struct AdvisorTable {
    advisors: Vec<Advisor>,
    slots: HashMap<AdvisorId, usize>,
}

impl AdvisorTable {
    /// Build a table, rejecting an empty pool and duplicate ids
    pub fn new(advisors: Vec<Advisor>) -> Result<Self, AllocationError> {
        if advisors.is_empty() {
            return Err(AllocationError::configuration(
                "advisor table must contain at least one advisor",
            ));
        }

        let mut slots = HashMap::with_capacity(advisors.len());
        for (slot, advisor) in advisors.iter().enumerate() {
            if slots.insert(advisor.id(), slot).is_some() {
                return Err(AllocationError::configuration(format!(
                    "duplicate advisor id {}",
                    advisor.id()
                )));
            }
        }

        Ok(Self { advisors, slots })
    }

    pub fn len(&self) -> usize {
        self.advisors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.advisors.is_empty()
    }

    pub fn get(&self, id: AdvisorId) -> Option<&Advisor> {
        self.slots.get(&id).map(|&slot| &self.advisors[slot])
    }

    pub fn get_mut(&mut self, id: AdvisorId) -> Option<&mut Advisor> {
        match self.slots.get(&id) {
            Some(&slot) => self.advisors.get_mut(slot),
            None => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Advisor> {
        self.advisors.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Advisor> {
        self.advisors.iter_mut()
    }

    pub fn ids(&self) -> Vec<AdvisorId> {
        self.advisors.iter().map(Advisor::id).collect()
    }

    /// Advisors serving `portfolio`, in storage order
    pub fn eligible_for(&self, portfolio: Portfolio) -> Vec<AdvisorId> {
        self.advisors
            .iter()
            .filter(|advisor| advisor.portfolio() == portfolio)
            .map(Advisor::id)
            .collect()
    }

    pub fn advisors(&self) -> &[Advisor] {
        &self.advisors
    }

    pub fn into_advisors(self) -> Vec<Advisor> {
        self.advisors
    }

    /// Sum of `total_allotment` across the pool
    pub fn total_assigned(&self) -> u64 {
        self.advisors
            .iter()
            .map(|advisor| advisor.total_allotment() as u64)
            .sum()
    }
}

/// Leads assigned to each advisor, bucketed by lead cluster
///
/// Leads without a cluster share a single unclustered bucket.
#[derive(Debug, Clone, Default)]
pub struct ClusterLedger {
    counts: BTreeMap<Option<String>, BTreeMap<AdvisorId, u32>>,
}

impl ClusterLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, cluster: Option<&str>, advisor_id: AdvisorId) -> u32 {
        self.counts
            .get(&cluster.map(str::to_string))
            .and_then(|bucket| bucket.get(&advisor_id))
            .copied()
            .unwrap_or(0)
    }

    pub fn record(&mut self, cluster: Option<&str>, advisor_id: AdvisorId) {
        *self
            .counts
            .entry(cluster.map(str::to_string))
            .or_default()
            .entry(advisor_id)
            .or_insert(0) += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn advisor(id: u32, portfolio: Portfolio) -> Advisor {
        Advisor::new(AdvisorId(id), format!("CA {}", id), portfolio, "Adelaide")
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = AdvisorTable::new(vec![
            advisor(1, Portfolio::Domestic),
            advisor(1, Portfolio::Canada),
        ])
        .unwrap_err();
        assert!(matches!(err, AllocationError::Configuration { .. }));
    }

    #[test]
    fn test_empty_table_rejected() {
        assert!(AdvisorTable::new(vec![]).is_err());
    }

    #[test]
    fn test_eligibility_preserves_storage_order() {
        let table = AdvisorTable::new(vec![
            advisor(5, Portfolio::Domestic),
            advisor(2, Portfolio::Canada),
            advisor(0, Portfolio::Domestic),
        ])
        .unwrap();
        assert_eq!(
            table.eligible_for(Portfolio::Domestic),
            vec![AdvisorId(5), AdvisorId(0)]
        );
    }

    #[test]
    fn test_cluster_ledger_buckets_independently() {
        let mut ledger = ClusterLedger::new();
        ledger.record(Some("north"), AdvisorId(0));
        ledger.record(Some("north"), AdvisorId(0));
        ledger.record(None, AdvisorId(0));

        assert_eq!(ledger.count(Some("north"), AdvisorId(0)), 2);
        assert_eq!(ledger.count(None, AdvisorId(0)), 1);
        assert_eq!(ledger.count(Some("south"), AdvisorId(0)), 0);
    }
}
