//! Policy ranking and configuration tests
//!
//! Policies are pure functions over candidate snapshots, so most of these
//! tests never touch the engine.

use lead_allocator_core_rs::policy::{
    parameter_values, AllocationMode, AllocationPolicy, AllotmentTolerancePolicy, BalancePolicy,
    BalanceVariant, Candidate, CandidateScope, PolicyConfig, RankContext, RoundRobinPolicy,
};
use lead_allocator_core_rs::{AdvisorId, AllocationError, DecayConfig};
use serde_json::json;

fn candidate(id: u32, propensity: f64, current: f64) -> Candidate {
    Candidate {
        advisor_id: AdvisorId(id),
        propensity,
        assessed_propensity: propensity,
        in_working_hours: true,
        current_allotment: current,
        total_allotment: current as u32,
        last_allocated_id: -1,
        running_inherent: 0.0,
        allotment_limit: None,
        cluster_allotment: 0,
    }
}

fn ctx() -> RankContext {
    RankContext {
        lead_id: 1,
        inherent_seen: 0.0,
        leads_seen: 0,
    }
}

fn first(policy: &dyn AllocationPolicy, candidates: &[Candidate]) -> AdvisorId {
    policy.rank(candidates, &ctx())[0]
}

// ============================================================================
// Round robin
// ============================================================================

#[test]
fn test_round_robin_picks_oldest_assignment() {
    let mut recent = candidate(0, 0.9, 0.0);
    recent.last_allocated_id = 7;
    let mut older = candidate(1, 0.1, 0.0);
    older.last_allocated_id = 3;
    let never = candidate(2, 0.1, 0.0);

    let order = RoundRobinPolicy::constrained().rank(&[recent, older, never], &ctx());
    assert_eq!(order, vec![AdvisorId(2), AdvisorId(1), AdvisorId(0)]);
}

#[test]
fn test_round_robin_skips_out_of_hours() {
    let mut asleep = candidate(0, 0.5, 0.0);
    asleep.in_working_hours = false;
    let mut awake = candidate(1, 0.5, 0.0);
    awake.last_allocated_id = 9;

    let policy = RoundRobinPolicy::constrained();
    assert_eq!(first(&policy, &[asleep, awake]), AdvisorId(1));
    assert!(policy.falls_back_out_of_hours());
}

#[test]
fn test_unconstrained_round_robin_ignores_hours() {
    let mut asleep = candidate(0, 0.5, 0.0);
    asleep.in_working_hours = false;
    let mut awake = candidate(1, 0.5, 0.0);
    awake.last_allocated_id = 9;

    let policy = RoundRobinPolicy::unconstrained();
    assert_eq!(first(&policy, &[asleep, awake]), AdvisorId(0));
    assert_eq!(policy.scope(), CandidateScope::WholePool);
    assert!(!policy.falls_back_out_of_hours());
}

// ============================================================================
// Allotment tolerance
// ============================================================================

#[test]
fn test_fixed_tolerance_cap_is_inclusive() {
    let policy = AllotmentTolerancePolicy::fixed(1.0);
    // A at lowest + 1 is still within the cap
    assert_eq!(
        first(&policy, &[candidate(0, 0.9, 1.0), candidate(1, 0.1, 0.0)]),
        AdvisorId(0)
    );
    // one more lead puts A over
    assert_eq!(
        first(&policy, &[candidate(0, 0.9, 2.0), candidate(1, 0.1, 0.0)]),
        AdvisorId(1)
    );
}

#[test]
fn test_proportional_tolerance_at_zero_lowest() {
    // cap = 0 * 1.5 = 0, so only idle advisors are within it
    let policy = AllotmentTolerancePolicy::proportional(50.0);
    assert_eq!(
        first(&policy, &[candidate(0, 0.9, 0.5), candidate(1, 0.1, 0.0)]),
        AdvisorId(1)
    );
}

#[test]
fn test_per_advisor_limit_overrides_default() {
    let policy = AllotmentTolerancePolicy::per_advisor(0.0);
    let mut generous = candidate(0, 0.9, 3.0);
    generous.allotment_limit = Some(5.0);
    let strict = candidate(1, 0.1, 0.0);

    assert_eq!(first(&policy, &[generous, strict]), AdvisorId(0));
}

// ============================================================================
// Balance
// ============================================================================

#[test]
fn test_allotment_weight_overrides_propensity() {
    let policy = BalancePolicy::new(BalanceVariant::Linear, 1.0, 10.0);
    // busy but suitable vs idle
    let busy = candidate(0, 0.9, 3.0);
    let idle = candidate(1, 0.2, 0.0);
    assert_eq!(first(&policy, &[busy, idle]), AdvisorId(1));
}

#[test]
fn test_propensity_weight_overrides_allotment() {
    let policy = BalancePolicy::new(BalanceVariant::Linear, 100.0, 1.0);
    let busy = candidate(0, 0.9, 3.0);
    let idle = candidate(1, 0.2, 0.0);
    assert_eq!(first(&policy, &[busy, idle]), AdvisorId(0));
}

#[test]
fn test_balance_prefers_working_hours_over_score() {
    let policy = BalancePolicy::new(BalanceVariant::Proportional, 1.0, 1.0);
    let mut best = candidate(0, 0.9, 0.0);
    best.in_working_hours = false;
    let working = candidate(1, 0.1, 5.0);
    assert_eq!(first(&policy, &[best, working]), AdvisorId(1));
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_registry_covers_every_mode() {
    assert_eq!(AllocationMode::ALL.len(), 11);
    for mode in AllocationMode::ALL {
        assert_eq!(AllocationMode::from_id(mode.id()), Some(mode));
        assert_eq!(AllocationMode::from_name(mode.name()), Some(mode));
        assert!(!mode.description().is_empty());
    }
}

#[test]
fn test_parameter_schemas_are_per_mode() {
    let names = |mode: AllocationMode| -> Vec<&'static str> {
        mode.parameters().iter().map(|p| p.name).collect()
    };
    assert!(AllocationMode::RoundRobin.parameters().is_empty());
    assert_eq!(
        names(AllocationMode::BalancePerClusterProportional),
        vec!["propensityWeighting", "allotmentWeighting"]
    );
    assert_eq!(
        names(AllocationMode::BalanceDifficultyProportional),
        vec![
            "propensityWeighting",
            "allotmentWeighting",
            "difficultyWeighting",
            "decayPerDay",
            "decayPerCycle",
            "cycleDecayDurationDays",
        ]
    );
}

#[test]
fn test_from_parameters_maps_by_position() {
    let config = PolicyConfig::from_parameters(
        AllocationMode::BalanceLinear,
        &[2.0, 3.0, 0.5, 0.25, 14.0],
    )
    .unwrap();

    assert_eq!(
        config,
        PolicyConfig::LinearBalance {
            propensity_weighting: 2.0,
            allotment_weighting: 3.0,
            decay: DecayConfig::daily(0.5).with_cycle(0.25, 14),
        }
    );
    assert_eq!(config.mode(), AllocationMode::BalanceLinear);
    assert_eq!(config.build().name(), "Propensity/Allotment Balance (Linear)");
}

#[test]
fn test_missing_parameter_is_configuration_error() {
    let err = PolicyConfig::from_parameters(AllocationMode::BalanceLinear, &[2.0, 3.0])
        .unwrap_err();
    assert!(matches!(err, AllocationError::Configuration { .. }));
}

#[test]
fn test_surplus_parameter_is_configuration_error() {
    let err = PolicyConfig::from_parameters(AllocationMode::RoundRobin, &[1.0]).unwrap_err();
    assert!(matches!(err, AllocationError::Configuration { .. }));
}

#[test]
fn test_fractional_cycle_length_rejected() {
    let err = PolicyConfig::from_parameters(
        AllocationMode::MostSuitableFixedAllotmentTolerance,
        &[1.0, 0.0, 0.5, 2.5],
    )
    .unwrap_err();
    assert!(matches!(err, AllocationError::Configuration { .. }));
}

#[test]
fn test_negative_tolerance_rejected() {
    let err = PolicyConfig::from_parameters(
        AllocationMode::MostSuitableFixedAllotmentTolerance,
        &[-1.0, 0.0, 0.0, 0.0],
    )
    .unwrap_err();
    assert!(matches!(err, AllocationError::Configuration { .. }));
}

#[test]
fn test_parameter_values_accept_numeric_strings() {
    let values = parameter_values(&[json!(1), json!("2.5"), json!(" 3 ")]).unwrap();
    assert_eq!(values, vec![1.0, 2.5, 3.0]);

    assert!(parameter_values(&[json!("abc")]).is_err());
    assert!(parameter_values(&[json!(null)]).is_err());
}

#[test]
fn test_policy_config_serde_tagged() {
    let config: PolicyConfig = serde_json::from_value(json!({
        "type": "FixedAllotmentTolerance",
        "allotment_tolerance": 2.0,
        "decay": {
            "decay_per_day": 1.0,
            "decay_per_cycle": 0.0,
            "cycle_decay_duration_days": 0
        }
    }))
    .unwrap();

    assert_eq!(config.mode(), AllocationMode::MostSuitableFixedAllotmentTolerance);
    assert_eq!(config.decay(), Some(DecayConfig::daily(1.0)));
}
