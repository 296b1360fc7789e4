//! Result aggregation and run report tests

use chrono::NaiveDate;
use lead_allocator_core_rs::orchestrator::{simulate, EngineConfig, RunReport};
use lead_allocator_core_rs::policy::PolicyConfig;
use lead_allocator_core_rs::results::aggregate;
use lead_allocator_core_rs::{Advisor, AdvisorId, Lead, Portfolio};

const A: AdvisorId = AdvisorId(0);
const B: AdvisorId = AdvisorId(1);
const C: AdvisorId = AdvisorId(2);

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn advisors() -> Vec<Advisor> {
    vec![
        Advisor::new(A, "Alex", Portfolio::Domestic, "Adelaide"),
        Advisor::new(B, "Blake", Portfolio::Domestic, "Adelaide"),
        Advisor::new(C, "Casey", Portfolio::Canada, "Canada"),
    ]
}

/// Four Domestic leads alternating between A and B under the aggressive policy
fn leads() -> Vec<Lead> {
    let day = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
    [(0.8, 0.2, 0.4), (0.2, 0.6, 0.2), (0.8, 0.2, 0.4), (0.2, 0.6, 0.4)]
        .iter()
        .enumerate()
        .map(|(i, &(pa, pb, inherent))| {
            Lead::new(
                i as i64 + 1,
                day.and_hms_opt(10, i as u32, 0).unwrap(),
                Portfolio::Domestic,
                inherent,
            )
            .with_propensity(A, pa)
            .with_assessed_propensity(B, pb, pb / 2.0)
        })
        .collect()
}

fn run() -> lead_allocator_core_rs::AllocationOutcome {
    simulate(
        EngineConfig::new(PolicyConfig::MostSuitableAggressive),
        &advisors(),
        leads(),
    )
    .unwrap()
}

#[test]
fn test_per_advisor_rows() {
    let outcome = run();
    let summary = aggregate(&outcome.advisors, &outcome.leads);

    let alex = &summary.advisors[0];
    assert_eq!(alex.total_allotment, 2);
    assert!(close(alex.cumulative_propensity, 1.6));
    assert!(close(alex.cumulative_inherent, 0.8));
    assert!(close(alex.average_propensity, 0.8));
    assert!(close(alex.variance_to_inherent, 1.0));
    assert!(close(alex.predicted_conversions, 1.6));

    // B is scored on 0.6 but reported on the assessed 0.3
    let blake = &summary.advisors[1];
    assert_eq!(blake.total_allotment, 2);
    assert!(close(blake.cumulative_propensity, 0.6));
    assert!(close(blake.cumulative_inherent, 0.6));
    assert!(close(blake.variance_to_inherent, 0.0));
}

#[test]
fn test_idle_advisor_row_is_zeroed() {
    let outcome = run();
    let summary = aggregate(&outcome.advisors, &outcome.leads);

    let casey = &summary.advisors[2];
    assert_eq!(casey.name, "Casey");
    assert_eq!(casey.total_allotment, 0);
    assert_eq!(casey.average_propensity, 0.0);
    assert_eq!(casey.variance_to_inherent, 0.0);
    assert_eq!(casey.predicted_conversions, 0.0);
}

#[test]
fn test_fleet_summary_sums_rows() {
    let outcome = run();
    let fleet = aggregate(&outcome.advisors, &outcome.leads).fleet;

    assert_eq!(fleet.total_leads, 4);
    assert!(close(fleet.cumulative_propensity, 2.2));
    assert!(close(fleet.cumulative_inherent, 1.4));
    assert!(close(fleet.average_propensity, 0.55));
    assert!(close(fleet.average_variance_to_inherent, 2.2 / 1.4 - 1.0));
    assert!(close(fleet.predicted_conversions, 2.2));
}

#[test]
fn test_report_fingerprint_is_reproducible() {
    let first = RunReport::from_outcome(&run()).unwrap();
    let second = RunReport::from_outcome(&run()).unwrap();

    assert_eq!(first.fingerprint, second.fingerprint);
    assert_eq!(first, second);
    assert!(first.verify().unwrap());
    assert_eq!(first.mode_id, 1);
    assert_eq!(first.leads[1].allocated_ca, Some(B));
}

#[test]
fn test_report_fingerprint_detects_changes() {
    let mut report = RunReport::from_outcome(&run()).unwrap();
    report.leads[0].allocated_ca = Some(B);
    assert!(!report.verify().unwrap());
}

#[test]
fn test_report_json_round_trip() {
    let report = RunReport::from_outcome(&run()).unwrap();
    let json = report.to_json_pretty().unwrap();
    let parsed: RunReport = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed.fingerprint, report.fingerprint);
    assert_eq!(parsed.mode, "Most Suitable (Aggressive)");
    assert_eq!(parsed.leads.len(), 4);
}
