//! Scenario file tests

use lead_allocator_core_rs::policy::AllocationMode;
use lead_allocator_core_rs::{AdvisorId, AllocationError, RunReport, Scenario};

const SCENARIO: &str = r#"{
    "mode": "Most Suitable (Fixed allotment tolerance)",
    "parameters": [1, "0", 0, 0],
    "advisors": [
        { "id": 0, "name": "Alex", "portfolio": "Domestic", "location": "Adelaide" },
        { "id": 1, "name": "Blake", "portfolio": "Domestic", "location": "Adelaide" }
    ],
    "leads": [
        { "lead_id": 1, "created": "2021-03-01T10:00:00", "portfolio": "Domestic", "inherent": 0.3,
          "per_advisor": { "0": { "propensity": 0.9 }, "1": { "propensity": 0.1 } } },
        { "lead_id": 2, "created": "2021-03-01T10:05:00", "portfolio": "Domestic", "inherent": 0.3,
          "per_advisor": { "0": { "propensity": 0.9 }, "1": { "propensity": 0.1 } } },
        { "lead_id": 3, "created": "2021-03-01T10:10:00", "portfolio": "Domestic", "inherent": 0.3,
          "per_advisor": { "0": { "propensity": 0.9 }, "1": { "propensity": 0.1 } } }
    ]
}"#;

#[test]
fn test_scenario_runs_end_to_end() {
    let scenario = Scenario::from_json_str(SCENARIO).unwrap();
    assert_eq!(
        scenario.mode().unwrap(),
        AllocationMode::MostSuitableFixedAllotmentTolerance
    );

    let outcome = scenario.run().unwrap();
    let allocated: Vec<Option<AdvisorId>> =
        outcome.leads.iter().map(|l| l.allocated_advisor()).collect();
    assert_eq!(
        allocated,
        vec![Some(AdvisorId(0)), Some(AdvisorId(0)), Some(AdvisorId(1))]
    );

    let report = RunReport::from_outcome(&outcome).unwrap();
    assert_eq!(report.summary.total_leads, 3);
}

#[test]
fn test_mode_by_numeric_id() {
    let json = SCENARIO.replace(
        r#""mode": "Most Suitable (Fixed allotment tolerance)""#,
        r#""mode": 0"#,
    );
    let json = json.replace(r#""parameters": [1, "0", 0, 0]"#, r#""parameters": []"#);
    let scenario = Scenario::from_json_str(&json).unwrap();

    assert_eq!(scenario.mode().unwrap(), AllocationMode::RoundRobin);
    let outcome = scenario.run().unwrap();
    assert_eq!(outcome.leads[1].allocated_advisor(), Some(AdvisorId(1)));
}

#[test]
fn test_missing_parameter_fails_before_pass() {
    let json = SCENARIO.replace(r#""parameters": [1, "0", 0, 0]"#, r#""parameters": [1, 0]"#);
    let scenario = Scenario::from_json_str(&json).unwrap();

    assert!(matches!(
        scenario.engine_config(),
        Err(AllocationError::Configuration { .. })
    ));
    assert!(scenario.run().is_err());
}

#[test]
fn test_custom_calendar_replaces_default() {
    let json = SCENARIO.replace(
        r#""advisors": ["#,
        r#""calendar": { "Adelaide": { "start_hour": 12, "end_hour": 13, "timezone_offset": 0 } },
    "advisors": ["#,
    );
    let scenario = Scenario::from_json_str(&json).unwrap();
    let config = scenario.engine_config().unwrap();

    assert!(config.calendar.contains_location("Adelaide"));
    assert!(!config.calendar.contains_location("Canada"));
}

#[test]
fn test_malformed_scenario_is_configuration_error() {
    let err = Scenario::from_json_str("{ \"mode\": 1 }").unwrap_err();
    assert!(matches!(err, AllocationError::Configuration { .. }));
}
