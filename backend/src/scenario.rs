//! Scenario files
//!
//! A scenario is everything one pass needs, as a single JSON document:
//!
//! ```json
//! {
//!   "mode": "MostSuitableAggressive",
//!   "parameters": [],
//!   "calendar": { "Adelaide": { "start_hour": 9, "end_hour": 17, "timezone_offset": 0 } },
//!   "advisors": [ ... ],
//!   "leads": [ ... ]
//! }
//! ```
//!
//! `mode` is a registry id, display name or variant key. `calendar` is
//! optional and defaults to the two-location calendar.

use crate::core::calendar::WorkingHoursCalendar;
use crate::error::AllocationError;
use crate::models::advisor::Advisor;
use crate::models::lead::Lead;
use crate::orchestrator::engine::{simulate, AllocationOutcome, EngineConfig};
use crate::policy::{parameter_values, AllocationMode, PolicyConfig};
use serde::Deserialize;

/// How a scenario names its mode
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ModeSelector {
    Id(u32),
    Name(String),
}

impl ModeSelector {
    pub fn resolve(&self) -> Result<AllocationMode, AllocationError> {
        let mode = match self {
            ModeSelector::Id(id) => AllocationMode::from_id(*id),
            ModeSelector::Name(name) => AllocationMode::from_name(name),
        };
        mode.ok_or_else(|| AllocationError::configuration(format!("unknown mode {:?}", self)))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub mode: ModeSelector,

    #[serde(default)]
    pub parameters: Vec<serde_json::Value>,

    #[serde(default)]
    pub calendar: Option<WorkingHoursCalendar>,

    pub advisors: Vec<Advisor>,

    pub leads: Vec<Lead>,
}

impl Scenario {
    pub fn from_json_str(json: &str) -> Result<Self, AllocationError> {
        serde_json::from_str(json)
            .map_err(|e| AllocationError::configuration(format!("invalid scenario: {}", e)))
    }

    pub fn mode(&self) -> Result<AllocationMode, AllocationError> {
        self.mode.resolve()
    }

    /// Resolve mode and parameters into an engine configuration
    pub fn engine_config(&self) -> Result<EngineConfig, AllocationError> {
        let mode = self.mode()?;
        let values = parameter_values(&self.parameters)?;
        let policy = PolicyConfig::from_parameters(mode, &values)?;

        let config = EngineConfig::new(policy);
        Ok(match &self.calendar {
            Some(calendar) => config.with_calendar(calendar.clone()),
            None => config,
        })
    }

    pub fn run(&self) -> Result<AllocationOutcome, AllocationError> {
        simulate(self.engine_config()?, &self.advisors, self.leads.clone())
    }
}
