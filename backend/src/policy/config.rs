//! Allocation modes and policy configuration
//!
//! `AllocationMode` is the registry callers pick from: stable id, display
//! name, description and an ordered parameter schema. Parameters arrive as a
//! flat positional vector; `PolicyConfig::from_parameters` maps them onto the
//! named fields of the chosen mode. Each mode's schema is its own: no mode
//! reads another mode's parameter positions.

use super::{
    AllocationPolicy, AllotmentTolerancePolicy, BalancePolicy, BalanceVariant,
    MostSuitableAggressivePolicy, MostSuitableUnconstrainedPolicy, RoundRobinPolicy,
};
use crate::core::time::DecayConfig;
use crate::error::AllocationError;
use serde::{Deserialize, Serialize};

/// One positional parameter of a mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParameterSpec {
    /// Machine name
    pub name: &'static str,
    /// Human-readable label
    pub label: &'static str,
}

const fn param(name: &'static str, label: &'static str) -> ParameterSpec {
    ParameterSpec { name, label }
}

const FIXED_TOLERANCE_PARAMETERS: &[ParameterSpec] = &[
    param("allotmentTolerance", "Allotment Tolerance"),
    param("decayPerDay", "Lead decay per day"),
    param("decayPerCycle", "Lead decay per cycle"),
    param("cycleDecayDurationDays", "Cycle length (days)"),
];

const PROPORTIONAL_TOLERANCE_PARAMETERS: &[ParameterSpec] = &[
    param("allotmentTolerance", "Allotment Tolerance (%)"),
    param("decayPerDay", "Lead decay per day"),
    param("decayPerCycle", "Lead decay per cycle"),
    param("cycleDecayDurationDays", "Cycle length (days)"),
];

const PER_ADVISOR_TOLERANCE_PARAMETERS: &[ParameterSpec] = &[
    param("defaultAllotmentTolerance", "Default Allotment Tolerance"),
    param("decayPerDay", "Lead decay per day"),
    param("decayPerCycle", "Lead decay per cycle"),
    param("cycleDecayDurationDays", "Cycle length (days)"),
];

const LINEAR_BALANCE_PARAMETERS: &[ParameterSpec] = &[
    param("propensityWeighting", "Propensity weighting"),
    param("allotmentWeighting", "Allotment weighting"),
    param("decayPerDay", "Lead decay per day"),
    param("decayPerCycle", "Lead decay per cycle"),
    param("cycleDecayDurationDays", "Cycle length (days)"),
];

const PROPORTIONAL_BALANCE_PARAMETERS: &[ParameterSpec] = &[
    param("propensityWeighting", "Propensity weighting"),
    param("allotmentWeighting", "Allotment weighting"),
    param("decayPerDay", "Lead decay per day"),
    param("decayPerCycle", "Lead decay per cycle"),
    param("cycleDecayDurationDays", "Cycle length (days)"),
];

const PER_CLUSTER_BALANCE_PARAMETERS: &[ParameterSpec] = &[
    param("propensityWeighting", "Propensity weighting"),
    param("allotmentWeighting", "Cluster allotment weighting"),
];

const DIFFICULTY_BALANCE_PARAMETERS: &[ParameterSpec] = &[
    param("propensityWeighting", "Propensity weighting"),
    param("allotmentWeighting", "Allotment weighting"),
    param("difficultyWeighting", "Difficulty weighting"),
    param("decayPerDay", "Lead decay per day"),
    param("decayPerCycle", "Lead decay per cycle"),
    param("cycleDecayDurationDays", "Cycle length (days)"),
];

/// Selectable allocation modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AllocationMode {
    RoundRobin,
    RoundRobinUnconstrained,
    MostSuitableUnconstrained,
    MostSuitableAggressive,
    MostSuitableFixedAllotmentTolerance,
    MostSuitableProportionalAllotmentTolerance,
    MostSuitablePerAdvisorAllotmentTolerance,
    BalanceLinear,
    BalanceProportional,
    BalancePerClusterProportional,
    BalanceDifficultyProportional,
}

impl AllocationMode {
    pub const ALL: [AllocationMode; 11] = [
        AllocationMode::RoundRobin,
        AllocationMode::RoundRobinUnconstrained,
        AllocationMode::MostSuitableUnconstrained,
        AllocationMode::MostSuitableAggressive,
        AllocationMode::MostSuitableFixedAllotmentTolerance,
        AllocationMode::MostSuitableProportionalAllotmentTolerance,
        AllocationMode::MostSuitablePerAdvisorAllotmentTolerance,
        AllocationMode::BalanceLinear,
        AllocationMode::BalanceProportional,
        AllocationMode::BalancePerClusterProportional,
        AllocationMode::BalanceDifficultyProportional,
    ];

    /// Stable numeric id
    pub fn id(&self) -> u32 {
        match self {
            AllocationMode::RoundRobin => 0,
            AllocationMode::MostSuitableAggressive => 1,
            AllocationMode::MostSuitableFixedAllotmentTolerance => 2,
            AllocationMode::MostSuitableProportionalAllotmentTolerance => 3,
            AllocationMode::MostSuitablePerAdvisorAllotmentTolerance => 4,
            AllocationMode::BalanceLinear => 5,
            AllocationMode::BalanceProportional => 6,
            AllocationMode::BalancePerClusterProportional => 7,
            AllocationMode::BalanceDifficultyProportional => 8,
            AllocationMode::RoundRobinUnconstrained => 9,
            AllocationMode::MostSuitableUnconstrained => 10,
        }
    }

    pub fn from_id(id: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.id() == id)
    }

    /// Look up by display name or variant key (`"MostSuitableAggressive"`)
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.name() == name || mode.key() == name)
    }

    /// Variant key
    pub fn key(&self) -> &'static str {
        match self {
            AllocationMode::RoundRobin => "RoundRobin",
            AllocationMode::RoundRobinUnconstrained => "RoundRobinUnconstrained",
            AllocationMode::MostSuitableUnconstrained => "MostSuitableUnconstrained",
            AllocationMode::MostSuitableAggressive => "MostSuitableAggressive",
            AllocationMode::MostSuitableFixedAllotmentTolerance => {
                "MostSuitableFixedAllotmentTolerance"
            }
            AllocationMode::MostSuitableProportionalAllotmentTolerance => {
                "MostSuitableProportionalAllotmentTolerance"
            }
            AllocationMode::MostSuitablePerAdvisorAllotmentTolerance => {
                "MostSuitablePerAdvisorAllotmentTolerance"
            }
            AllocationMode::BalanceLinear => "BalanceLinear",
            AllocationMode::BalanceProportional => "BalanceProportional",
            AllocationMode::BalancePerClusterProportional => "BalancePerClusterProportional",
            AllocationMode::BalanceDifficultyProportional => "BalanceDifficultyProportional",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AllocationMode::RoundRobin => "Round Robin",
            AllocationMode::RoundRobinUnconstrained => "Round Robin (Unconstrained)",
            AllocationMode::MostSuitableUnconstrained => "Most Suitable (Unconstrained)",
            AllocationMode::MostSuitableAggressive => "Most Suitable (Aggressive)",
            AllocationMode::MostSuitableFixedAllotmentTolerance => {
                "Most Suitable (Fixed allotment tolerance)"
            }
            AllocationMode::MostSuitableProportionalAllotmentTolerance => {
                "Most Suitable (Proportional allotment tolerance)"
            }
            AllocationMode::MostSuitablePerAdvisorAllotmentTolerance => {
                "Most Suitable (Per-advisor allotment tolerance)"
            }
            AllocationMode::BalanceLinear => "Propensity/Allotment Balance (Linear)",
            AllocationMode::BalanceProportional => "Propensity/Allotment Balance (Proportional)",
            AllocationMode::BalancePerClusterProportional => {
                "Propensity/Allotment Balance (Per-Cluster, Proportional)"
            }
            AllocationMode::BalanceDifficultyProportional => {
                "Propensity/Allotment/Difficulty Balance (Proportional)"
            }
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AllocationMode::RoundRobin => {
                "Allocates leads one by one to each available CA in the lead's portfolio"
            }
            AllocationMode::RoundRobinUnconstrained => {
                "Allocates leads one by one to every CA, ignoring portfolio and working hours"
            }
            AllocationMode::MostSuitableUnconstrained => {
                "Allocates leads to the CA with the highest likelihood of conversion, ignoring \
                 portfolio and working hours"
            }
            AllocationMode::MostSuitableAggressive => {
                "Allocates leads always to the CA with the highest likelihood of conversion. \
                 Uses lowest total allotment as a tiebreaker"
            }
            AllocationMode::MostSuitableFixedAllotmentTolerance => {
                "Allocates leads to the CA with the highest likelihood of conversion, so long as \
                 their allotment is not more than a given number of leads above the least \
                 loaded CA. If all available CAs are outside this tolerance, picks the one \
                 with the fewest leads currently allotted"
            }
            AllocationMode::MostSuitableProportionalAllotmentTolerance => {
                "Allocates leads to the CA with the highest likelihood of conversion, so long as \
                 their allotment is not more than a given percentage above the least loaded CA. \
                 If all available CAs are outside this tolerance, picks the one with the fewest \
                 leads currently allotted"
            }
            AllocationMode::MostSuitablePerAdvisorAllotmentTolerance => {
                "Allocates leads to the CA with the highest likelihood of conversion, so long as \
                 their allotment is within their own allotment limit of the least loaded CA. \
                 If all available CAs are outside their limits, picks the one with the most \
                 headroom left"
            }
            AllocationMode::BalanceLinear => {
                "Scores CAs on weighted propensity plus how far their allotment sits below \
                 the average of working CAs"
            }
            AllocationMode::BalanceProportional => {
                "Scores CAs on weighted propensity relative to the lead's average propensity \
                 plus how far their allotment sits below the average of working CAs"
            }
            AllocationMode::BalancePerClusterProportional => {
                "As proportional balance, but balances allotment within each lead cluster and \
                 applies no decay"
            }
            AllocationMode::BalanceDifficultyProportional => {
                "As proportional balance, additionally deprioritising CAs who have received \
                 more than their share of easy leads"
            }
        }
    }

    /// Ordered parameter schema
    pub fn parameters(&self) -> &'static [ParameterSpec] {
        match self {
            AllocationMode::RoundRobin
            | AllocationMode::RoundRobinUnconstrained
            | AllocationMode::MostSuitableUnconstrained
            | AllocationMode::MostSuitableAggressive => &[],
            AllocationMode::MostSuitableFixedAllotmentTolerance => FIXED_TOLERANCE_PARAMETERS,
            AllocationMode::MostSuitableProportionalAllotmentTolerance => {
                PROPORTIONAL_TOLERANCE_PARAMETERS
            }
            AllocationMode::MostSuitablePerAdvisorAllotmentTolerance => {
                PER_ADVISOR_TOLERANCE_PARAMETERS
            }
            AllocationMode::BalanceLinear => LINEAR_BALANCE_PARAMETERS,
            AllocationMode::BalanceProportional => PROPORTIONAL_BALANCE_PARAMETERS,
            AllocationMode::BalancePerClusterProportional => PER_CLUSTER_BALANCE_PARAMETERS,
            AllocationMode::BalanceDifficultyProportional => DIFFICULTY_BALANCE_PARAMETERS,
        }
    }
}

/// Named policy configuration
///
/// # Example
///
/// ```rust
/// use lead_allocator_core_rs::policy::{AllocationMode, PolicyConfig};
///
/// let config = PolicyConfig::from_parameters(
///     AllocationMode::MostSuitableFixedAllotmentTolerance,
///     &[2.0, 0.5, 0.0, 0.0],
/// )
/// .unwrap();
///
/// match config {
///     PolicyConfig::FixedAllotmentTolerance { allotment_tolerance, decay } => {
///         assert_eq!(allotment_tolerance, 2.0);
///         assert_eq!(decay.decay_per_day, 0.5);
///     }
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PolicyConfig {
    RoundRobin,

    RoundRobinUnconstrained,

    MostSuitableUnconstrained,

    MostSuitableAggressive,

    FixedAllotmentTolerance {
        allotment_tolerance: f64,
        decay: DecayConfig,
    },

    ProportionalAllotmentTolerance {
        /// Percent above the lowest allotment
        allotment_tolerance_percent: f64,
        decay: DecayConfig,
    },

    PerAdvisorAllotmentTolerance {
        /// Used for advisors without their own allotment limit
        default_allotment_tolerance: f64,
        decay: DecayConfig,
    },

    LinearBalance {
        propensity_weighting: f64,
        allotment_weighting: f64,
        decay: DecayConfig,
    },

    ProportionalBalance {
        propensity_weighting: f64,
        allotment_weighting: f64,
        decay: DecayConfig,
    },

    /// No decay: cluster counts never cool off
    PerClusterBalance {
        propensity_weighting: f64,
        allotment_weighting: f64,
    },

    DifficultyBalance {
        propensity_weighting: f64,
        allotment_weighting: f64,
        difficulty_weighting: f64,
        decay: DecayConfig,
    },
}

/// Positional parameter reader for one mode
struct ParameterReader<'a> {
    mode: AllocationMode,
    values: &'a [f64],
}

impl<'a> ParameterReader<'a> {
    fn new(mode: AllocationMode, values: &'a [f64]) -> Result<Self, AllocationError> {
        let schema = mode.parameters();
        if let Some(missing) = schema.get(values.len()) {
            return Err(AllocationError::configuration(format!(
                "mode '{}' requires parameter '{}' at position {}",
                mode.name(),
                missing.name,
                values.len()
            )));
        }
        if values.len() > schema.len() {
            return Err(AllocationError::configuration(format!(
                "mode '{}' takes {} parameter(s), got {}",
                mode.name(),
                schema.len(),
                values.len()
            )));
        }
        for (spec, value) in schema.iter().zip(values) {
            if !value.is_finite() {
                return Err(AllocationError::configuration(format!(
                    "parameter '{}' of mode '{}' is not a finite number",
                    spec.name,
                    mode.name()
                )));
            }
        }
        Ok(Self { mode, values })
    }

    /// Value of the parameter called `name` in this mode's schema
    fn get(&self, name: &str) -> Result<f64, AllocationError> {
        self.mode
            .parameters()
            .iter()
            .position(|spec| spec.name == name)
            .and_then(|i| self.values.get(i).copied())
            .ok_or_else(|| {
                AllocationError::configuration(format!(
                    "mode '{}' has no parameter '{}'",
                    self.mode.name(),
                    name
                ))
            })
    }

    fn decay(&self) -> Result<DecayConfig, AllocationError> {
        let days = self.get("cycleDecayDurationDays")?;
        if days < 0.0 || days.fract() != 0.0 || days > u32::MAX as f64 {
            return Err(AllocationError::configuration(format!(
                "cycleDecayDurationDays must be a whole number of days, got {}",
                days
            )));
        }
        Ok(DecayConfig::daily(self.get("decayPerDay")?)
            .with_cycle(self.get("decayPerCycle")?, days as u32))
    }
}

impl PolicyConfig {
    /// Build a configuration from a mode and its positional parameters
    ///
    /// # Errors
    /// `Configuration` when a parameter is missing, surplus, non-finite or
    /// out of range.
    pub fn from_parameters(mode: AllocationMode, values: &[f64]) -> Result<Self, AllocationError> {
        let p = ParameterReader::new(mode, values)?;

        let config = match mode {
            AllocationMode::RoundRobin => PolicyConfig::RoundRobin,
            AllocationMode::RoundRobinUnconstrained => PolicyConfig::RoundRobinUnconstrained,
            AllocationMode::MostSuitableUnconstrained => PolicyConfig::MostSuitableUnconstrained,
            AllocationMode::MostSuitableAggressive => PolicyConfig::MostSuitableAggressive,
            AllocationMode::MostSuitableFixedAllotmentTolerance => {
                PolicyConfig::FixedAllotmentTolerance {
                    allotment_tolerance: p.get("allotmentTolerance")?,
                    decay: p.decay()?,
                }
            }
            AllocationMode::MostSuitableProportionalAllotmentTolerance => {
                PolicyConfig::ProportionalAllotmentTolerance {
                    allotment_tolerance_percent: p.get("allotmentTolerance")?,
                    decay: p.decay()?,
                }
            }
            AllocationMode::MostSuitablePerAdvisorAllotmentTolerance => {
                PolicyConfig::PerAdvisorAllotmentTolerance {
                    default_allotment_tolerance: p.get("defaultAllotmentTolerance")?,
                    decay: p.decay()?,
                }
            }
            AllocationMode::BalanceLinear => PolicyConfig::LinearBalance {
                propensity_weighting: p.get("propensityWeighting")?,
                allotment_weighting: p.get("allotmentWeighting")?,
                decay: p.decay()?,
            },
            AllocationMode::BalanceProportional => PolicyConfig::ProportionalBalance {
                propensity_weighting: p.get("propensityWeighting")?,
                allotment_weighting: p.get("allotmentWeighting")?,
                decay: p.decay()?,
            },
            AllocationMode::BalancePerClusterProportional => PolicyConfig::PerClusterBalance {
                propensity_weighting: p.get("propensityWeighting")?,
                allotment_weighting: p.get("allotmentWeighting")?,
            },
            AllocationMode::BalanceDifficultyProportional => PolicyConfig::DifficultyBalance {
                propensity_weighting: p.get("propensityWeighting")?,
                allotment_weighting: p.get("allotmentWeighting")?,
                difficulty_weighting: p.get("difficultyWeighting")?,
                decay: p.decay()?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn mode(&self) -> AllocationMode {
        match self {
            PolicyConfig::RoundRobin => AllocationMode::RoundRobin,
            PolicyConfig::RoundRobinUnconstrained => AllocationMode::RoundRobinUnconstrained,
            PolicyConfig::MostSuitableUnconstrained => AllocationMode::MostSuitableUnconstrained,
            PolicyConfig::MostSuitableAggressive => AllocationMode::MostSuitableAggressive,
            PolicyConfig::FixedAllotmentTolerance { .. } => {
                AllocationMode::MostSuitableFixedAllotmentTolerance
            }
            PolicyConfig::ProportionalAllotmentTolerance { .. } => {
                AllocationMode::MostSuitableProportionalAllotmentTolerance
            }
            PolicyConfig::PerAdvisorAllotmentTolerance { .. } => {
                AllocationMode::MostSuitablePerAdvisorAllotmentTolerance
            }
            PolicyConfig::LinearBalance { .. } => AllocationMode::BalanceLinear,
            PolicyConfig::ProportionalBalance { .. } => AllocationMode::BalanceProportional,
            PolicyConfig::PerClusterBalance { .. } => AllocationMode::BalancePerClusterProportional,
            PolicyConfig::DifficultyBalance { .. } => AllocationMode::BalanceDifficultyProportional,
        }
    }

    /// Decay applied before scoring each lead (None = no decay step)
    pub fn decay(&self) -> Option<DecayConfig> {
        match self {
            PolicyConfig::FixedAllotmentTolerance { decay, .. }
            | PolicyConfig::ProportionalAllotmentTolerance { decay, .. }
            | PolicyConfig::PerAdvisorAllotmentTolerance { decay, .. }
            | PolicyConfig::LinearBalance { decay, .. }
            | PolicyConfig::ProportionalBalance { decay, .. }
            | PolicyConfig::DifficultyBalance { decay, .. } => Some(*decay),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), AllocationError> {
        let tolerance = match self {
            PolicyConfig::FixedAllotmentTolerance {
                allotment_tolerance: t,
                ..
            }
            | PolicyConfig::ProportionalAllotmentTolerance {
                allotment_tolerance_percent: t,
                ..
            }
            | PolicyConfig::PerAdvisorAllotmentTolerance {
                default_allotment_tolerance: t,
                ..
            } => Some(*t),
            _ => None,
        };
        if let Some(t) = tolerance {
            if !t.is_finite() || t < 0.0 {
                return Err(AllocationError::configuration(format!(
                    "allotment tolerance must be a non-negative number, got {}",
                    t
                )));
            }
        }

        let weights: Vec<f64> = match self {
            PolicyConfig::LinearBalance {
                propensity_weighting,
                allotment_weighting,
                ..
            }
            | PolicyConfig::ProportionalBalance {
                propensity_weighting,
                allotment_weighting,
                ..
            }
            | PolicyConfig::PerClusterBalance {
                propensity_weighting,
                allotment_weighting,
            } => vec![*propensity_weighting, *allotment_weighting],
            PolicyConfig::DifficultyBalance {
                propensity_weighting,
                allotment_weighting,
                difficulty_weighting,
                ..
            } => vec![*propensity_weighting, *allotment_weighting, *difficulty_weighting],
            _ => Vec::new(),
        };
        if weights.iter().any(|w| !w.is_finite()) {
            return Err(AllocationError::configuration(
                "balance weightings must be finite numbers",
            ));
        }

        if let Some(decay) = self.decay() {
            decay.validate()?;
        }
        Ok(())
    }

    /// Instantiate the ranking policy
    pub fn build(&self) -> Box<dyn AllocationPolicy> {
        match self {
            PolicyConfig::RoundRobin => Box::new(RoundRobinPolicy::constrained()),
            PolicyConfig::RoundRobinUnconstrained => Box::new(RoundRobinPolicy::unconstrained()),
            PolicyConfig::MostSuitableUnconstrained => Box::new(MostSuitableUnconstrainedPolicy),
            PolicyConfig::MostSuitableAggressive => Box::new(MostSuitableAggressivePolicy),
            PolicyConfig::FixedAllotmentTolerance {
                allotment_tolerance,
                ..
            } => Box::new(AllotmentTolerancePolicy::fixed(*allotment_tolerance)),
            PolicyConfig::ProportionalAllotmentTolerance {
                allotment_tolerance_percent,
                ..
            } => Box::new(AllotmentTolerancePolicy::proportional(
                *allotment_tolerance_percent,
            )),
            PolicyConfig::PerAdvisorAllotmentTolerance {
                default_allotment_tolerance,
                ..
            } => Box::new(AllotmentTolerancePolicy::per_advisor(
                *default_allotment_tolerance,
            )),
            PolicyConfig::LinearBalance {
                propensity_weighting,
                allotment_weighting,
                ..
            } => Box::new(BalancePolicy::new(
                BalanceVariant::Linear,
                *propensity_weighting,
                *allotment_weighting,
            )),
            PolicyConfig::ProportionalBalance {
                propensity_weighting,
                allotment_weighting,
                ..
            } => Box::new(BalancePolicy::new(
                BalanceVariant::Proportional,
                *propensity_weighting,
                *allotment_weighting,
            )),
            PolicyConfig::PerClusterBalance {
                propensity_weighting,
                allotment_weighting,
            } => Box::new(BalancePolicy::new(
                BalanceVariant::PerClusterProportional,
                *propensity_weighting,
                *allotment_weighting,
            )),
            PolicyConfig::DifficultyBalance {
                propensity_weighting,
                allotment_weighting,
                difficulty_weighting,
                ..
            } => Box::new(
                BalancePolicy::new(
                    BalanceVariant::DifficultyProportional,
                    *propensity_weighting,
                    *allotment_weighting,
                )
                .with_difficulty_weighting(*difficulty_weighting),
            ),
        }
    }
}

/// Convert raw JSON parameter values to numbers
///
/// Numbers pass through; strings holding a number are parsed. Anything else
/// is a configuration error naming its position.
pub fn parameter_values(raw: &[serde_json::Value]) -> Result<Vec<f64>, AllocationError> {
    raw.iter()
        .enumerate()
        .map(|(i, value)| {
            let parsed = match value {
                serde_json::Value::Number(n) => n.as_f64(),
                serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            };
            parsed
                .filter(|v| v.is_finite())
                .ok_or_else(|| {
                    AllocationError::configuration(format!(
                        "parameter at position {} is not numeric: {}",
                        i, value
                    ))
                })
        })
        .collect()
}
