//! Simulated time and workload decay
//!
//! The simulation has no ticks of its own: time advances with each lead's
//! `created` date (floored to a day). Two independent cursors record when
//! each decay mechanism last fired:
//!
//! - **Daily linear decay**: every elapsed day removes
//!   `decay_per_day * advisor.decay_modifier` from the live allotment
//! - **Cyclic percentage decay**: every full cycle of
//!   `cycle_decay_duration_days` multiplies the live allotment by
//!   `1 - decay_per_cycle ^ cycles_passed`
//!
//! Cyclic decay is applied before daily decay. Only `current_allotment` is
//! touched; `total_allotment` never decays.

use crate::error::AllocationError;
use crate::models::advisor::Advisor;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Decay rates for one pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecayConfig {
    /// Leads removed from the live allotment per elapsed day
    pub decay_per_day: f64,

    /// Cyclic decay base in `[0, 1]`
    pub decay_per_cycle: f64,

    /// Cycle length in days (0 disables cyclic decay)
    pub cycle_decay_duration_days: u32,
}

impl DecayConfig {
    /// Daily decay only
    pub fn daily(decay_per_day: f64) -> Self {
        Self {
            decay_per_day,
            decay_per_cycle: 0.0,
            cycle_decay_duration_days: 0,
        }
    }

    pub fn with_cycle(mut self, decay_per_cycle: f64, cycle_decay_duration_days: u32) -> Self {
        self.decay_per_cycle = decay_per_cycle;
        self.cycle_decay_duration_days = cycle_decay_duration_days;
        self
    }

    pub fn cyclic_enabled(&self) -> bool {
        self.cycle_decay_duration_days > 0
    }

    pub fn validate(&self) -> Result<(), AllocationError> {
        if !self.decay_per_day.is_finite() || self.decay_per_day < 0.0 {
            return Err(AllocationError::configuration(format!(
                "decay_per_day must be a non-negative number, got {}",
                self.decay_per_day
            )));
        }
        if !self.decay_per_cycle.is_finite() || !(0.0..=1.0).contains(&self.decay_per_cycle) {
            return Err(AllocationError::configuration(format!(
                "decay_per_cycle must be within [0, 1], got {}",
                self.decay_per_cycle
            )));
        }
        Ok(())
    }
}

/// What one clock advance did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecayStep {
    /// Days of daily decay applied (0 = none)
    pub daily_days: i64,

    /// Days covered by the cyclic decay applied (0 = none)
    pub cyclic_days: i64,

    /// Cycles of cyclic decay applied (0 = none)
    pub cycles: i64,
}

impl DecayStep {
    pub fn is_noop(&self) -> bool {
        self.daily_days == 0 && self.cycles == 0
    }
}

/// Decay cursors threaded through a pass
///
/// The clock is a value: `advance` returns the next clock rather than
/// mutating hidden state.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use lead_allocator_core_rs::{Advisor, AdvisorId, DecayConfig, Portfolio, SimulationClock};
///
/// let day0 = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
/// let clock = SimulationClock::starting(day0);
///
/// let mut advisors = vec![Advisor::new(AdvisorId(0), "A", Portfolio::Domestic, "Adelaide")];
/// let (next, step) = clock.advance(day0 + chrono::Duration::days(3), &DecayConfig::daily(1.0), &mut advisors);
///
/// assert_eq!(step.daily_days, 3);
/// assert_eq!(next.last_daily_decay(), day0 + chrono::Duration::days(3));
/// assert_eq!(advisors[0].current_allotment(), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationClock {
    last_daily_decay: NaiveDate,
    last_cycle_decay: NaiveDate,
}

impl SimulationClock {
    /// Both cursors start at the first lead's day
    pub fn starting(day: NaiveDate) -> Self {
        Self {
            last_daily_decay: day,
            last_cycle_decay: day,
        }
    }

    pub fn last_daily_decay(&self) -> NaiveDate {
        self.last_daily_decay
    }

    pub fn last_cycle_decay(&self) -> NaiveDate {
        self.last_cycle_decay
    }

    /// Apply any decay due on `today` to every advisor and return the next clock
    ///
    /// A `today` earlier than a cursor applies nothing; leads are validated
    /// for ordering before the pass starts.
    pub fn advance<'a, I>(&self, today: NaiveDate, config: &DecayConfig, advisors: I) -> (Self, DecayStep)
    where
        I: IntoIterator<Item = &'a mut Advisor>,
    {
        let mut next = *self;
        let mut step = DecayStep::default();

        if config.cyclic_enabled() {
            let elapsed = (today - self.last_cycle_decay).num_days();
            let duration = config.cycle_decay_duration_days as i64;
            if elapsed >= duration {
                let cycles = elapsed / duration;
                step.cycles = cycles;
                step.cyclic_days = cycles * duration;
                next.last_cycle_decay = self.last_cycle_decay + chrono::Duration::days(cycles * duration);
            }
        }

        let elapsed_days = (today - self.last_daily_decay).num_days();
        if elapsed_days > 0 {
            step.daily_days = elapsed_days;
            next.last_daily_decay = today;
        }

        if step.is_noop() {
            return (next, step);
        }

        let retained = if step.cycles > 0 {
            Some(1.0 - config.decay_per_cycle.powi(step.cycles.min(i32::MAX as i64) as i32))
        } else {
            None
        };

        for advisor in advisors {
            if let Some(factor) = retained {
                advisor.decay_scale(factor);
            }
            if step.daily_days > 0 {
                advisor.decay_linear(
                    step.daily_days as f64 * config.decay_per_day * advisor.decay_modifier(),
                );
            }
        }

        (next, step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::advisor::{AdvisorId, Portfolio};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 3, d).unwrap()
    }

    fn loaded_advisor(allotment: u32) -> Advisor {
        let mut advisor = Advisor::new(AdvisorId(0), "A", Portfolio::Domestic, "Adelaide");
        for lead_id in 0..allotment {
            advisor.record_allocation(lead_id as i64, 0.0);
        }
        advisor
    }

    #[test]
    fn test_same_day_is_noop() {
        let clock = SimulationClock::starting(day(1));
        let mut advisors = vec![loaded_advisor(4)];
        let (next, step) = clock.advance(day(1), &DecayConfig::daily(1.0), advisors.iter_mut());
        assert!(step.is_noop());
        assert_eq!(next, clock);
        assert_eq!(advisors[0].current_allotment(), 4.0);
    }

    #[test]
    fn test_cycle_cursor_advances_by_whole_cycles_only() {
        let config = DecayConfig::daily(0.0).with_cycle(0.5, 3);
        let clock = SimulationClock::starting(day(1));
        let mut advisors = vec![loaded_advisor(8)];

        let (next, step) = clock.advance(day(8), &config, advisors.iter_mut());
        assert_eq!(step.cycles, 2);
        assert_eq!(next.last_cycle_decay(), day(7));
        // 1 - 0.5^2 retained
        assert!((advisors[0].current_allotment() - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_cycle_disabled_when_duration_zero() {
        let config = DecayConfig::daily(0.0).with_cycle(0.5, 0);
        let clock = SimulationClock::starting(day(1));
        let mut advisors = vec![loaded_advisor(8)];
        let (_, step) = clock.advance(day(20), &config, advisors.iter_mut());
        assert_eq!(step.cycles, 0);
        assert_eq!(advisors[0].current_allotment(), 8.0);
    }

    #[test]
    fn test_validate_rejects_cycle_base_above_one() {
        assert!(DecayConfig::daily(1.0).with_cycle(1.5, 2).validate().is_err());
        assert!(DecayConfig::daily(-1.0).validate().is_err());
        assert!(DecayConfig::daily(1.0).with_cycle(0.25, 2).validate().is_ok());
    }
}
