//! Allocation Engine
//!
//! Runs one allocation pass: a single forward traversal of the lead table.
//!
//! # Architecture
//!
//! ```text
//! For each lead, in created order:
//! 1. Advance the decay clock to the lead's day (if the policy decays)
//! 2. Narrow the advisor pool (portfolio eligibility, unless unconstrained)
//! 3. Snapshot candidates: propensity (with override), working hours, load
//! 4. Rank candidates with the active policy; the first wins
//! 5. Commit: write lead outputs, bump allotments, update auxiliary state
//! ```
//!
//! The engine owns a fresh copy of the advisor table. The caller's advisors
//! are never mutated, so running several policies over the same input is
//! side-effect free.
//!
//! # States
//!
//! `NotStarted -> Running { next_lead } -> Completed`. Any error moves the
//! engine to `Aborted`; there is no partial or resumable result.
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use lead_allocator_core_rs::orchestrator::{AllocationEngine, EngineConfig};
//! use lead_allocator_core_rs::policy::PolicyConfig;
//! use lead_allocator_core_rs::{Advisor, AdvisorId, Lead, Portfolio};
//!
//! let advisors = vec![
//!     Advisor::new(AdvisorId(0), "Alex", Portfolio::Domestic, "Adelaide"),
//!     Advisor::new(AdvisorId(1), "Blake", Portfolio::Domestic, "Adelaide"),
//! ];
//! // Monday 10:00
//! let created = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap().and_hms_opt(10, 0, 0).unwrap();
//! let leads = vec![
//!     Lead::new(1, created, Portfolio::Domestic, 0.3)
//!         .with_propensity(AdvisorId(0), 0.2)
//!         .with_propensity(AdvisorId(1), 0.6),
//! ];
//!
//! let engine = AllocationEngine::new(
//!     EngineConfig::new(PolicyConfig::MostSuitableAggressive),
//!     &advisors,
//!     leads,
//! )
//! .unwrap();
//! let outcome = engine.run().unwrap();
//!
//! assert_eq!(outcome.leads[0].allocated_advisor(), Some(AdvisorId(1)));
//! assert_eq!(advisors[1].total_allotment(), 0); // input untouched
//! ```

use crate::core::calendar::WorkingHoursCalendar;
use crate::core::time::{DecayConfig, DecayStep, SimulationClock};
use crate::error::AllocationError;
use crate::models::advisor::{Advisor, AdvisorId};
use crate::models::event::{DecayKind, Event, EventLog};
use crate::models::lead::{Lead, LeadAllocation};
use crate::models::state::{AdvisorTable, ClusterLedger};
use crate::policy::{AllocationPolicy, Candidate, CandidateScope, PolicyConfig, RankContext};
use tracing::{debug, info, warn};

// ============================================================================
// Configuration Types
// ============================================================================

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Active policy and its parameters
    pub policy: PolicyConfig,

    /// Working hours per advisor location
    pub calendar: WorkingHoursCalendar,
}

impl EngineConfig {
    /// Policy with the default two-location calendar
    pub fn new(policy: PolicyConfig) -> Self {
        Self {
            policy,
            calendar: WorkingHoursCalendar::default(),
        }
    }

    pub fn with_calendar(mut self, calendar: WorkingHoursCalendar) -> Self {
        self.calendar = calendar;
        self
    }

    fn validate(&self) -> Result<(), AllocationError> {
        self.policy.validate()?;
        self.calendar.validate()
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Lifecycle of one pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    NotStarted,
    Running { next_lead: usize },
    Completed,
    Aborted,
}

/// What one step committed
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub lead_id: i64,
    pub advisor_id: AdvisorId,
    pub allotment_at_allocation: f64,
    pub in_working_hours: bool,
    /// Round robin picked an out-of-hours advisor because nobody was working
    pub fell_back: bool,
    pub decay: DecayStep,
}

/// Terminal state of a completed pass
#[derive(Debug, Clone)]
pub struct AllocationOutcome {
    pub policy: PolicyConfig,
    pub advisors: Vec<Advisor>,
    pub leads: Vec<Lead>,
    pub event_log: EventLog,
}

/// Single-pass allocation engine
///
/// Steps are not interruptible; a caller wanting cancellation drives
/// `step()` itself and stops between leads.
pub struct AllocationEngine {
    config: EngineConfig,

    policy: Box<dyn AllocationPolicy>,

    decay: Option<DecayConfig>,

    advisors: AdvisorTable,

    leads: Vec<Lead>,

    /// Decay cursors; None until the first lead is seen
    clock: Option<SimulationClock>,

    cluster_ledger: ClusterLedger,

    /// Sum of `inherent` over committed leads
    inherent_seen: f64,

    state: EngineState,

    event_log: EventLog,
}

impl AllocationEngine {
    /// Validate everything and prepare a pass
    ///
    /// Advisors are copied with zeroed workload; lead outputs are cleared.
    ///
    /// # Errors
    ///
    /// * `Configuration` - bad policy parameters, calendar, advisor table,
    ///   or non-finite lead values
    /// * `InputOrdering` - leads not in non-decreasing `created` order
    pub fn new(
        config: EngineConfig,
        advisors: &[Advisor],
        leads: Vec<Lead>,
    ) -> Result<Self, AllocationError> {
        config.validate()?;

        let advisors = AdvisorTable::new(advisors.iter().map(Advisor::fresh).collect())?;
        Self::validate_advisors(&advisors, &config.calendar)?;

        let leads: Vec<Lead> = leads.iter().map(Lead::unallocated).collect();
        Self::validate_leads(&leads)?;

        let policy = config.policy.build();
        let decay = config.policy.decay();

        Ok(Self {
            config,
            policy,
            decay,
            advisors,
            leads,
            clock: None,
            cluster_ledger: ClusterLedger::new(),
            inherent_seen: 0.0,
            state: EngineState::NotStarted,
            event_log: EventLog::new(),
        })
    }

    fn validate_advisors(
        advisors: &AdvisorTable,
        calendar: &WorkingHoursCalendar,
    ) -> Result<(), AllocationError> {
        for advisor in advisors.iter() {
            if !calendar.contains_location(advisor.location()) {
                return Err(AllocationError::configuration(format!(
                    "advisor {} has location '{}' which is not in the calendar",
                    advisor.id(),
                    advisor.location()
                )));
            }
            let finite_override = |value: Option<f64>| value.map_or(true, f64::is_finite);
            if !advisor.decay_modifier().is_finite()
                || advisor.decay_modifier() < 0.0
                || !finite_override(advisor.allotment_limit())
                || !finite_override(advisor.overall_propensity())
            {
                return Err(AllocationError::configuration(format!(
                    "advisor {} has a non-finite or negative numeric field",
                    advisor.id()
                )));
            }
        }
        Ok(())
    }

    fn validate_leads(leads: &[Lead]) -> Result<(), AllocationError> {
        for pair in leads.windows(2) {
            if pair[1].created() < pair[0].created() {
                return Err(AllocationError::InputOrdering {
                    lead_id: pair[1].lead_id(),
                    created: pair[1].created(),
                    previous: pair[0].created(),
                });
            }
        }
        for lead in leads {
            let finite_inputs = lead.inherent().is_finite()
                && lead.per_advisor().values().all(|p| {
                    p.propensity.is_finite() && p.assessed_propensity.map_or(true, f64::is_finite)
                });
            if !finite_inputs {
                return Err(AllocationError::configuration(format!(
                    "lead {} has a non-finite inherent or propensity value",
                    lead.lead_id()
                )));
            }
        }
        Ok(())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    pub fn advisors(&self) -> &AdvisorTable {
        &self.advisors
    }

    pub fn leads(&self) -> &[Lead] {
        &self.leads
    }

    pub fn clock(&self) -> Option<SimulationClock> {
        self.clock
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    // ========================================================================
    // Pass Loop
    // ========================================================================

    /// Allocate the next lead
    ///
    /// Returns `Ok(None)` once every lead is committed (the engine is then
    /// `Completed`).
    ///
    /// # Errors
    ///
    /// * `NoEligibleAdvisor` / `MissingPropensity` - aborts the pass
    /// * `PassFinished` - the pass already completed or aborted
    pub fn step(&mut self) -> Result<Option<StepResult>, AllocationError> {
        let index = match self.state {
            EngineState::NotStarted => {
                info!(
                    policy = self.policy.name(),
                    advisors = self.advisors.len(),
                    leads = self.leads.len(),
                    "allocation pass started"
                );
                self.event_log.log(Event::PassStarted {
                    policy: self.policy.name(),
                    num_advisors: self.advisors.len(),
                    num_leads: self.leads.len(),
                });
                0
            }
            EngineState::Running { next_lead } => next_lead,
            EngineState::Completed | EngineState::Aborted => {
                return Err(AllocationError::PassFinished)
            }
        };

        if index >= self.leads.len() {
            self.state = EngineState::Completed;
            self.event_log.log(Event::PassCompleted {
                total_leads: self.leads.len(),
            });
            info!(
                policy = self.policy.name(),
                leads = self.leads.len(),
                "allocation pass completed"
            );
            return Ok(None);
        }

        match self.allocate(index) {
            Ok(result) => {
                self.state = EngineState::Running {
                    next_lead: index + 1,
                };
                Ok(Some(result))
            }
            Err(err) => {
                self.state = EngineState::Aborted;
                warn!(error = %err, "allocation pass aborted");
                Err(err)
            }
        }
    }

    /// Run the whole pass
    pub fn run(mut self) -> Result<AllocationOutcome, AllocationError> {
        while self.step()?.is_some() {}
        Ok(self.into_outcome())
    }

    /// Final tables, if the pass completed
    pub fn finish(self) -> Option<AllocationOutcome> {
        if self.state == EngineState::Completed {
            Some(self.into_outcome())
        } else {
            None
        }
    }

    fn into_outcome(self) -> AllocationOutcome {
        AllocationOutcome {
            policy: self.config.policy,
            advisors: self.advisors.into_advisors(),
            leads: self.leads,
            event_log: self.event_log,
        }
    }

    fn allocate(&mut self, index: usize) -> Result<StepResult, AllocationError> {
        let (lead_id, created) = {
            let lead = &self.leads[index];
            (lead.lead_id(), lead.created())
        };

        // STEP 1: DECAY
        let decay = self.advance_clock(lead_id, created.date());

        // STEP 2-3: ELIGIBILITY + CANDIDATE SNAPSHOT
        let candidates = self.candidates(index)?;

        // STEP 4: RANK
        let ctx = RankContext {
            lead_id,
            inherent_seen: self.inherent_seen,
            leads_seen: index,
        };
        let ranking = self.policy.rank(&candidates, &ctx);
        let winner = ranking
            .first()
            .and_then(|id| candidates.iter().find(|c| c.advisor_id == *id))
            .ok_or(AllocationError::NoEligibleAdvisor {
                lead_id,
                portfolio: self.leads[index].portfolio(),
            })?
            .clone();

        let fell_back = self.policy.falls_back_out_of_hours() && !winner.in_working_hours;
        if fell_back {
            warn!(
                lead_id,
                advisor_id = %winner.advisor_id,
                "no advisor in working hours, using next in rotation"
            );
            self.event_log.log(Event::RoundRobinFallback {
                lead_id,
                advisor_id: winner.advisor_id,
            });
        }

        // STEP 5: COMMIT
        let allotment_at_allocation = self.allocate_lead(index, &winner)?;

        Ok(StepResult {
            lead_id,
            advisor_id: winner.advisor_id,
            allotment_at_allocation,
            in_working_hours: winner.in_working_hours,
            fell_back,
            decay,
        })
    }

    fn advance_clock(&mut self, lead_id: i64, today: chrono::NaiveDate) -> DecayStep {
        let Some(decay) = self.decay else {
            return DecayStep::default();
        };

        let clock = self
            .clock
            .unwrap_or_else(|| SimulationClock::starting(today));
        let (next, step) = clock.advance(today, &decay, self.advisors.iter_mut());
        self.clock = Some(next);

        if step.cycles > 0 {
            debug!(lead_id, cycles = step.cycles, "cyclic decay applied");
            self.event_log.log(Event::DecayApplied {
                lead_id,
                kind: DecayKind::Cyclic,
                days: step.cyclic_days,
                cycles: step.cycles,
            });
        }
        if step.daily_days > 0 {
            debug!(lead_id, days = step.daily_days, "daily decay applied");
            self.event_log.log(Event::DecayApplied {
                lead_id,
                kind: DecayKind::Daily,
                days: step.daily_days,
                cycles: 1,
            });
        }

        step
    }

    /// Immutable snapshot of the advisors the policy may choose from
    fn candidates(&self, index: usize) -> Result<Vec<Candidate>, AllocationError> {
        let lead = &self.leads[index];

        let pool = match self.policy.scope() {
            CandidateScope::Eligible => self.advisors.eligible_for(lead.portfolio()),
            CandidateScope::WholePool => self.advisors.ids(),
        };
        if pool.is_empty() {
            return Err(AllocationError::NoEligibleAdvisor {
                lead_id: lead.lead_id(),
                portfolio: lead.portfolio(),
            });
        }

        pool.into_iter()
            .filter_map(|id| self.advisors.get(id))
            .map(|advisor| {
                let entry = lead.propensity_for(advisor.id());
                let (propensity, assessed_propensity) =
                    match (advisor.overall_propensity(), entry) {
                        (Some(fixed), Some(p)) => (fixed, p.assessed()),
                        (Some(fixed), None) => (fixed, fixed),
                        (None, Some(p)) => (p.propensity, p.assessed()),
                        (None, None) => {
                            return Err(AllocationError::MissingPropensity {
                                lead_id: lead.lead_id(),
                                advisor_id: advisor.id(),
                            })
                        }
                    };

                Ok(Candidate {
                    advisor_id: advisor.id(),
                    propensity,
                    assessed_propensity,
                    in_working_hours: self
                        .config
                        .calendar
                        .is_in_working_hours(lead.created(), advisor.location())?,
                    current_allotment: advisor.current_allotment(),
                    total_allotment: advisor.total_allotment(),
                    last_allocated_id: advisor.last_allocated_id(),
                    running_inherent: advisor.running_inherent(),
                    allotment_limit: advisor.allotment_limit(),
                    cluster_allotment: self.cluster_ledger.count(lead.cluster(), advisor.id()),
                })
            })
            .collect()
    }

    /// Commit `winner` for lead `index`; returns the winner's new allotment
    fn allocate_lead(&mut self, index: usize, winner: &Candidate) -> Result<f64, AllocationError> {
        let lead = &mut self.leads[index];
        let advisor = self
            .advisors
            .get_mut(winner.advisor_id)
            .ok_or(AllocationError::NoEligibleAdvisor {
                lead_id: lead.lead_id(),
                portfolio: lead.portfolio(),
            })?;

        advisor.record_allocation(lead.lead_id(), lead.inherent());
        let allotment_at_allocation = advisor.current_allotment();

        lead.set_allocation(LeadAllocation {
            advisor_id: winner.advisor_id,
            allotment_at_allocation,
            assessed_propensity: winner.assessed_propensity,
            allocated_propensity: winner.propensity,
        });

        self.cluster_ledger.record(lead.cluster(), winner.advisor_id);
        self.inherent_seen += lead.inherent();

        debug!(
            lead_id = lead.lead_id(),
            advisor_id = %winner.advisor_id,
            propensity = winner.propensity,
            allotment = allotment_at_allocation,
            "lead allocated"
        );
        self.event_log.log(Event::LeadAllocated {
            lead_id: lead.lead_id(),
            advisor_id: winner.advisor_id,
            propensity: winner.propensity,
            allotment_at_allocation,
            in_working_hours: winner.in_working_hours,
        });

        Ok(allotment_at_allocation)
    }
}

/// Run one complete pass
pub fn simulate(
    config: EngineConfig,
    advisors: &[Advisor],
    leads: Vec<Lead>,
) -> Result<AllocationOutcome, AllocationError> {
    AllocationEngine::new(config, advisors, leads)?.run()
}
