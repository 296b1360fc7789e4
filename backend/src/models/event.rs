//! Event logging for allocation replay and auditing.
//!
//! This module defines the Event enum which captures every state change made
//! during an allocation pass. Events enable:
//! - Auditing (why did this advisor get this lead?)
//! - Debugging decay (when and by how much workloads cooled off)
//! - Analysis (fallback frequency, allocation sequences)
//!
//! # Example
//!
//! ```rust
//! use lead_allocator_core_rs::models::{Event, EventLog};
//! use lead_allocator_core_rs::AdvisorId;
//!
//! let mut log = EventLog::new();
//! log.log(Event::LeadAllocated {
//!     lead_id: 42,
//!     advisor_id: AdvisorId(1),
//!     propensity: 0.7,
//!     allotment_at_allocation: 3.0,
//!     in_working_hours: true,
//! });
//!
//! assert_eq!(log.events_for_lead(42).len(), 1);
//! ```

use crate::models::advisor::AdvisorId;
use serde::Serialize;

/// Which decay mechanism fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DecayKind {
    /// Linear per-day decay
    Daily,
    /// Compounding per-cycle percentage decay
    Cyclic,
}

/// Allocation event capturing a state change.
///
/// Events are logged in the order they occur within the pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Event {
    /// Pass began with this many advisors and leads
    PassStarted {
        policy: &'static str,
        num_advisors: usize,
        num_leads: usize,
    },

    /// A decay mechanism was applied to every advisor before scoring a lead
    DecayApplied {
        lead_id: i64,
        kind: DecayKind,
        /// Whole days since the mechanism last fired
        days: i64,
        /// Cycles consumed (1 for daily decay)
        cycles: i64,
    },

    /// Round robin found nobody in working hours and took the first in rotation
    RoundRobinFallback { lead_id: i64, advisor_id: AdvisorId },

    /// Lead committed to an advisor
    LeadAllocated {
        lead_id: i64,
        advisor_id: AdvisorId,
        propensity: f64,
        allotment_at_allocation: f64,
        in_working_hours: bool,
    },

    /// Pass finished after committing every lead
    PassCompleted { total_leads: usize },
}

impl Event {
    /// Lead this event belongs to, if any
    pub fn lead_id(&self) -> Option<i64> {
        match self {
            Event::DecayApplied { lead_id, .. }
            | Event::RoundRobinFallback { lead_id, .. }
            | Event::LeadAllocated { lead_id, .. } => Some(*lead_id),
            Event::PassStarted { .. } | Event::PassCompleted { .. } => None,
        }
    }

    /// Advisor this event concerns, if any
    pub fn advisor_id(&self) -> Option<AdvisorId> {
        match self {
            Event::RoundRobinFallback { advisor_id, .. }
            | Event::LeadAllocated { advisor_id, .. } => Some(*advisor_id),
            _ => None,
        }
    }

    /// Get event type as string (for filtering/display)
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::PassStarted { .. } => "PassStarted",
            Event::DecayApplied { .. } => "DecayApplied",
            Event::RoundRobinFallback { .. } => "RoundRobinFallback",
            Event::LeadAllocated { .. } => "LeadAllocated",
            Event::PassCompleted { .. } => "PassCompleted",
        }
    }
}

/// Event log for storing all events of one pass.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    pub fn events_for_lead(&self, lead_id: i64) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.lead_id() == Some(lead_id))
            .collect()
    }

    pub fn events_for_advisor(&self, advisor_id: AdvisorId) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.advisor_id() == Some(advisor_id))
            .collect()
    }
}
