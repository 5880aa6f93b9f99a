use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Points};
use crate::types::{LoanId, LoanStatus, MemberId};

/// all events that can be emitted while driving a loan's lifecycle
///
/// events are accumulated in memory and drained by the caller; the engine
/// itself performs no delivery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // lifecycle events
    LoanRequested {
        loan_id: LoanId,
        member_id: MemberId,
        amount: Money,
        duration_months: u32,
        timestamp: DateTime<Utc>,
    },
    LoanApproved {
        loan_id: LoanId,
        principal: Money,
        points_spent: Points,
        timestamp: DateTime<Utc>,
    },
    LoanCancelled {
        loan_id: LoanId,
        timestamp: DateTime<Utc>,
    },
    LoanEnded {
        loan_id: LoanId,
        final_payment: Money,
        timestamp: DateTime<Utc>,
    },
    StatusChanged {
        loan_id: LoanId,
        old_status: LoanStatus,
        new_status: LoanStatus,
        timestamp: DateTime<Utc>,
    },

    // payment events
    PaymentApplied {
        loan_id: LoanId,
        amount: Money,
        interest_paid: Money,
        principal_paid: Money,
        excess_amount: Money,
        timestamp: DateTime<Utc>,
    },
    InterestShortfall {
        loan_id: LoanId,
        amount_short: Money,
        timestamp: DateTime<Utc>,
    },

    // interest and points events
    InterestAssessed {
        loan_id: LoanId,
        cash_due: Money,
        points_due: Money,
        timestamp: DateTime<Utc>,
    },
    PointsRedeemed {
        loan_id: LoanId,
        member_id: MemberId,
        points: Points,
        interest_covered: Money,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
