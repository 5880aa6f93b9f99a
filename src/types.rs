use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;

/// unique identifier for a loan
pub type LoanId = Uuid;

/// unique identifier for a club member
pub type MemberId = Uuid;

/// loan products offered by the club
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanProduct {
    /// interest-bearing loan with points-based interest offset
    Standard,
    /// no interest, no points; eligibility and overdue rules only
    InterestFree,
}

/// loan status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanStatus {
    /// requested but not yet funded
    PendingApproval,
    /// funded and being repaid
    Ongoing,
    /// fully repaid
    Ended,
    /// withdrawn before funding
    Cancelled,
}

impl LoanStatus {
    /// terminal states accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoanStatus::Ended | LoanStatus::Cancelled)
    }

    pub fn is_open(&self) -> bool {
        matches!(self, LoanStatus::PendingApproval | LoanStatus::Ongoing)
    }
}

/// how a single payment was split across a loan's balances
///
/// `principal_paid` is negative when the payment fell short of the interest
/// due; that shortfall is a business signal for the caller to act on, never
/// clamped here
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct PaymentAllocation {
    pub interest_paid: Money,
    pub principal_paid: Money,
    pub excess_amount: Money,
}

impl PaymentAllocation {
    pub fn is_interest_shortfall(&self) -> bool {
        self.principal_paid.is_negative()
    }

    pub fn total_applied(&self) -> Money {
        self.interest_paid + self.principal_paid.max(Money::ZERO)
    }
}
