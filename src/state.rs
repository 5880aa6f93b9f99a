use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{Money, Points};
use crate::types::{LoanId, LoanProduct, LoanStatus, MemberId, PaymentAllocation};

/// a club member's standing at the time of a calculation
///
/// immutable inside the engine; deposits, withdrawals, and settlements mutate
/// the persisted record outside it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub member_id: MemberId,
    /// cumulative savings
    pub investment_amount: Money,
    /// non-negative accruable reward balance
    pub points: Points,
}

impl Member {
    pub fn new(investment_amount: Money, points: Points) -> Self {
        Self {
            member_id: Uuid::new_v4(),
            investment_amount,
            points,
        }
    }

    pub fn can_spend_points(&self, points: Points) -> bool {
        points <= self.points
    }
}

/// a single loan record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub loan_id: LoanId,
    pub member_id: MemberId,
    pub product: LoanProduct,

    // agreed terms
    pub amount: Money,
    pub duration_months: u32,

    // timeline
    pub start_date: Option<DateTime<Utc>>,
    pub last_payment_date: Option<DateTime<Utc>>,

    // repayment position
    pub status: LoanStatus,
    pub principal_left: Money,
    /// accumulator proportional to principal outstanding x days elapsed,
    /// used to project the loan's effective duration
    pub units: Decimal,
    pub interest_amount_paid: Money,
    pub points_spent: Points,
}

impl Loan {
    /// create a new pending loan request
    pub fn request(
        member_id: MemberId,
        product: LoanProduct,
        amount: Money,
        duration_months: u32,
    ) -> Self {
        Self {
            loan_id: Uuid::new_v4(),
            member_id,
            product,
            amount,
            duration_months,
            start_date: None,
            last_payment_date: None,
            status: LoanStatus::PendingApproval,
            principal_left: Money::ZERO,
            units: Decimal::ZERO,
            interest_amount_paid: Money::ZERO,
            points_spent: Points::ZERO,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.status == LoanStatus::Ended
    }

    pub fn can_accept_payment(&self) -> bool {
        self.status == LoanStatus::Ongoing
    }

    /// date repayment velocity is measured from
    pub fn repayment_anchor(&self) -> Option<DateTime<Utc>> {
        self.last_payment_date.or(self.start_date)
    }
}

/// a payment received against a loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub amount: Money,
    pub date: DateTime<Utc>,
}

impl Payment {
    pub fn new(amount: Money, date: DateTime<Utc>) -> Self {
        Self { amount, date }
    }
}

/// serializable reporting view of a loan
#[derive(Debug, Serialize, Deserialize)]
pub struct LoanView {
    pub loan_id: LoanId,
    pub member_id: MemberId,
    pub product: LoanProduct,
    pub status: LoanStatus,
    pub start_date: Option<DateTime<Utc>>,
    pub financial: LoanFinancialView,
    pub repayment: LoanRepaymentView,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoanFinancialView {
    pub amount: Money,
    pub duration_months: u32,
    pub principal_left: Money,
    pub interest_amount_paid: Money,
    pub points_spent: Points,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoanRepaymentView {
    pub last_payment_date: Option<DateTime<Utc>>,
    pub units: Decimal,
    pub settled: bool,
}

impl LoanView {
    pub fn from_loan(loan: &Loan) -> Self {
        Self {
            loan_id: loan.loan_id,
            member_id: loan.member_id,
            product: loan.product,
            status: loan.status,
            start_date: loan.start_date,
            financial: LoanFinancialView {
                amount: loan.amount,
                duration_months: loan.duration_months,
                principal_left: loan.principal_left,
                interest_amount_paid: loan.interest_amount_paid,
                points_spent: loan.points_spent,
            },
            repayment: LoanRepaymentView {
                last_payment_date: loan.last_payment_date,
                units: loan.units,
                settled: loan.is_settled(),
            },
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// ledger entry produced when an allocation is applied to a loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub loan_id: LoanId,
    pub payment: Payment,
    pub allocation: PaymentAllocation,
    pub principal_after: Money,
}
