use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ClubConfig;
use crate::decimal::Money;
use crate::errors::{EngineError, Result};
use crate::limit::LimitEngine;
use crate::state::{Member, Payment};
use crate::tenure::days_between;

/// outcome of a free-loan eligibility check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreeLoanEligibility {
    pub eligible: bool,
    pub borrowing_limit: Money,
    pub requested_amount: Money,
    pub requested_period_months: u32,
}

/// principal position of a free loan after a series of payments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreeLoanPosition {
    pub principal_left: Money,
    /// amount paid beyond the principal
    pub excess_amount: Money,
}

/// overdue standing of a free loan against its agreed period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreeLoanOverdue {
    pub days_elapsed: i64,
    pub agreed_days: i64,
    pub days_overdue: i64,
    pub is_overdue: bool,
}

/// rule set for the interest-free product
///
/// no interest accrues and no points are consumed; the product is governed
/// by the borrowing limit and elapsed-day comparisons alone
pub struct FreeLoanCalculator {
    pub config: ClubConfig,
    limits: LimitEngine,
}

impl FreeLoanCalculator {
    pub fn new(config: ClubConfig) -> Self {
        let limits = LimitEngine::new(config.clone());
        Self { config, limits }
    }

    /// eligibility: the request must fit inside the member's borrowing limit
    pub fn eligibility(
        &self,
        member: &Member,
        ongoing_debts: &[Money],
        interest_paid: Money,
        requested_amount: Money,
        requested_period_months: u32,
    ) -> Result<FreeLoanEligibility> {
        if requested_amount <= Money::ZERO {
            return Err(EngineError::InvalidAmount {
                amount: requested_amount,
            });
        }
        if requested_period_months == 0 {
            return Err(EngineError::InvalidDuration {
                months: requested_period_months,
            });
        }

        let borrowing_limit = self
            .limits
            .borrowing_limit(member, ongoing_debts, interest_paid)?;

        Ok(FreeLoanEligibility {
            eligible: requested_amount <= borrowing_limit,
            borrowing_limit,
            requested_amount,
            requested_period_months,
        })
    }

    /// principal remaining after applying each payment in full
    pub fn principal_left(&self, amount: Money, payments: &[Payment]) -> Result<FreeLoanPosition> {
        if amount <= Money::ZERO {
            return Err(EngineError::InvalidAmount { amount });
        }

        let mut principal_left = amount;
        let mut excess_amount = Money::ZERO;

        for payment in payments {
            if payment.amount <= Money::ZERO {
                return Err(EngineError::InvalidPaymentAmount {
                    amount: payment.amount,
                });
            }
            let applied = payment.amount.min(principal_left);
            principal_left -= applied;
            excess_amount += payment.amount - applied;
        }

        Ok(FreeLoanPosition {
            principal_left,
            excess_amount,
        })
    }

    /// overdue standing from elapsed days against the agreed period
    ///
    /// a settled loan is never overdue, whatever the calendar says
    pub fn overdue_metrics(
        &self,
        start: DateTime<Utc>,
        period_months: u32,
        principal_left: Money,
        as_of: DateTime<Utc>,
    ) -> Result<FreeLoanOverdue> {
        if period_months == 0 {
            return Err(EngineError::InvalidDuration {
                months: period_months,
            });
        }
        if principal_left < Money::ZERO {
            return Err(EngineError::InvalidAmount {
                amount: principal_left,
            });
        }

        let days_elapsed = days_between(start, as_of);
        if days_elapsed < 0 {
            return Err(EngineError::InvalidDateRange {
                start: start.date_naive(),
                end: as_of.date_naive(),
            });
        }

        let agreed_days = period_months as i64 * self.config.one_month_days;
        let days_overdue = if principal_left > Money::ZERO {
            (days_elapsed - agreed_days).max(0)
        } else {
            0
        };

        Ok(FreeLoanOverdue {
            days_elapsed,
            agreed_days,
            days_overdue,
            is_overdue: days_overdue > 0,
        })
    }
}
