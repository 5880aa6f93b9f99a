use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::config::ClubConfig;
use crate::decimal::{Money, Points};
use crate::errors::{EngineError, Result};
use crate::tenure::TenureCalculator;

/// interest position of a standard loan at a due date
#[derive(Debug, Clone, PartialEq)]
pub struct InterestDue {
    /// billing months between start and due date (minimum one)
    pub months_due: u32,
    /// point-months accrued and not yet cleared by a payment
    pub points_months_due: u32,
    pub total_due: Money,
    /// portion the member's points can cover
    pub points_due: Money,
    /// cash-payable remainder
    pub cash_due: Money,
    /// points the covered portion consumes
    pub points_consumed: Points,
}

/// computes interest due and its cash/points split
pub struct DueCalculator {
    pub config: ClubConfig,
    tenure: TenureCalculator,
}

impl DueCalculator {
    pub fn new(config: ClubConfig) -> Self {
        let tenure = TenureCalculator::new(config.clone());
        Self { config, tenure }
    }

    /// total interest due at the target date, compounded monthly
    ///
    /// a started loan is charged at least one month of interest even on the
    /// day it starts; monotonic non-decreasing in elapsed days
    pub fn total_interest_due(
        &self,
        amount: Money,
        start: DateTime<Utc>,
        due: DateTime<Utc>,
    ) -> Result<Money> {
        if amount < Money::ZERO {
            return Err(EngineError::InvalidAmount { amount });
        }

        let months = self.tenure.total_months_due(start, due)?.max(1);
        let rate = self.config.monthly_lending_rate.as_decimal();

        Ok(amount.compound(rate, months) - amount)
    }

    /// point-months accrued since start and not yet cleared
    ///
    /// cleared-exceeds-total and negative spans both yield zero
    pub fn points_months_due(
        &self,
        loan_start: DateTime<Utc>,
        last_payment: Option<DateTime<Utc>>,
        due: DateTime<Utc>,
    ) -> u32 {
        let total = self.tenure.point_months_accrued(loan_start, due);
        let cleared = last_payment
            .map(|paid| self.tenure.point_months_accrued(loan_start, paid))
            .unwrap_or(0);

        total.saturating_sub(cleared)
    }

    /// points-covered portion of the interest due
    ///
    /// bounded by the point-month entitlement (one month of simple interest
    /// per point-month due), by the member's points balance, and by the
    /// total due itself
    pub fn points_interest_due(
        &self,
        total_due: Money,
        amount: Money,
        points_months_due: u32,
        available_points: Points,
    ) -> Money {
        let entitlement = Money::from_decimal(
            amount.as_decimal()
                * self.config.monthly_lending_rate.as_decimal()
                * Decimal::from(points_months_due),
        );
        let points_cap = available_points.max(Points::ZERO).cash_value(self.config.point_value);

        total_due.min(entitlement).min(points_cap).max(Money::ZERO)
    }

    /// cash-payable remainder of the interest due
    pub fn cash_interest_due(&self, total_due: Money, points_due: Money) -> Money {
        total_due - points_due
    }

    /// points a covered interest amount consumes
    ///
    /// negative inputs yield negative points; callers guard against negative
    /// due amounts upstream
    pub fn points_consumed(&self, points_interest_due: Money) -> Points {
        Points::from_decimal(
            points_interest_due.as_decimal() / self.config.point_value.as_decimal(),
        )
    }

    /// full interest position at the due date
    pub fn assess(
        &self,
        amount: Money,
        loan_start: DateTime<Utc>,
        last_payment: Option<DateTime<Utc>>,
        due: DateTime<Utc>,
        available_points: Points,
    ) -> Result<InterestDue> {
        let months_due = self.tenure.total_months_due(loan_start, due)?.max(1);
        let total_due = self.total_interest_due(amount, loan_start, due)?;
        let points_months_due = self.points_months_due(loan_start, last_payment, due);
        let points_due =
            self.points_interest_due(total_due, amount, points_months_due, available_points);
        let cash_due = self.cash_interest_due(total_due, points_due);
        let points_consumed = self.points_consumed(points_due);

        Ok(InterestDue {
            months_due,
            points_months_due,
            total_due,
            points_due,
            cash_due,
            points_consumed,
        })
    }
}
