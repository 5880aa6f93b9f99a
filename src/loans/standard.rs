use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::config::ClubConfig;
use crate::decimal::{Money, Points, Rate};
use crate::errors::{EngineError, Result};

/// pricing of a standard-loan request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanQuote {
    /// lending rate over the full term, in percentage-points
    pub total_rate: Rate,
    /// points the term prices at
    pub points_needed: Points,
    /// points actually charged, capped by the borrower's balance
    pub points_spent: Points,
    /// interest owed in cash after the points offset
    pub actual_interest: Money,
    /// suggested monthly installment, rounded to the installment step
    pub installment_amount: Money,
}

/// prices standard (interest-bearing) loan requests
pub struct StandardLoanCalculator {
    pub config: ClubConfig,
}

impl StandardLoanCalculator {
    pub fn new(config: ClubConfig) -> Self {
        Self { config }
    }

    /// price a request: rate over the term, points charged, net cash
    /// interest, and installment size
    pub fn quote(
        &self,
        amount: Money,
        duration_months: u32,
        borrower_points: Points,
    ) -> Result<LoanQuote> {
        if amount <= Money::ZERO {
            return Err(EngineError::InvalidAmount { amount });
        }
        if duration_months == 0 {
            return Err(EngineError::InvalidDuration {
                months: duration_months,
            });
        }
        if borrower_points.is_negative() {
            return Err(EngineError::InvalidPoints {
                points: borrower_points,
            });
        }

        let total_rate = self.config.monthly_lending_rate.times(duration_months);
        let points_needed = self.points_needed(amount, duration_months, total_rate);
        let points_spent = points_needed.min(borrower_points);

        let actual_interest = amount.percentage(total_rate.as_percentage())
            - points_spent.cash_value(self.config.point_value);

        Ok(LoanQuote {
            total_rate,
            points_needed,
            points_spent,
            actual_interest,
            installment_amount: self.installment_amount(amount, duration_months),
        })
    }

    /// points a term prices at
    ///
    /// short tenors pay points only for the rate above one year's worth;
    /// tenors at or past the threshold pay the full year in points plus a
    /// fractional-rate charge per extra month
    fn points_needed(&self, amount: Money, duration_months: u32, total_rate: Rate) -> Points {
        let per_point = self.config.point_value.as_decimal() * Decimal::from(100);
        let threshold = self.config.points_duration_threshold();
        let year_pct = Decimal::from(self.config.one_year_months);

        let needed = if duration_months < threshold {
            (total_rate.as_percentage() - year_pct).max(Decimal::ZERO) * amount.as_decimal()
                / per_point
        } else {
            year_pct * amount.as_decimal() / per_point
                + Decimal::from(duration_months - threshold)
                    * self.config.monthly_lending_rate.as_decimal()
                    * amount.as_decimal()
                    / per_point
        };

        Points::from_decimal(needed)
    }

    /// monthly installment rounded to the nearest installment step
    fn installment_amount(&self, amount: Money, duration_months: u32) -> Money {
        let step = self.config.installment_step.as_decimal();
        let steps = (amount.as_decimal() / (step * Decimal::from(duration_months)))
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

        Money::from_decimal(steps * step)
    }
}
