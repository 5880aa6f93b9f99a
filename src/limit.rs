use rust_decimal::Decimal;

use crate::config::ClubConfig;
use crate::decimal::Money;
use crate::errors::{EngineError, Result};
use crate::state::Member;

/// computes how much a member may borrow against their standing
pub struct LimitEngine {
    pub config: ClubConfig,
}

impl LimitEngine {
    pub fn new(config: ClubConfig) -> Self {
        Self { config }
    }

    /// savings multiplier for a member's interest-paid history
    ///
    /// piecewise-linear between (min_interest_ratio -> max_multiplier) and
    /// (max_interest_ratio -> min_multiplier), clamped outside the band.
    /// no interest history gets the best multiplier; no savings gets the
    /// worst
    pub fn limit_multiplier(&self, interest_paid: Money, current_savings: Money) -> Decimal {
        let band = &self.config.multiplier_band;

        if interest_paid <= Money::ZERO {
            return band.max_multiplier;
        }
        if current_savings <= Money::ZERO {
            return band.min_multiplier;
        }

        let ratio = interest_paid.as_decimal() / current_savings.as_decimal();
        let low = band.min_interest_ratio.as_decimal();
        let high = band.max_interest_ratio.as_decimal();

        if ratio <= low {
            band.max_multiplier
        } else if ratio >= high {
            band.min_multiplier
        } else {
            let slope = (band.max_multiplier - band.min_multiplier) / (high - low);
            band.max_multiplier - (ratio - low) * slope
        }
    }

    /// maximum borrowable amount: scaled savings less principal still owed
    /// on ongoing loans
    ///
    /// zero savings means zero limit; a negative result signals an
    /// over-extended member and is returned as-is for the caller to judge
    pub fn borrowing_limit(
        &self,
        member: &Member,
        ongoing_debts: &[Money],
        interest_paid: Money,
    ) -> Result<Money> {
        for &debt in ongoing_debts {
            if debt < Money::ZERO {
                return Err(EngineError::InvalidAmount { amount: debt });
            }
        }

        if member.investment_amount <= Money::ZERO {
            return Ok(Money::ZERO);
        }

        let multiplier = self.limit_multiplier(interest_paid, member.investment_amount);
        let capacity = member.investment_amount * multiplier;
        let owed = ongoing_debts
            .iter()
            .fold(Money::ZERO, |acc, &debt| acc + debt);

        Ok(capacity - owed)
    }
}
