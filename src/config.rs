use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{EngineError, Result};

/// borrowing-limit multiplier band
///
/// the multiplier a member's savings are scaled by when computing their
/// borrowing limit, interpolated against their interest-paid-to-savings
/// ratio: members who have paid little interest relative to savings get
/// the maximum multiplier, heavy borrowers get the minimum
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MultiplierBand {
    pub min_interest_ratio: Rate,
    pub max_interest_ratio: Rate,
    pub min_multiplier: Decimal,
    pub max_multiplier: Decimal,
}

impl MultiplierBand {
    fn validate(&self) -> Result<()> {
        if self.min_interest_ratio >= self.max_interest_ratio {
            return Err(EngineError::InvalidConfiguration {
                message: format!(
                    "interest ratio band inverted: {} >= {}",
                    self.min_interest_ratio, self.max_interest_ratio
                ),
            });
        }
        if self.min_multiplier >= self.max_multiplier {
            return Err(EngineError::InvalidConfiguration {
                message: format!(
                    "multiplier band inverted: {} >= {}",
                    self.min_multiplier, self.max_multiplier
                ),
            });
        }
        if self.min_multiplier <= Decimal::ZERO {
            return Err(EngineError::InvalidConfiguration {
                message: "multipliers must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// club rate constants
///
/// loaded once at process start and treated as immutable for the engine's
/// lifetime; every calculator takes a copy at construction rather than
/// reading ambient global state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClubConfig {
    /// billing month length in days
    pub one_month_days: i64,
    /// extra days beyond a month boundary still billed as the same month
    pub grace_period_days: i64,
    /// months per accrual year
    pub one_year_months: u32,
    /// months of each accrual year that earn no point-months
    pub year_month_threshold: u32,
    /// lending rate per billing month
    pub monthly_lending_rate: Rate,
    /// currency value of one point
    pub point_value: Money,
    /// installments are rounded to the nearest multiple of this step
    pub installment_step: Money,
    pub multiplier_band: MultiplierBand,
}

impl Default for ClubConfig {
    fn default() -> Self {
        Self {
            one_month_days: 30,
            grace_period_days: 7,
            one_year_months: 12,
            year_month_threshold: 6,
            monthly_lending_rate: Rate::from_decimal(dec!(0.02)),
            point_value: Money::from_major(1_000),
            installment_step: Money::from_major(1_000),
            multiplier_band: MultiplierBand {
                min_interest_ratio: Rate::from_decimal(dec!(0.18)),
                max_interest_ratio: Rate::from_decimal(dec!(0.36)),
                min_multiplier: dec!(1.2),
                max_multiplier: dec!(2.0),
            },
        }
    }
}

impl ClubConfig {
    /// duration (in months) past which standard-loan point pricing switches
    /// to the long-tenor formula
    pub fn points_duration_threshold(&self) -> u32 {
        self.one_year_months + self.year_month_threshold
    }

    /// check the rate regime for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.one_month_days <= 0 {
            return Err(EngineError::InvalidConfiguration {
                message: format!("month length must be positive: {}", self.one_month_days),
            });
        }
        if self.grace_period_days < 0 || self.grace_period_days >= self.one_month_days {
            return Err(EngineError::InvalidConfiguration {
                message: format!(
                    "grace period {} outside [0, {})",
                    self.grace_period_days, self.one_month_days
                ),
            });
        }
        if self.one_year_months == 0 || self.year_month_threshold > self.one_year_months {
            return Err(EngineError::InvalidConfiguration {
                message: format!(
                    "accrual year {} months with threshold {}",
                    self.one_year_months, self.year_month_threshold
                ),
            });
        }
        if self.monthly_lending_rate.as_decimal() <= Decimal::ZERO {
            return Err(EngineError::InvalidConfiguration {
                message: format!("lending rate must be positive: {}", self.monthly_lending_rate),
            });
        }
        if self.point_value <= Money::ZERO {
            return Err(EngineError::InvalidConfiguration {
                message: format!("point value must be positive: {}", self.point_value),
            });
        }
        if self.installment_step <= Money::ZERO {
            return Err(EngineError::InvalidConfiguration {
                message: format!("installment step must be positive: {}", self.installment_step),
            });
        }
        self.multiplier_band.validate()
    }
}
