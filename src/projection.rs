use chrono::{DateTime, Duration, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::decimal::Money;
use crate::errors::{EngineError, Result};
use crate::state::Loan;
use crate::tenure::days_between;
use crate::types::LoanStatus;

/// calendar date at which a loan reaches (or reached) zero principal
///
/// the `units` accumulator tracks principal outstanding x days elapsed; its
/// ratio to the original amount is the loan's principal-weighted duration in
/// days. for settled loans that is the actual duration; for ongoing loans the
/// accumulator is projected forward at the current repayment velocity
pub fn effective_end_date(loan: &Loan, as_of: DateTime<Utc>) -> Result<DateTime<Utc>> {
    if loan.amount <= Money::ZERO {
        return Err(EngineError::InvalidAmount { amount: loan.amount });
    }
    let start = loan.start_date.ok_or(EngineError::LoanNotActive {
        status: loan.status,
    })?;

    match loan.status {
        LoanStatus::Ended => Ok(start + Duration::days(duration_days(loan.units, loan.amount))),
        LoanStatus::Ongoing => {
            let anchor = loan.repayment_anchor().unwrap_or(start);
            let elapsed = days_between(anchor, as_of).max(0);
            let projected =
                loan.units + Decimal::from(elapsed) * loan.principal_left.as_decimal();

            if projected.is_zero() {
                return Ok(start);
            }
            Ok(start + Duration::days(duration_days(projected, loan.amount)))
        }
        _ => Err(EngineError::LoanNotActive {
            status: loan.status,
        }),
    }
}

fn duration_days(units: Decimal, amount: Money) -> i64 {
    (units / amount.as_decimal())
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(0)
}
