use crate::decimal::Money;
use crate::errors::{EngineError, Result};
use crate::types::PaymentAllocation;

/// split an incoming payment across due interest and outstanding principal
///
/// interest is served first; whatever remains flows to principal, and
/// anything beyond the full balance is reported as excess. a payment short
/// of the interest due produces a negative `principal_paid`: the
/// interest-shortfall signal the caller must interpret, never clamped
pub fn allocate_payment(
    payment: Money,
    interest_due: Money,
    principal_left: Money,
) -> Result<PaymentAllocation> {
    if payment <= Money::ZERO {
        return Err(EngineError::InvalidPaymentAmount { amount: payment });
    }
    if interest_due < Money::ZERO {
        return Err(EngineError::InvalidAmount { amount: interest_due });
    }
    if principal_left < Money::ZERO {
        return Err(EngineError::InvalidAmount { amount: principal_left });
    }

    let interest_paid = payment.min(interest_due);

    if payment > interest_due + principal_left {
        Ok(PaymentAllocation {
            interest_paid,
            principal_paid: principal_left,
            excess_amount: payment - interest_due - principal_left,
        })
    } else {
        Ok(PaymentAllocation {
            interest_paid,
            principal_paid: payment - interest_due,
            excess_amount: Money::ZERO,
        })
    }
}
