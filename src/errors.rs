use chrono::NaiveDate;
use thiserror::Error;

use crate::decimal::{Money, Points};
use crate::types::LoanStatus;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid amount: {amount}")]
    InvalidAmount {
        amount: Money,
    },

    #[error("invalid duration: {months} months")]
    InvalidDuration {
        months: u32,
    },

    #[error("invalid points balance: {points}")]
    InvalidPoints {
        points: Points,
    },

    #[error("invalid payment amount: {amount}")]
    InvalidPaymentAmount {
        amount: Money,
    },

    #[error("invalid date range: {start} to {end}")]
    InvalidDateRange {
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("loan not active: current status is {status:?}")]
    LoanNotActive {
        status: LoanStatus,
    },

    #[error("loan not pending approval: current status is {status:?}")]
    LoanNotPending {
        status: LoanStatus,
    },

    #[error("borrowing limit exceeded: limit {limit}, requested {requested}")]
    LimitExceeded {
        limit: Money,
        requested: Money,
    },

    #[error("member not eligible: limit {limit}, requested {requested}")]
    NotEligible {
        limit: Money,
        requested: Money,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, EngineError>;
