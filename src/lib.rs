pub mod account;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod interest;
pub mod limit;
pub mod loans;
pub mod payments;
pub mod projection;
pub mod state;
pub mod tenure;
pub mod types;

// re-export key types
pub use account::{LoanAccount, LoanStatusReport};
pub use config::{ClubConfig, MultiplierBand};
pub use decimal::{Money, Points, Rate};
pub use errors::{EngineError, Result};
pub use events::{Event, EventStore};
pub use interest::{DueCalculator, InterestDue};
pub use limit::LimitEngine;
pub use loans::{
    FreeLoanCalculator, FreeLoanEligibility, FreeLoanOverdue, FreeLoanPosition, LoanQuote,
    StandardLoanCalculator,
};
pub use payments::allocate_payment;
pub use projection::effective_end_date;
pub use state::{Loan, LoanView, Member, Payment, PaymentRecord};
pub use tenure::{days_between, TenureCalculator};
pub use types::{LoanId, LoanProduct, LoanStatus, MemberId, PaymentAllocation};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
