use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use rust_decimal::Decimal;

use crate::config::ClubConfig;
use crate::decimal::{Money, Points};
use crate::errors::{EngineError, Result};
use crate::events::{Event, EventStore};
use crate::interest::DueCalculator;
use crate::limit::LimitEngine;
use crate::loans::{FreeLoanCalculator, FreeLoanOverdue, LoanQuote, StandardLoanCalculator};
use crate::payments::allocate_payment;
use crate::projection::effective_end_date;
use crate::state::{Loan, Member, Payment, PaymentRecord};
use crate::tenure::days_between;
use crate::types::{LoanProduct, LoanStatus, PaymentAllocation};

/// read-only status report for a loan
#[derive(Debug, Clone, PartialEq)]
pub struct LoanStatusReport {
    pub status: LoanStatus,
    pub principal_left: Money,
    pub interest_amount_paid: Money,
    pub points_spent: Points,
    pub effective_end_date: Option<DateTime<Utc>>,
    pub overdue: Option<FreeLoanOverdue>,
}

/// a member's loan driven through its lifecycle
///
/// thin composition layer over the pure calculators: it holds the in-memory
/// loan and member records, applies computed allocations to them, and
/// collects events for the caller to drain. persistence, messaging, and
/// concurrency control stay outside
pub struct LoanAccount {
    pub config: ClubConfig,
    pub member: Member,
    pub loan: Loan,
    pub quote: Option<LoanQuote>,
    pub events: EventStore,
    pub history: Vec<PaymentRecord>,
}

impl LoanAccount {
    /// request a standard loan against the member's standing
    pub fn request_standard(
        config: ClubConfig,
        member: Member,
        amount: Money,
        duration_months: u32,
        ongoing_debts: &[Money],
        interest_paid: Money,
        time_provider: &SafeTimeProvider,
    ) -> Result<Self> {
        let calculator = StandardLoanCalculator::new(config.clone());
        let quote = calculator.quote(amount, duration_months, member.points)?;

        let limits = LimitEngine::new(config.clone());
        let limit = limits.borrowing_limit(&member, ongoing_debts, interest_paid)?;
        if amount > limit {
            return Err(EngineError::LimitExceeded {
                limit,
                requested: amount,
            });
        }

        let loan = Loan::request(member.member_id, LoanProduct::Standard, amount, duration_months);

        let mut events = EventStore::new();
        events.emit(Event::LoanRequested {
            loan_id: loan.loan_id,
            member_id: member.member_id,
            amount,
            duration_months,
            timestamp: time_provider.now(),
        });

        Ok(Self {
            config,
            member,
            loan,
            quote: Some(quote),
            events,
            history: Vec::new(),
        })
    }

    /// request an interest-free loan
    pub fn request_free(
        config: ClubConfig,
        member: Member,
        amount: Money,
        period_months: u32,
        ongoing_debts: &[Money],
        interest_paid: Money,
        time_provider: &SafeTimeProvider,
    ) -> Result<Self> {
        let calculator = FreeLoanCalculator::new(config.clone());
        let eligibility =
            calculator.eligibility(&member, ongoing_debts, interest_paid, amount, period_months)?;
        if !eligibility.eligible {
            return Err(EngineError::NotEligible {
                limit: eligibility.borrowing_limit,
                requested: amount,
            });
        }

        let loan = Loan::request(member.member_id, LoanProduct::InterestFree, amount, period_months);

        let mut events = EventStore::new();
        events.emit(Event::LoanRequested {
            loan_id: loan.loan_id,
            member_id: member.member_id,
            amount,
            duration_months: period_months,
            timestamp: time_provider.now(),
        });

        Ok(Self {
            config,
            member,
            loan,
            quote: None,
            events,
            history: Vec::new(),
        })
    }

    /// fund the loan: the pending request becomes ongoing and the quoted
    /// points are charged to the member
    pub fn approve(&mut self, time_provider: &SafeTimeProvider) -> Result<()> {
        if self.loan.status != LoanStatus::PendingApproval {
            return Err(EngineError::LoanNotPending {
                status: self.loan.status,
            });
        }

        let now = time_provider.now();
        let points_spent = self
            .quote
            .as_ref()
            .map(|q| q.points_spent)
            .unwrap_or(Points::ZERO);

        self.member.points -= points_spent;
        self.loan.points_spent = points_spent;
        self.loan.start_date = Some(now);
        self.loan.principal_left = self.loan.amount;
        self.transition(LoanStatus::Ongoing, now);

        self.events.emit(Event::LoanApproved {
            loan_id: self.loan.loan_id,
            principal: self.loan.amount,
            points_spent,
            timestamp: now,
        });

        Ok(())
    }

    /// withdraw the request before funding
    pub fn cancel(&mut self, time_provider: &SafeTimeProvider) -> Result<()> {
        if self.loan.status != LoanStatus::PendingApproval {
            return Err(EngineError::LoanNotPending {
                status: self.loan.status,
            });
        }

        let now = time_provider.now();
        self.transition(LoanStatus::Cancelled, now);
        self.events.emit(Event::LoanCancelled {
            loan_id: self.loan.loan_id,
            timestamp: now,
        });

        Ok(())
    }

    /// apply a payment at the current time
    ///
    /// assesses the interest position, redeems what points can cover,
    /// allocates the cash payment, and rolls the loan's records forward. an
    /// interest-shortfall allocation is returned untouched: interest is
    /// recorded but the principal does not move
    pub fn apply_payment(
        &mut self,
        amount: Money,
        time_provider: &SafeTimeProvider,
    ) -> Result<PaymentAllocation> {
        if !self.loan.can_accept_payment() {
            return Err(EngineError::LoanNotActive {
                status: self.loan.status,
            });
        }
        let start = self.loan.start_date.ok_or(EngineError::LoanNotActive {
            status: self.loan.status,
        })?;

        let now = time_provider.now();
        let anchor = self.loan.repayment_anchor().unwrap_or(start);
        let elapsed = days_between(anchor, now).max(0);

        // bank principal-days since the last activity
        self.loan.units += Decimal::from(elapsed) * self.loan.principal_left.as_decimal();

        let cash_due = match self.loan.product {
            LoanProduct::Standard => self.settle_points_and_assess(start, now)?,
            LoanProduct::InterestFree => Money::ZERO,
        };

        let allocation = allocate_payment(amount, cash_due, self.loan.principal_left)?;

        self.loan.interest_amount_paid += allocation.interest_paid;
        self.loan.last_payment_date = Some(now);

        if allocation.is_interest_shortfall() {
            self.events.emit(Event::InterestShortfall {
                loan_id: self.loan.loan_id,
                amount_short: allocation.principal_paid.abs(),
                timestamp: now,
            });
        } else {
            self.loan.principal_left -= allocation.principal_paid;
        }

        self.events.emit(Event::PaymentApplied {
            loan_id: self.loan.loan_id,
            amount,
            interest_paid: allocation.interest_paid,
            principal_paid: allocation.principal_paid,
            excess_amount: allocation.excess_amount,
            timestamp: now,
        });
        self.history.push(PaymentRecord {
            loan_id: self.loan.loan_id,
            payment: Payment::new(amount, now),
            allocation,
            principal_after: self.loan.principal_left,
        });

        if self.loan.principal_left.is_zero() {
            self.transition(LoanStatus::Ended, now);
            self.events.emit(Event::LoanEnded {
                loan_id: self.loan.loan_id,
                final_payment: amount,
                timestamp: now,
            });
        }

        Ok(allocation)
    }

    /// interest position at `now`: redeem the points-covered portion and
    /// return what remains payable in cash
    fn settle_points_and_assess(
        &mut self,
        start: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Money> {
        let calculator = DueCalculator::new(self.config.clone());

        let total_since_start = calculator.total_interest_due(self.loan.amount, start, now)?;
        let outstanding = (total_since_start - self.loan.interest_amount_paid).max(Money::ZERO);

        let points_months =
            calculator.points_months_due(start, self.loan.last_payment_date, now);
        let points_due = calculator.points_interest_due(
            outstanding,
            self.loan.amount,
            points_months,
            self.member.points,
        );
        let cash_due = calculator.cash_interest_due(outstanding, points_due);

        self.events.emit(Event::InterestAssessed {
            loan_id: self.loan.loan_id,
            cash_due,
            points_due,
            timestamp: now,
        });

        if points_due > Money::ZERO {
            let consumed = calculator.points_consumed(points_due);
            self.member.points -= consumed;
            self.loan.points_spent += consumed;
            self.loan.interest_amount_paid += points_due;

            self.events.emit(Event::PointsRedeemed {
                loan_id: self.loan.loan_id,
                member_id: self.member.member_id,
                points: consumed,
                interest_covered: points_due,
                timestamp: now,
            });
        }

        Ok(cash_due)
    }

    /// read-only report with the projected effective end date
    pub fn status(&self, as_of: DateTime<Utc>) -> LoanStatusReport {
        let end_date = effective_end_date(&self.loan, as_of).ok();

        let overdue = match (self.loan.product, self.loan.start_date) {
            (LoanProduct::InterestFree, Some(start)) if self.loan.status != LoanStatus::Cancelled => {
                FreeLoanCalculator::new(self.config.clone())
                    .overdue_metrics(
                        start,
                        self.loan.duration_months,
                        self.loan.principal_left,
                        as_of,
                    )
                    .ok()
            }
            _ => None,
        };

        LoanStatusReport {
            status: self.loan.status,
            principal_left: self.loan.principal_left,
            interest_amount_paid: self.loan.interest_amount_paid,
            points_spent: self.loan.points_spent,
            effective_end_date: end_date,
            overdue,
        }
    }

    fn transition(&mut self, new_status: LoanStatus, timestamp: DateTime<Utc>) {
        let old_status = self.loan.status;
        self.loan.status = new_status;
        self.events.emit(Event::StatusChanged {
            loan_id: self.loan.loan_id,
            old_status,
            new_status,
            timestamp,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use hourglass_rs::TimeSource;
    use rust_decimal_macros::dec;

    fn origin() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn test_time() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(origin()))
    }

    fn rich_member() -> Member {
        Member::new(Money::from_major(500_000), Points::from_whole(30))
    }

    #[test]
    fn test_request_standard_within_limit() {
        let time = test_time();
        let account = LoanAccount::request_standard(
            ClubConfig::default(),
            rich_member(),
            Money::from_major(100_000),
            12,
            &[],
            Money::ZERO,
            &time,
        )
        .unwrap();

        assert_eq!(account.loan.status, LoanStatus::PendingApproval);
        let quote = account.quote.as_ref().unwrap();
        assert_eq!(quote.points_spent, Points::from_whole(12));
        assert!(matches!(
            account.events.events()[0],
            Event::LoanRequested { .. }
        ));
    }

    #[test]
    fn test_request_standard_over_limit_rejected() {
        let time = test_time();
        let member = Member::new(Money::from_major(10_000), Points::ZERO);

        let result = LoanAccount::request_standard(
            ClubConfig::default(),
            member,
            Money::from_major(100_000),
            12,
            &[],
            Money::ZERO,
            &time,
        );

        assert!(matches!(result, Err(EngineError::LimitExceeded { .. })));
    }

    #[test]
    fn test_approve_charges_points_and_funds() {
        let time = test_time();
        let mut account = LoanAccount::request_standard(
            ClubConfig::default(),
            rich_member(),
            Money::from_major(100_000),
            12,
            &[],
            Money::ZERO,
            &time,
        )
        .unwrap();

        account.approve(&time).unwrap();

        assert_eq!(account.loan.status, LoanStatus::Ongoing);
        assert_eq!(account.loan.principal_left, Money::from_major(100_000));
        assert_eq!(account.loan.points_spent, Points::from_whole(12));
        assert_eq!(account.member.points, Points::from_whole(18));
        assert_eq!(account.loan.start_date, Some(origin()));
    }

    #[test]
    fn test_cancel_before_funding() {
        let time = test_time();
        let mut account = LoanAccount::request_standard(
            ClubConfig::default(),
            rich_member(),
            Money::from_major(100_000),
            12,
            &[],
            Money::ZERO,
            &time,
        )
        .unwrap();

        account.cancel(&time).unwrap();
        assert_eq!(account.loan.status, LoanStatus::Cancelled);

        // terminal: no approval, no payments
        assert!(account.approve(&time).is_err());
        assert!(account
            .apply_payment(Money::from_major(1_000), &time)
            .is_err());
    }

    #[test]
    fn test_payment_lifecycle_to_settlement() {
        let time = test_time();
        let control = time.test_control().unwrap();

        let mut account = LoanAccount::request_standard(
            ClubConfig::default(),
            rich_member(),
            Money::from_major(100_000),
            12,
            &[],
            Money::ZERO,
            &time,
        )
        .unwrap();
        account.approve(&time).unwrap();

        // one month in: 2000 interest due in cash (no point-months yet)
        control.advance(Duration::days(30));
        let allocation = account
            .apply_payment(Money::from_major(52_000), &time)
            .unwrap();

        assert_eq!(allocation.interest_paid, Money::from_major(2_000));
        assert_eq!(allocation.principal_paid, Money::from_major(50_000));
        assert_eq!(account.loan.principal_left, Money::from_major(50_000));
        assert_eq!(account.loan.units, dec!(3000000));

        // second month: interest accrues on the original amount, less what
        // was already settled
        control.advance(Duration::days(30));
        let due = DueCalculator::new(ClubConfig::default());
        let total = due
            .total_interest_due(Money::from_major(100_000), origin(), time.now())
            .unwrap();
        let expected_interest = total - Money::from_major(2_000);

        let payment = expected_interest + Money::from_major(50_000);
        let allocation = account.apply_payment(payment, &time).unwrap();

        assert_eq!(allocation.interest_paid, expected_interest);
        assert_eq!(allocation.principal_paid, Money::from_major(50_000));
        assert_eq!(allocation.excess_amount, Money::ZERO);

        assert_eq!(account.loan.status, LoanStatus::Ended);
        assert_eq!(account.loan.principal_left, Money::ZERO);
        assert_eq!(account.loan.units, dec!(4500000));
        assert_eq!(account.history.len(), 2);
        assert_eq!(account.history[1].principal_after, Money::ZERO);
        assert!(account
            .events
            .events()
            .iter()
            .any(|e| matches!(e, Event::LoanEnded { .. })));

        // settled loan's effective duration: 4500000 / 100000 = 45 days
        let report = account.status(time.now());
        assert_eq!(
            report.effective_end_date,
            Some(origin() + Duration::days(45))
        );
    }

    #[test]
    fn test_interest_shortfall_leaves_principal() {
        let time = test_time();
        let control = time.test_control().unwrap();

        let mut account = LoanAccount::request_standard(
            ClubConfig::default(),
            rich_member(),
            Money::from_major(100_000),
            12,
            &[],
            Money::ZERO,
            &time,
        )
        .unwrap();
        account.approve(&time).unwrap();

        control.advance(Duration::days(30));
        let allocation = account
            .apply_payment(Money::from_major(500), &time)
            .unwrap();

        assert!(allocation.is_interest_shortfall());
        assert_eq!(allocation.principal_paid, Money::from_major(-1_500));
        assert_eq!(account.loan.principal_left, Money::from_major(100_000));
        assert_eq!(account.loan.interest_amount_paid, Money::from_major(500));
        assert!(account
            .events
            .events()
            .iter()
            .any(|e| matches!(e, Event::InterestShortfall { .. })));
    }

    #[test]
    fn test_points_redeemed_against_interest() {
        let time = test_time();
        let control = time.test_control().unwrap();

        // long enough for point-months to accrue: 270 days -> 3 point-months
        let mut account = LoanAccount::request_standard(
            ClubConfig::default(),
            rich_member(),
            Money::from_major(100_000),
            12,
            &[],
            Money::ZERO,
            &time,
        )
        .unwrap();
        account.approve(&time).unwrap();
        let points_after_approval = account.member.points;

        control.advance(Duration::days(270));
        account
            .apply_payment(Money::from_major(30_000), &time)
            .unwrap();

        // 3 point-months x 2000 entitlement = 6000 covered by 6 points
        assert_eq!(
            account.member.points,
            points_after_approval - Points::from_whole(6)
        );
        assert!(account
            .events
            .events()
            .iter()
            .any(|e| matches!(e, Event::PointsRedeemed { .. })));
    }

    #[test]
    fn test_free_loan_lifecycle_and_overdue() {
        let time = test_time();
        let control = time.test_control().unwrap();

        let mut account = LoanAccount::request_free(
            ClubConfig::default(),
            rich_member(),
            Money::from_major(60_000),
            6,
            &[],
            Money::ZERO,
            &time,
        )
        .unwrap();
        account.approve(&time).unwrap();

        // no interest: full payment goes to principal
        control.advance(Duration::days(30));
        let allocation = account
            .apply_payment(Money::from_major(20_000), &time)
            .unwrap();
        assert_eq!(allocation.interest_paid, Money::ZERO);
        assert_eq!(allocation.principal_paid, Money::from_major(20_000));

        // overdue once the agreed six months pass with principal left
        control.advance(Duration::days(170));
        let report = account.status(time.now());
        let overdue = report.overdue.unwrap();
        assert!(overdue.is_overdue);
        assert_eq!(overdue.days_overdue, 20);

        // settling clears the flag
        let _ = account
            .apply_payment(Money::from_major(40_000), &time)
            .unwrap();
        let report = account.status(time.now());
        assert_eq!(report.status, LoanStatus::Ended);
        assert!(!report.overdue.unwrap().is_overdue);
    }

    #[test]
    fn test_free_loan_ineligible_member() {
        let time = test_time();
        let member = Member::new(Money::from_major(10_000), Points::ZERO);

        let result = LoanAccount::request_free(
            ClubConfig::default(),
            member,
            Money::from_major(100_000),
            6,
            &[],
            Money::ZERO,
            &time,
        );

        assert!(matches!(result, Err(EngineError::NotEligible { .. })));
    }
}
