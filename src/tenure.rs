use chrono::{DateTime, Utc};

use crate::config::ClubConfig;
use crate::errors::{EngineError, Result};

/// whole-day difference between two calendar instants
///
/// comparisons are calendar-day granular: sub-day components are dropped
/// before subtracting, so 23:59 and 00:01 of the same day are zero days
/// apart; may be negative when `end` precedes `start`
pub fn days_between(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    (end.date_naive() - start.date_naive()).num_days()
}

/// converts day-counts into billing months and point-month accrual
pub struct TenureCalculator {
    pub config: ClubConfig,
}

impl TenureCalculator {
    pub fn new(config: ClubConfig) -> Self {
        Self { config }
    }

    /// billing months due between two dates
    ///
    /// up to `grace_period_days` past a month boundary still bills as that
    /// month; crossing the grace window advances the count. a started loan
    /// is never billed less than one month, except at zero elapsed days
    pub fn total_months_due(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<u32> {
        let days = days_between(start, end);
        if days < 0 {
            return Err(EngineError::InvalidDateRange {
                start: start.date_naive(),
                end: end.date_naive(),
            });
        }
        if days == 0 {
            return Ok(0);
        }

        let month = self.config.one_month_days;
        let grace = self.config.grace_period_days;
        let months = (days - grace + month - 1).div_euclid(month);
        Ok(months.max(1) as u32)
    }

    /// point-months a member's savings have earned between two dates
    ///
    /// accrual is windowed per year: the first `year_month_threshold` months
    /// of each accrual year earn nothing, every month past the threshold
    /// earns one point-month. negative spans accrue nothing
    pub fn point_months_accrued(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> u32 {
        let days = days_between(start, end);
        if days <= 0 {
            return 0;
        }

        let elapsed_months = (days / self.config.one_month_days) as u32;
        let year = self.config.one_year_months;
        let threshold = self.config.year_month_threshold;

        let full_years = elapsed_months / year;
        let partial_months = elapsed_months % year;

        full_years * (year - threshold) + partial_months.saturating_sub(threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn origin() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn after_days(days: i64) -> DateTime<Utc> {
        origin() + Duration::days(days)
    }

    #[test]
    fn test_days_between_ignores_time_of_day() {
        let morning = Utc.with_ymd_and_hms(2024, 1, 1, 0, 1, 0).unwrap();
        let night = Utc.with_ymd_and_hms(2024, 1, 1, 23, 59, 0).unwrap();
        assert_eq!(days_between(morning, night), 0);

        let next_day = Utc.with_ymd_and_hms(2024, 1, 2, 0, 1, 0).unwrap();
        assert_eq!(days_between(night, next_day), 1);
    }

    #[test]
    fn test_days_between_negative() {
        assert_eq!(days_between(after_days(10), origin()), -10);
    }

    #[test]
    fn test_months_due_boundary_table() {
        let calc = TenureCalculator::new(ClubConfig::default());

        let fixtures = [
            (0, 0),
            (1, 1),
            (7, 1),
            (8, 1),
            (30, 1),
            (37, 1),
            (38, 2),
            (60, 2),
            (67, 2),
            (68, 3),
            (365, 12),
            (730, 25),
        ];
        for (days, expected) in fixtures {
            assert_eq!(
                calc.total_months_due(origin(), after_days(days)).unwrap(),
                expected,
                "months due after {} days",
                days
            );
        }
    }

    #[test]
    fn test_months_due_monotonic() {
        let calc = TenureCalculator::new(ClubConfig::default());

        let mut previous = 0;
        for days in 0..=800 {
            let months = calc.total_months_due(origin(), after_days(days)).unwrap();
            assert!(months >= previous, "dipped at day {}", days);
            previous = months;
        }
    }

    #[test]
    fn test_months_due_rejects_inverted_range() {
        let calc = TenureCalculator::new(ClubConfig::default());
        assert!(matches!(
            calc.total_months_due(after_days(5), origin()),
            Err(EngineError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn test_point_months_fixture_table() {
        let calc = TenureCalculator::new(ClubConfig::default());

        let fixtures = [
            (180, 0),
            (181, 0),
            (270, 3),
            (360, 6),
            (450, 6),
            (600, 8),
            (720, 12),
            (1080, 18),
        ];
        for (days, expected) in fixtures {
            assert_eq!(
                calc.point_months_accrued(origin(), after_days(days)),
                expected,
                "point-months after {} days",
                days
            );
        }
    }

    #[test]
    fn test_point_months_never_negative() {
        let calc = TenureCalculator::new(ClubConfig::default());
        assert_eq!(calc.point_months_accrued(after_days(100), origin()), 0);
        assert_eq!(calc.point_months_accrued(origin(), origin()), 0);
    }

    #[test]
    fn test_point_months_average_half_per_month() {
        // six point-months per twelve elapsed months
        let calc = TenureCalculator::new(ClubConfig::default());
        for years in 1..=5i64 {
            assert_eq!(
                calc.point_months_accrued(origin(), after_days(years * 360)),
                (years as u32) * 6
            );
        }
    }
}
