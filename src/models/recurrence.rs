use jiff::{Span, civil::Date};

use crate::models::task::{Frequency, RecurringRule};

/// Largest day count a `Span` accepts.
const MAX_SPAN_DAYS: i64 = 7_304_484;

/// Computes the date a recurring template moves to once completed on `current`.
///
/// - `daily` advances by `interval` days (missing or zero counts as 1).
/// - `weekly` always advances by 7 days; `days_of_week` is not consulted.
/// - `custom` and unrecognized frequencies degrade to a plain one day step,
///   so a rule this version cannot interpret still keeps the task moving
///   instead of dropping it.
///
/// Results saturate at the maximum representable date.
pub fn next_occurrence(current: Date, rule: &RecurringRule) -> Date {
    let days = match rule.frequency {
        Frequency::Daily => rule.interval.filter(|n| *n > 0).unwrap_or(1),
        Frequency::Weekly => 7,
        Frequency::Custom | Frequency::Unrecognized(_) => 1,
    };
    let days = i64::from(days).min(MAX_SPAN_DAYS);
    current.saturating_add(Span::new().days(days))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    #[test]
    fn test_daily_defaults_to_one_day() {
        let rule = RecurringRule {
            interval: None,
            ..RecurringRule::daily()
        };
        assert_eq!(next_occurrence(date(2024, 1, 1), &rule), date(2024, 1, 2));
    }

    #[test]
    fn test_daily_zero_interval_counts_as_one() {
        let rule = RecurringRule::every_days(0);
        assert_eq!(next_occurrence(date(2024, 1, 1), &rule), date(2024, 1, 2));
    }

    #[test]
    fn test_daily_interval_crosses_month_and_leap_day() {
        let rule = RecurringRule::every_days(3);
        assert_eq!(next_occurrence(date(2024, 2, 27), &rule), date(2024, 3, 1));
    }

    #[test]
    fn test_weekly_ignores_days_of_week() {
        let rule = RecurringRule {
            days_of_week: Some(vec![1, 3, 5]),
            interval: Some(3),
            ..RecurringRule::weekly()
        };
        assert_eq!(next_occurrence(date(2024, 12, 28), &rule), date(2025, 1, 4));
    }

    #[test]
    fn test_unknown_frequency_falls_back_to_one_day() {
        let custom = RecurringRule {
            frequency: Frequency::Custom,
            interval: Some(10),
            days_of_week: None,
        };
        let unknown = RecurringRule {
            frequency: Frequency::Unrecognized("yearly".to_string()),
            interval: None,
            days_of_week: None,
        };
        assert_eq!(next_occurrence(date(2024, 1, 31), &custom), date(2024, 2, 1));
        assert_eq!(next_occurrence(date(2024, 1, 31), &unknown), date(2024, 2, 1));
    }

    #[test]
    fn test_huge_interval_saturates() {
        let rule = RecurringRule::every_days(u32::MAX);
        assert_eq!(next_occurrence(date(2024, 1, 1), &rule), Date::MAX);
    }
}
