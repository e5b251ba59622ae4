//! Trailing-week completion report.

use crate::dtos::ReportEntry;
use crate::models::{parse_completion_date, Habit};
use chrono::{Days, NaiveDate};

/// Days before `today` still inside the report window.
pub const REPORT_WINDOW_DAYS: u64 = 7;

/// One entry per habit, in the order given, counting completions dated
/// within `[today - 7 days, today]`. Entries that don't parse as a date are
/// not counted.
pub fn weekly_report(habits: &[Habit], today: NaiveDate) -> Vec<ReportEntry> {
    let window_start = today
        .checked_sub_days(Days::new(REPORT_WINDOW_DAYS))
        .unwrap_or(NaiveDate::MIN);

    habits
        .iter()
        .map(|habit| ReportEntry {
            name: habit.name.clone(),
            daily_goal: habit.daily_goal.clone(),
            completed_days: habit
                .completion_dates
                .iter()
                .filter_map(|entry| parse_completion_date(entry))
                .filter(|date| (window_start..=today).contains(date))
                .count(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn habit_with(dates: &[&str]) -> Habit {
        let mut habit = Habit::new(Some("Drink Water".to_string()), Some(8.into()));
        habit.completion_dates = dates.iter().map(|d| d.to_string()).collect();
        habit
    }

    #[test]
    fn counts_only_the_trailing_week() {
        let today = day(2026, 10, 18);
        let habit = habit_with(&["2026-10-18", "2026-10-15", "2026-10-12", "2026-10-08"]);

        let report = weekly_report(&[habit], today);

        assert_eq!(report.len(), 1);
        assert_eq!(report[0].name.as_deref(), Some("Drink Water"));
        assert_eq!(report[0].daily_goal, Some(8.into()));
        assert_eq!(report[0].completed_days, 3);
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let today = day(2026, 10, 18);
        let habit = habit_with(&["2026-10-11", "2026-10-18", "2026-10-10", "2026-10-19"]);

        let report = weekly_report(&[habit], today);

        assert_eq!(report[0].completed_days, 2);
    }

    #[test]
    fn duplicates_are_each_counted() {
        let today = day(2026, 10, 18);
        let habit = habit_with(&["2026-10-17", "2026-10-17"]);

        assert_eq!(weekly_report(&[habit], today)[0].completed_days, 2);
    }

    #[test]
    fn malformed_dates_are_skipped() {
        let today = day(2026, 10, 18);
        let habit = habit_with(&["last tuesday", "2026-10-16", "16/10/2026"]);

        assert_eq!(weekly_report(&[habit], today)[0].completed_days, 1);
    }

    #[test]
    fn window_spans_month_boundary() {
        let today = day(2026, 3, 3);
        let habit = habit_with(&["2026-02-24", "2026-02-23", "2026-03-01"]);

        assert_eq!(weekly_report(&[habit], today)[0].completed_days, 2);
    }

    #[test]
    fn keeps_store_order_and_absent_fields() {
        let today = day(2026, 10, 18);
        let busy = habit_with(&["2026-10-18", "2026-10-17"]);
        let idle = Habit::new(None, None);

        let report = weekly_report(&[idle, busy], today);

        assert_eq!(report[0].name, None);
        assert_eq!(report[0].daily_goal, None);
        assert_eq!(report[0].completed_days, 0);
        assert_eq!(report[1].completed_days, 2);
    }
}
