//! Week-start computation for weekly focuses.
//!
//! "Current week" is anchored to UTC, not server-local or user-local time, so
//! every deployment partitions weeks identically.

use chrono::{Datelike, NaiveDate, Utc};

/// The ISO-calendar Monday on or before `date`. This is the partition key for
/// all weekly-focus capacity and duplicate checks.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - chrono::Duration::days(date.weekday().num_days_from_monday() as i64)
}

pub fn current_week_start() -> NaiveDate {
    week_start(Utc::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_week_start_tuesday() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 10).unwrap(); // Tuesday
        assert_eq!(week_start(date), NaiveDate::from_ymd_opt(2026, 2, 9).unwrap());
    }

    #[test]
    fn test_week_start_is_monday() {
        let mon = NaiveDate::from_ymd_opt(2026, 2, 9).unwrap();
        assert_eq!(week_start(mon), mon);
    }

    #[test]
    fn test_week_start_sunday() {
        let sun = NaiveDate::from_ymd_opt(2026, 2, 15).unwrap();
        assert_eq!(week_start(sun), NaiveDate::from_ymd_opt(2026, 2, 9).unwrap());
    }

    #[test]
    fn test_week_start_saturday() {
        let sat = NaiveDate::from_ymd_opt(2026, 2, 14).unwrap();
        assert_eq!(week_start(sat), NaiveDate::from_ymd_opt(2026, 2, 9).unwrap());
    }

    #[test]
    fn test_week_start_crosses_month_boundary() {
        let sun = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(); // Sunday
        assert_eq!(week_start(sun), NaiveDate::from_ymd_opt(2026, 2, 23).unwrap());
    }

    #[test]
    fn test_week_start_crosses_year_boundary() {
        let thu = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(); // Thursday
        assert_eq!(week_start(thu), NaiveDate::from_ymd_opt(2025, 12, 29).unwrap());
    }
}
