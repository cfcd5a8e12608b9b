//! Day-to-date mapping for the plan week
//!
//! Plans are keyed by weekday; consumption is keyed by calendar date. A
//! weekday maps to the matching date of the week the plan belongs to, where
//! weeks run Sunday to Saturday.

use chrono::{Datelike, Duration, NaiveDate};

use crate::domain::Weekday;

/// Sunday on or before `date`
#[must_use]
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

/// Date of `day` in the week starting at `week_start`
#[must_use]
pub fn date_for_day(day: Weekday, week_start: NaiveDate) -> NaiveDate {
    week_start + Duration::days(i64::from(day.days_from_sunday()))
}

/// Backend date key (`YYYY-MM-DD`)
#[must_use]
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Weekday of `date`
#[must_use]
pub fn weekday_of(date: NaiveDate) -> Weekday {
    Weekday::from(date.weekday())
}

/// Today in local time
#[must_use]
pub fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_week_starts_on_sunday() {
        // 2024-03-06 is a Wednesday
        assert_eq!(week_start(ymd(2024, 3, 6)), ymd(2024, 3, 3));
        assert_eq!(week_start(ymd(2024, 3, 3)), ymd(2024, 3, 3));
        assert_eq!(week_start(ymd(2024, 3, 9)), ymd(2024, 3, 3));
    }

    #[test]
    fn test_date_for_day_stays_in_week() {
        let start = ymd(2024, 3, 3);
        assert_eq!(date_for_day(Weekday::Sunday, start), start);
        assert_eq!(date_for_day(Weekday::Saturday, start), ymd(2024, 3, 9));
        assert_eq!(date_key(date_for_day(Weekday::Monday, start)), "2024-03-04");
    }

    #[test]
    fn test_week_crossing_month_boundary() {
        // 2024-03-01 is a Friday
        let start = week_start(ymd(2024, 3, 1));
        assert_eq!(start, ymd(2024, 2, 25));
        assert_eq!(date_key(date_for_day(Weekday::Thursday, start)), "2024-02-29");
        assert_eq!(weekday_of(ymd(2024, 3, 1)), Weekday::Friday);
    }
}
