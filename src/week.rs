//! Week calendar
//!
//! Weeks run Monday through Sunday.

use chrono::{Datelike, Duration, NaiveDate};

/// ISO date format used in storage and tool arguments
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The Monday on or before `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_monday() as i64;
    date - Duration::days(offset)
}

/// The seven dates of the week containing `date`, Monday first
pub fn week_dates(date: NaiveDate) -> [NaiveDate; 7] {
    let start = week_start(date);
    std::array::from_fn(|i| start + Duration::days(i as i64))
}

/// Move `date` by whole weeks (negative goes back)
pub fn shift_weeks(date: NaiveDate, weeks: i64) -> NaiveDate {
    date + Duration::weeks(weeks)
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|e| format!("Invalid date '{}' (expected YYYY-MM-DD): {}", s, e))
}

/// Format a date as `YYYY-MM-DD`
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_week_start_monday() {
        // 2024-06-05 is a Wednesday
        assert_eq!(week_start(d(2024, 6, 5)), d(2024, 6, 3));
        assert_eq!(week_start(d(2024, 6, 3)), d(2024, 6, 3));
    }

    #[test]
    fn test_sunday_belongs_to_previous_monday() {
        assert_eq!(week_start(d(2024, 6, 9)), d(2024, 6, 3));
    }

    #[test]
    fn test_week_dates_cross_month() {
        let dates = week_dates(d(2024, 7, 1));
        assert_eq!(dates[0], d(2024, 7, 1));
        assert_eq!(dates[0].weekday(), Weekday::Mon);
        assert_eq!(dates[6], d(2024, 7, 7));

        let dates = week_dates(d(2024, 2, 29));
        assert_eq!(dates[0], d(2024, 2, 26));
        assert_eq!(dates[6], d(2024, 3, 3));
    }

    #[test]
    fn test_shift_weeks() {
        assert_eq!(shift_weeks(d(2024, 6, 3), 1), d(2024, 6, 10));
        assert_eq!(shift_weeks(d(2024, 6, 3), -1), d(2024, 5, 27));
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-06-03").unwrap(), d(2024, 6, 3));
        assert!(parse_date("03/06/2024").is_err());
        assert_eq!(format_date(d(2024, 6, 3)), "2024-06-03");
    }
}
