//! Calendar-month arithmetic.
//!
//! All monthly series are indexed by the first day of the month.

use chrono::{Datelike, NaiveDate};

/// Truncate a date to the first day of its month.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Shift a month-start date by `months` (may be negative).
pub fn add_months(date: NaiveDate, months: i32) -> NaiveDate {
    let idx = date.year() * 12 + date.month0() as i32 + months;
    let year = idx.div_euclid(12);
    let month0 = idx.rem_euclid(12) as u32;
    NaiveDate::from_ymd_opt(year, month0 + 1, 1).unwrap_or(date)
}

/// Whole months from `from` to `to`: `(to.year - from.year) * 12 + (to.month - from.month)`.
///
/// Day-of-month is ignored; the result is negative when `to` precedes `from`.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i32 {
    (to.year() - from.year()) * 12 + (to.month() as i32 - from.month() as i32)
}

/// Parse `YYYY-MM` (or a full `YYYY-MM-DD`) into a month-start date.
pub fn parse_month(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(month_start(d));
    }
    NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn add_months_crosses_years() {
        assert_eq!(add_months(d(2024, 11, 1), 3), d(2025, 2, 1));
        assert_eq!(add_months(d(2024, 1, 1), -1), d(2023, 12, 1));
        assert_eq!(add_months(d(2019, 1, 1), 36), d(2022, 1, 1));
    }

    #[test]
    fn months_between_ignores_day() {
        assert_eq!(months_between(d(2025, 6, 30), d(2026, 12, 1)), 18);
        assert_eq!(months_between(d(2026, 12, 1), d(2026, 12, 15)), 0);
        assert_eq!(months_between(d(2027, 1, 1), d(2026, 12, 1)), -1);
    }

    #[test]
    fn parse_month_accepts_both_forms() {
        assert_eq!(parse_month("2026-12"), Some(d(2026, 12, 1)));
        assert_eq!(parse_month("2026-12-17"), Some(d(2026, 12, 1)));
        assert_eq!(parse_month("Dec 2026"), None);
    }
}
