use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use crate::models::CellValue;

/// Canonical textual form used for grouping and display.
pub const CANONICAL_FORMAT: &str = "%d/%m/%Y";

/// Two-digit years (`0026`) are rejected rather than read as year 26.
const MIN_YEAR: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq)]
enum FieldOrder {
    DayMonthYear,
    YearMonthDay,
}

struct DatePattern {
    regex: Regex,
    order: FieldOrder,
}

/// Ordered: the first pattern that matches structurally decides the outcome.
fn patterns() -> &'static [DatePattern] {
    static PATTERNS: OnceLock<Vec<DatePattern>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            (r"^(\d{2})[/-](\d{2})[/-](\d{4})$", FieldOrder::DayMonthYear),
            (r"^(\d{4})[/-](\d{2})[/-](\d{2})$", FieldOrder::YearMonthDay),
        ]
        .into_iter()
        .filter_map(|(re, order)| Regex::new(re).ok().map(|regex| DatePattern { regex, order }))
        .collect()
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedDate {
    pub date: NaiveDate,
    pub canonical: String,
}

impl NormalizedDate {
    fn from_date(date: NaiveDate) -> Self {
        Self {
            date,
            canonical: date.format(CANONICAL_FORMAT).to_string(),
        }
    }
}

/// Excel 1900 system: serial 25569 is 1970-01-01. The time-of-day fraction is dropped.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let days = serial.floor();
    if days.abs() > 3_000_000.0 {
        return None;
    }
    base.checked_add_signed(chrono::Duration::days(days as i64))
}

fn parse_date_text(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let pattern = patterns().iter().find(|p| p.regex.is_match(raw))?;
    let caps = pattern.regex.captures(raw)?;
    let a: u32 = caps[1].parse().ok()?;
    let b: u32 = caps[2].parse().ok()?;
    let c: u32 = caps[3].parse().ok()?;
    let (year, month, day) = match pattern.order {
        FieldOrder::DayMonthYear => (c, b, a),
        FieldOrder::YearMonthDay => (a, b, c),
    };
    if year < MIN_YEAR {
        return None;
    }
    // from_ymd_opt refuses out-of-range fields instead of rolling them over
    let date = NaiveDate::from_ymd_opt(year as i32, month, day)?;
    if date.year() != year as i32 || date.month() != month || date.day() != day {
        return None;
    }
    Some(date)
}

/// Normalizes a date cell of any supported shape. `None` means the value is not a valid date.
pub fn normalize_date(value: &CellValue) -> Option<NormalizedDate> {
    let date = match value {
        CellValue::Date(d) => Some(*d),
        CellValue::Number(serial) => excel_serial_to_date(*serial),
        CellValue::Text(s) => parse_date_text(s),
        CellValue::Empty => None,
    }?;
    Some(NormalizedDate::from_date(date))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn canonical(v: &CellValue) -> Option<String> {
        normalize_date(v).map(|d| d.canonical)
    }

    #[test]
    fn test_canonical_is_format_invariant() {
        assert_eq!(canonical(&text("05/03/2026")), Some("05/03/2026".to_string()));
        assert_eq!(canonical(&text("05-03-2026")), Some("05/03/2026".to_string()));
        assert_eq!(canonical(&text("2026-03-05")), Some("05/03/2026".to_string()));
        assert_eq!(canonical(&text("2026/03/05")), Some("05/03/2026".to_string()));
    }

    #[test]
    fn test_rejects_impossible_dates() {
        assert_eq!(canonical(&text("31/02/2026")), None); // Feb 31
        assert_eq!(canonical(&text("30/02/2024")), None); // leap year still has no Feb 30
        assert_eq!(canonical(&text("31/04/2026")), None); // 30-day month
        assert_eq!(canonical(&text("01/13/2026")), None); // month 13
        assert_eq!(canonical(&text("2026-02-29")), None);
        assert_eq!(canonical(&text("29/02/2024")), Some("29/02/2024".to_string()));
    }

    #[test]
    fn test_dmy_match_is_not_retried_as_ymd() {
        // 12/31 would be a valid month/day pair, but DMY matched first and failed
        assert_eq!(canonical(&text("12/31/2026")), None);
    }

    #[test]
    fn test_rejects_years_below_100() {
        assert_eq!(canonical(&text("05/03/0026")), None);
        assert_eq!(canonical(&text("0099-12-31")), None);
        assert_eq!(canonical(&text("01/01/0100")), Some("01/01/0100".to_string()));
    }

    #[test]
    fn test_rejects_other_shapes() {
        assert_eq!(canonical(&text("5/3/2026")), None);
        assert_eq!(canonical(&text("March 5, 2026")), None);
        assert_eq!(canonical(&text("05.03.2026")), None);
        assert_eq!(canonical(&text("")), None);
        assert_eq!(canonical(&CellValue::Empty), None);
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        assert_eq!(canonical(&text(" 15/01/2026 ")), Some("15/01/2026".to_string()));
    }

    #[test]
    fn test_native_date_accepted() {
        let d = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let n = normalize_date(&CellValue::Date(d)).unwrap();
        assert_eq!(n.date, d);
        assert_eq!(n.canonical, "15/01/2026");
    }

    #[test]
    fn test_serial_dates() {
        assert_eq!(canonical(&CellValue::Number(25569.0)), Some("01/01/1970".to_string()));
        assert_eq!(canonical(&CellValue::Number(45667.0)), Some("10/01/2025".to_string()));
        assert_eq!(canonical(&CellValue::Number(45667.75)), Some("10/01/2025".to_string()));
        assert_eq!(canonical(&CellValue::Number(f64::NAN)), None);
    }
}
