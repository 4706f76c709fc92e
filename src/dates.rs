//! Processing-date handling: expression parsing, range iteration and
//! filename-embedded date extraction.
//!
//! Date expressions come from configuration and are either absolute
//! (`2024-01-15`) or relative (`today`, `yesterday`, `-1 day`, `3 days ago`).
//! Ranges iterate `[from, to)` in ascending order.

use chrono::{Duration, NaiveDate};
use regex::Regex;
use std::sync::OnceLock;

use crate::error::TransferError;

/// Date-token formatting policy for remote folder names and filename matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateFormat {
    /// `%Y-%m-%d`
    #[default]
    Dash,
    /// `%Y_%m_%d`
    Underscore,
}

impl DateFormat {
    pub fn pattern(&self) -> &'static str {
        match self {
            DateFormat::Dash => "%Y-%m-%d",
            DateFormat::Underscore => "%Y_%m_%d",
        }
    }

    pub fn format(&self, date: NaiveDate) -> String {
        date.format(self.pattern()).to_string()
    }
}

fn relative_days_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:-\s*(\d+)\s*days?|(\d+)\s*days?\s+ago)$").expect("static pattern")
    })
}

fn embedded_date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(\d{4})[-_](\d{2})[-_](\d{2})").expect("static pattern"))
}

/// Parse a configured date expression relative to `today`.
///
/// Accepted: `%Y-%m-%d` absolutes, `today`, `now`, `yesterday`, `-N day(s)`,
/// `N day(s) ago`. Anything else is a [`TransferError::DateParse`].
pub fn parse_date_expression(expr: &str, today: NaiveDate) -> Result<NaiveDate, TransferError> {
    let trimmed = expr.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "today" | "now" => return Ok(today),
        "yesterday" => return Ok(today - Duration::days(1)),
        _ => {}
    }

    let lowered = trimmed.to_ascii_lowercase();
    if let Some(caps) = relative_days_pattern().captures(&lowered) {
        let digits = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())
            .unwrap_or_default();
        let days: i64 = digits
            .parse()
            .map_err(|_| TransferError::DateParse(expr.to_string()))?;
        return Ok(today - Duration::days(days));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|_| TransferError::DateParse(expr.to_string()))
}

/// All calendar days in `[from, to)`, ascending. `from == to` is empty.
pub fn dates_between(from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut current = from;
    while current < to {
        dates.push(current);
        current += Duration::days(1);
    }
    dates
}

/// First `YYYY-MM-DD` or `YYYY_MM_DD` token embedded in a file name, if any.
pub fn extract_embedded_date(name: &str) -> Option<NaiveDate> {
    let caps = embedded_date_pattern().captures(name)?;
    let year: i32 = caps.get(1)?.as_str().parse().ok()?;
    let month: u32 = caps.get(2)?.as_str().parse().ok()?;
    let day: u32 = caps.get(3)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn previous_day(date: NaiveDate) -> NaiveDate {
    date - Duration::days(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn formats_both_policies() {
        let d = date(2024, 1, 15);
        assert_eq!(DateFormat::Dash.format(d), "2024-01-15");
        assert_eq!(DateFormat::Underscore.format(d), "2024_01_15");
    }

    #[test]
    fn parses_absolute_dates() {
        let today = date(2024, 6, 1);
        assert_eq!(
            parse_date_expression("2024-01-15", today).unwrap(),
            date(2024, 1, 15)
        );
    }

    #[test]
    fn parses_relative_expressions() {
        let today = date(2024, 6, 1);
        assert_eq!(parse_date_expression("today", today).unwrap(), today);
        assert_eq!(parse_date_expression("now", today).unwrap(), today);
        assert_eq!(
            parse_date_expression("yesterday", today).unwrap(),
            date(2024, 5, 31)
        );
        assert_eq!(
            parse_date_expression("-1 day", today).unwrap(),
            date(2024, 5, 31)
        );
        assert_eq!(
            parse_date_expression("-7 days", today).unwrap(),
            date(2024, 5, 25)
        );
        assert_eq!(
            parse_date_expression("3 days ago", today).unwrap(),
            date(2024, 5, 29)
        );
    }

    #[test]
    fn rejects_unparsable_expressions() {
        let today = date(2024, 6, 1);
        let err = parse_date_expression("last tuesday", today).unwrap_err();
        assert!(matches!(err, TransferError::DateParse(_)));
        assert!(err.to_string().contains("last tuesday"));
        assert!(parse_date_expression("2024-13-40", today).is_err());
    }

    #[test]
    fn range_is_inclusive_start_exclusive_end_ascending() {
        let days = dates_between(date(2024, 1, 30), date(2024, 2, 2));
        assert_eq!(
            days,
            vec![date(2024, 1, 30), date(2024, 1, 31), date(2024, 2, 1)]
        );
    }

    #[test]
    fn empty_range_when_from_equals_to() {
        assert!(dates_between(date(2024, 1, 15), date(2024, 1, 15)).is_empty());
        assert!(dates_between(date(2024, 1, 16), date(2024, 1, 15)).is_empty());
    }

    #[test]
    fn extracts_embedded_dates_in_either_separator_style() {
        assert_eq!(
            extract_embedded_date("report_2024_01_14_final.csv"),
            Some(date(2024, 1, 14))
        );
        assert_eq!(
            extract_embedded_date("report-2024-01-14.csv"),
            Some(date(2024, 1, 14))
        );
        assert_eq!(extract_embedded_date("report.csv"), None);
    }

    #[test]
    fn previous_day_crosses_month_boundary() {
        assert_eq!(previous_day(date(2024, 3, 1)), date(2024, 2, 29));
    }
}
