//! Reporting date windows.
//!
//! All day bucketing happens in the store's reporting timezone
//! (Asia/Kolkata, UTC+5:30). Upstreams report UTC timestamps; bucketing
//! them naively would shift late-evening orders onto the next calendar day.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::error::{AppError, Result};

pub const REPORTING_TZ: Tz = chrono_tz::Asia::Kolkata;

const DATE_FMT: &str = "%Y-%m-%d";

/// Today's calendar date in the reporting timezone.
pub fn today_local() -> NaiveDate {
    Utc::now().with_timezone(&REPORTING_TZ).date_naive()
}

/// Inclusive calendar date range, in the reporting timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(AppError::validation(format!(
                "startDate {} is after endDate {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Trailing 30 calendar days ending today (the default report window).
    pub fn trailing_30_days() -> Self {
        Self::trailing_days(30, today_local())
    }

    pub fn trailing_days(days: i64, end: NaiveDate) -> Self {
        Self {
            start: end - Duration::days(days - 1),
            end,
        }
    }

    /// Resolve request parameters: both dates present -> parsed window,
    /// both absent -> default trailing 30 days, one absent -> rejected.
    pub fn resolve(start: Option<&str>, end: Option<&str>) -> Result<Self> {
        match (start, end) {
            (Some(s), Some(e)) => {
                let start = parse_date(s)?;
                let end = parse_date(e)?;
                Self::new(start, end)
            }
            (None, None) => Ok(Self::trailing_30_days()),
            _ => Err(AppError::validation(
                "startDate and endDate must be provided together",
            )),
        }
    }

    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Every calendar day in the window, in order, both endpoints included.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        (0..self.num_days()).map(move |offset| start + Duration::days(offset))
    }

    /// Start of the first day, as an upstream query bound with the fixed
    /// reporting offset.
    pub fn start_bound(&self) -> String {
        format!("{}T00:00:00+05:30", self.start)
    }

    /// End of the last day, inclusive.
    pub fn end_bound(&self) -> String {
        format!("{}T23:59:59+05:30", self.end)
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FMT)
        .map_err(|_| AppError::validation(format!("invalid date '{}', expected YYYY-MM-DD", raw)))
}

/// Parse an upstream event timestamp into a reporting-timezone calendar day.
///
/// Accepts RFC 3339 (commerce and ad platforms), the logistics platform's
/// naive `YYYY-MM-DD HH:MM:SS` (already local), and bare dates.
pub fn parse_event_date(raw: &str) -> Option<NaiveDate> {
    if raw.is_empty() || raw.starts_with("0000-00-00") {
        return None;
    }
    if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&REPORTING_TZ).date_naive());
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(ts.date());
    }
    NaiveDate::parse_from_str(raw, DATE_FMT).ok()
}

/// Year + month pair used for trailing trend series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).expect("month key is always valid")
    }

    /// Short uppercase month label ("JAN" .. "DEC") for chart axes.
    pub fn label(&self) -> String {
        self.first_day().format("%b").to_string().to_uppercase()
    }
}

/// The `n` calendar months ending with the month of `end`, oldest first.
pub fn trailing_months(end: NaiveDate, n: usize) -> Vec<MonthKey> {
    let mut months = Vec::with_capacity(n);
    let mut year = end.year();
    let mut month = end.month();
    for _ in 0..n {
        months.push(MonthKey { year, month });
        if month == 1 {
            month = 12;
            year -= 1;
        } else {
            month -= 1;
        }
    }
    months.reverse();
    months
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn resolve_parses_explicit_window() {
        let w = DateWindow::resolve(Some("2025-06-01"), Some("2025-06-03")).unwrap();
        assert_eq!(w.start, d(2025, 6, 1));
        assert_eq!(w.end, d(2025, 6, 3));
        assert_eq!(w.num_days(), 3);
    }

    #[test]
    fn resolve_defaults_to_trailing_30_days() {
        let w = DateWindow::resolve(None, None).unwrap();
        assert_eq!(w.num_days(), 30);
        assert_eq!(w.end, today_local());
    }

    #[test]
    fn resolve_rejects_half_specified_window() {
        assert!(DateWindow::resolve(Some("2025-06-01"), None).is_err());
    }

    #[test]
    fn resolve_rejects_inverted_window() {
        assert!(DateWindow::resolve(Some("2025-06-03"), Some("2025-06-01")).is_err());
    }

    #[test]
    fn days_covers_both_endpoints() {
        let w = DateWindow::new(d(2025, 5, 30), d(2025, 6, 2)).unwrap();
        let days: Vec<_> = w.days().collect();
        assert_eq!(
            days,
            vec![d(2025, 5, 30), d(2025, 5, 31), d(2025, 6, 1), d(2025, 6, 2)]
        );
    }

    #[test]
    fn event_date_buckets_utc_timestamps_into_local_days() {
        // 20:00 UTC is 01:30 the next day in Kolkata
        assert_eq!(
            parse_event_date("2025-06-01T20:00:00Z"),
            Some(d(2025, 6, 2))
        );
        assert_eq!(
            parse_event_date("2025-06-01T10:00:00Z"),
            Some(d(2025, 6, 1))
        );
    }

    #[test]
    fn event_date_handles_logistics_formats() {
        assert_eq!(
            parse_event_date("2025-06-01 10:30:00"),
            Some(d(2025, 6, 1))
        );
        assert_eq!(parse_event_date("0000-00-00 00:00:00"), None);
        assert_eq!(parse_event_date(""), None);
    }

    #[test]
    fn trailing_months_wraps_year_boundary() {
        let months = trailing_months(d(2025, 2, 15), 6);
        assert_eq!(months.len(), 6);
        assert_eq!(months[0], MonthKey { year: 2024, month: 9 });
        assert_eq!(months[5], MonthKey { year: 2025, month: 2 });
        assert_eq!(months[5].label(), "FEB");
    }
}
