//! Date helpers shared by the adapters and the normalizers.
//!
//! The provider uses two calendar formats: `YYYY-MMM-DD` (`2025-FEB-20`) on
//! the `/v3`, golf and NASCAR APIs and plain ISO `YYYY-MM-DD` on soccer.

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};

const MONTHS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// `2025-02-20` → `2025-FEB-20`
pub fn format_sdio_date(date: NaiveDate) -> String {
    let month = MONTHS[date.month0() as usize];
    format!("{}-{}-{:02}", date.year(), month, date.day())
}

/// `2025-02-20` → `2025-02-20`
pub fn format_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a provider day into a calendar date.
///
/// Accepts `2025-FEB-20`, `2025-02-20` and anything with an ISO date prefix
/// such as `2025-02-20T00:00:00`. Unparseable input yields `None`.
pub fn sdio_date_to_iso(raw: Option<&str>) -> Option<NaiveDate> {
    let raw = raw?.trim();
    if raw.len() >= 10 {
        if let Some(prefix) = raw.get(..10) {
            if let Ok(date) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
                return Some(date);
            }
        }
    }

    let mut parts = raw.splitn(3, '-');
    let year: i32 = parts.next()?.parse().ok()?;
    let month_abbr = parts.next()?.to_uppercase();
    let day: u32 = parts.next()?.split('T').next()?.parse().ok()?;
    let month = MONTHS.iter().position(|m| *m == month_abbr)? as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse a provider timestamp (`2025-02-20T19:30:00`, optional fraction).
pub fn parse_date_time(raw: Option<&str>) -> Option<NaiveDateTime> {
    let raw = raw?.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d")
                .ok()?
                .and_hms_opt(0, 0, 0)
        })
}

/// Whether `date` falls inside `[start, end]`. A missing end collapses the
/// range to the start day; a missing start is never in range.
pub fn is_date_in_range(date: NaiveDate, start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
    let Some(start) = start else {
        return false;
    };
    let end = end.unwrap_or(start);
    start <= date && date <= end
}

/// Today's calendar date in the local timezone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Season string used by the season-based APIs (the calendar year).
pub fn season_of(date: NaiveDate) -> String {
    date.year().to_string()
}
