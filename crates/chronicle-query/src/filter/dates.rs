//! Date bound parsing for the occurredAt range filter.

use chrono::{DateTime, Months, NaiveDate, NaiveDateTime, TimeZone, Utc};

use chronicle_core::constants::OPEN_RANGE_YEARS;
use chronicle_core::errors::ChronicleResult;
use chronicle_core::ChronicleError;

use super::DateRange;

/// Which end of a range a bound sits on. Date-only input expands to the
/// start or the end of that day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Start,
    End,
}

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse one bound. Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`,
/// `YYYY-MM-DDTHH:MM:SS` (UTC) and `YYYY-MM-DD`.
pub fn parse_bound(raw: &str, bound: Bound) -> ChronicleResult<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let (h, m, s) = match bound {
            Bound::Start => (0, 0, 0),
            Bound::End => (23, 59, 59),
        };
        if let Some(naive) = date.and_hms_opt(h, m, s) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    Err(ChronicleError::data_format(raw, "unrecognized date format"))
}

/// Resolve a range to concrete inclusive bounds. A missing start is the
/// epoch; a missing end is far in the future.
pub fn resolve_range(range: &DateRange, now: DateTime<Utc>) -> ChronicleResult<(DateTime<Utc>, DateTime<Utc>)> {
    let from = match &range.from {
        Some(raw) => parse_bound(raw, Bound::Start)?,
        None => DateTime::<Utc>::UNIX_EPOCH,
    };
    let to = match &range.to {
        Some(raw) => parse_bound(raw, Bound::End)?,
        None => open_end(now),
    };
    Ok((from, to))
}

fn open_end(now: DateTime<Utc>) -> DateTime<Utc> {
    now.checked_add_months(Months::new(OPEN_RANGE_YEARS * 12))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
