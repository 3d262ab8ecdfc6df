//! Date parsing for date-range filters.
//!
//! Cells and bounds are compared as local wall-clock instants. A `from`
//! bound covers its whole day starting at 00:00:00, a `to` bound runs
//! until 23:59:59.999 of its day.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};

use crate::data::datatable::DataValue;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parse a date or datetime text. `None` when no known format fits.
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(zoned) = DateTime::parse_from_rfc3339(text) {
        return Some(zoned.with_timezone(&Local).naive_local());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .map(|date| date.and_time(NaiveTime::MIN))
}

/// Instant of a cell, if it holds something date-like
pub fn cell_datetime(value: &DataValue) -> Option<NaiveDateTime> {
    match value {
        DataValue::DateTime(text) | DataValue::String(text) => parse_datetime(text),
        _ => None,
    }
}

/// Start of the day named by a `from` bound
pub fn day_start(bound: &str) -> Option<NaiveDateTime> {
    parse_datetime(bound).map(|dt| dt.date().and_time(NaiveTime::MIN))
}

/// Last millisecond of the day named by a `to` bound
pub fn day_end(bound: &str) -> Option<NaiveDateTime> {
    let end_of_day = NaiveTime::from_hms_milli_opt(23, 59, 59, 999)?;
    parse_datetime(bound).map(|dt| dt.date().and_time(end_of_day))
}

/// Inclusive day-granular window check. Empty bounds are unbounded;
/// an unparseable cell or bound never matches.
pub fn within(cell: &DataValue, from: &str, to: &str) -> bool {
    let Some(instant) = cell_datetime(cell) else {
        return false;
    };

    if !from.is_empty() {
        match day_start(from) {
            Some(start) if instant >= start => {}
            _ => return false,
        }
    }

    if !to.is_empty() {
        match day_end(to) {
            Some(end) if instant <= end => {}
            _ => return false,
        }
    }

    true
}
