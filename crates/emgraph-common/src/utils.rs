//! Shared time and formatting helpers.

use crate::error::{EmGraphError, Result};
use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Parses an IANA time zone name such as `Europe/Paris`.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim().parse::<Tz>().map_err(|e| {
        EmGraphError::validation_field(format!("Unknown time zone '{name}': {e}"), "timezone")
    })
}

/// Converts epoch seconds to a local time. `None` when out of range.
pub fn epoch_to_local(ts: i64, tz: &Tz) -> Option<DateTime<Tz>> {
    DateTime::<Utc>::from_timestamp(ts, 0).map(|utc| utc.with_timezone(tz))
}

/// Local calendar date of an instant, `YYYY-MM-DD`.
pub fn format_local_date<T: TimeZone>(instant: &DateTime<T>) -> String
where
    T::Offset: std::fmt::Display,
{
    instant.format("%Y-%m-%d").to_string()
}

/// Formats an energy amount with two decimals, e.g. `12.50 Wh`.
pub fn format_wh(value: f64) -> String {
    format!("{value:.2} Wh")
}
