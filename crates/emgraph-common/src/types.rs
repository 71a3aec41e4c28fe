//! Common type definitions and newtype wrappers for domain modeling.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Timelike};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Sample spacing assumed when a batch does not carry a `period`.
pub const DEFAULT_PERIOD_SECS: i64 = 60;

/// Format used to render hour keys, e.g. `2024-01-01 07`.
pub const HOUR_KEY_FORMAT: &str = "%Y-%m-%d %H";

/// A device channel selector (the `id` query parameter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ChannelId(pub u32);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pagination token returned by the device as `next_record_ts`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Cursor(pub i64);

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One calendar hour in local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HourKey(NaiveDateTime);

impl HourKey {
    /// Key of the hour containing `instant`, in the instant's own zone.
    pub fn containing<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        let local = instant.naive_local();
        Self::truncate(local)
    }

    /// Key of the hour containing a naive local time.
    pub fn truncate(local: NaiveDateTime) -> Self {
        let start = local
            .date()
            .and_hms_opt(local.hour(), 0, 0)
            .unwrap_or(local);
        Self(start)
    }

    /// Build a key from its parts. Returns `None` for an invalid date or hour.
    pub fn from_ymd_h(year: i32, month: u32, day: u32, hour: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(hour, 0, 0))
            .map(Self)
    }

    /// Local wall-clock start of the hour.
    pub const fn start(&self) -> NaiveDateTime {
        self.0
    }

    /// Local calendar date.
    pub fn date(&self) -> NaiveDate {
        self.0.date()
    }

    /// Hour of day, 0-23.
    pub fn hour(&self) -> u32 {
        self.0.hour()
    }
}

impl fmt::Display for HourKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(HOUR_KEY_FORMAT))
    }
}

impl FromStr for HourKey {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDateTime::parse_from_str(&format!("{}:00", s.trim()), "%Y-%m-%d %H:%M").map(Self)
    }
}

/// A single reading: one value per channel quantity. Only the first is used.
pub type Reading = Vec<Option<f64>>;

/// One batch of readings from the device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleBatch {
    /// Timestamp of the first reading, seconds since the Unix epoch (UTC).
    pub ts: i64,
    /// Seconds between consecutive readings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<i64>,
    /// Readings in chronological order.
    pub values: Vec<Reading>,
}

impl SampleBatch {
    /// Create a batch of one-minute readings.
    pub fn new(ts: i64, values: Vec<Reading>) -> Self {
        Self {
            ts,
            period: None,
            values,
        }
    }

    /// Effective spacing between readings in seconds.
    pub fn period_secs(&self) -> i64 {
        self.period
            .filter(|p| *p > 0)
            .unwrap_or(DEFAULT_PERIOD_SECS)
    }

    /// Energy value of every reading, paired with its offset in the batch.
    pub fn energies(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(offset, reading)| reading_energy(reading).map(|v| (offset, v)))
    }

    /// Sum of the usable energy values in this batch.
    pub fn energy_sum(&self) -> f64 {
        self.energies().map(|(_, v)| v).sum()
    }
}

/// First channel value of a reading, if present.
pub fn reading_energy(reading: &[Option<f64>]) -> Option<f64> {
    reading.first().copied().flatten()
}

/// One response of the `EM1Data.GetData` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DevicePage {
    /// Names of the channel quantities in each reading.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<String>,
    /// Raw batches; decoded one by one so a bad entry does not poison the page.
    #[serde(default)]
    pub data: Option<Vec<serde_json::Value>>,
    /// Cursor for the next page.
    #[serde(default)]
    pub next_record_ts: Option<Cursor>,
}

impl DevicePage {
    /// Whether the page carries no batches.
    pub fn is_empty(&self) -> bool {
        self.data.as_ref().map_or(true, Vec::is_empty)
    }

    /// Decode every batch entry.
    pub fn batches(&self) -> impl Iterator<Item = serde_json::Result<SampleBatch>> + '_ {
        self.data
            .iter()
            .flatten()
            .map(|raw| SampleBatch::deserialize(raw))
    }
}
