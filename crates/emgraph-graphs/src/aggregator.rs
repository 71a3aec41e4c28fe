//! Hourly aggregation of raw readings.

use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use emgraph_common::{epoch_to_local, HourKey, SampleBatch};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Energy per local calendar hour, iterated chronologically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HourlyConsumption {
    buckets: BTreeMap<HourKey, f64>,
    readings: usize,
}

impl HourlyConsumption {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `value` to the bucket of `key`, creating it at zero first.
    pub fn add(&mut self, key: HourKey, value: f64) {
        *self.buckets.entry(key).or_insert(0.0) += value;
        self.readings += 1;
    }

    /// Folds one batch into the mapping.
    ///
    /// Reading `i` is stamped `ts + i * period` and lands in the local hour
    /// containing that instant. Returns the number of readings added.
    pub fn add_batch(&mut self, batch: &SampleBatch, tz: &Tz) -> usize {
        let Some(base) = epoch_to_local(batch.ts, tz) else {
            warn!(ts = batch.ts, "Batch timestamp out of range, skipping");
            return 0;
        };
        let period = batch.period_secs();

        let mut added = 0;
        for (offset, value) in batch.energies() {
            let Some(instant) = reading_instant(&base, offset, period) else {
                warn!(ts = batch.ts, offset, "Reading timestamp out of range, skipping");
                continue;
            };
            self.add(HourKey::containing(&instant), value);
            added += 1;
        }

        debug!(ts = batch.ts, readings = added, "Aggregated batch");
        added
    }

    /// Sum of every bucket.
    pub fn total(&self) -> f64 {
        self.buckets.values().sum()
    }

    /// Number of buckets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Whether no reading has been added.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Value of one bucket.
    pub fn get(&self, key: &HourKey) -> Option<f64> {
        self.buckets.get(key).copied()
    }

    /// Buckets in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = (HourKey, f64)> + '_ {
        self.buckets.iter().map(|(k, v)| (*k, *v))
    }

    /// Hour keys in chronological order.
    pub fn keys(&self) -> impl Iterator<Item = HourKey> + '_ {
        self.buckets.keys().copied()
    }

    /// Bucket values in chronological order.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.buckets.values().copied()
    }

    /// Readings folded in so far.
    pub const fn reading_count(&self) -> usize {
        self.readings
    }

    /// Earliest and latest hour, if any.
    pub fn span(&self) -> Option<(HourKey, HourKey)> {
        let first = self.buckets.keys().next()?;
        let last = self.buckets.keys().next_back()?;
        Some((*first, *last))
    }
}

impl FromIterator<(HourKey, f64)> for HourlyConsumption {
    fn from_iter<I: IntoIterator<Item = (HourKey, f64)>>(iter: I) -> Self {
        let mut consumption = Self::new();
        for (key, value) in iter {
            consumption.add(key, value);
        }
        consumption
    }
}

fn reading_instant(base: &DateTime<Tz>, offset: usize, period: i64) -> Option<DateTime<Tz>> {
    let offset = i64::try_from(offset).ok()?;
    let delta = Duration::try_seconds(offset.checked_mul(period)?)?;
    base.checked_add_signed(delta)
}
