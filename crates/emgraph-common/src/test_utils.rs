//! Test utilities and shared test helpers for emgraph.
//!
//! This module provides fixtures and helper functions that can be used across
//! all crates in the workspace for unit and integration testing.

use crate::types::{DevicePage, Reading, SampleBatch};
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize test logging once per test run.
static INIT: Once = Once::new();

/// Initialize logging for tests with a sensible default configuration.
/// This function is safe to call multiple times and will only initialize once.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        let _ = fmt()
            .with_test_writer()
            .with_env_filter(filter)
            .try_init();
    });
}

/// Test fixture for creating a mock timestamp.
///
/// # Panics
/// Panics if the components do not form a valid date.
pub fn mock_timestamp(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    min: u32,
    sec: u32,
) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
        .unwrap()
}

/// Create a temporary directory for tests that automatically cleans up.
///
/// # Panics
/// Panics if the directory cannot be created.
#[cfg(feature = "tempfile")]
pub fn create_temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Assert that two floating point numbers are approximately equal within a tolerance.
///
/// # Panics
/// Panics when the values differ by more than `tolerance`.
pub fn assert_approx_eq(left: f64, right: f64, tolerance: f64) {
    let diff = (left - right).abs();
    assert!(
        diff <= tolerance,
        "assertion failed: `{left}` is not approximately equal to `{right}` (tolerance: {tolerance}, diff: {diff})"
    );
}

/// Device response fixtures.
pub mod device_fixtures {
    use super::*;

    /// A batch of one-minute readings carrying only an energy value.
    pub fn energy_batch(start: DateTime<Utc>, values: &[f64]) -> SampleBatch {
        SampleBatch::new(
            start.timestamp(),
            values.iter().map(|v| vec![Some(*v)]).collect::<Vec<Reading>>(),
        )
    }

    /// A batch of `minutes` readings of the same value.
    pub fn constant_batch(start: DateTime<Utc>, minutes: usize, value: f64) -> SampleBatch {
        energy_batch(start, &vec![value; minutes])
    }

    /// Wrap batches into a device page.
    ///
    /// # Panics
    /// Panics if a batch fails to serialize, which cannot happen for valid batches.
    pub fn page(batches: &[SampleBatch], next_record_ts: Option<i64>) -> DevicePage {
        DevicePage {
            keys: vec!["total_act_energy".to_string()],
            data: Some(
                batches
                    .iter()
                    .map(|b| serde_json::to_value(b).unwrap())
                    .collect(),
            ),
            next_record_ts: next_record_ts.map(crate::Cursor),
        }
    }

    /// The same page as raw JSON text, as served by the device.
    ///
    /// # Panics
    /// Panics if the page fails to serialize.
    pub fn page_json(batches: &[SampleBatch], next_record_ts: Option<i64>) -> String {
        serde_json::to_string(&page(batches, next_record_ts)).unwrap()
    }
}
