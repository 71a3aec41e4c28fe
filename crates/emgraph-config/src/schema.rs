//! Configuration schema definitions using serde.

use emgraph_common::{ChannelId, Cursor, LoggingConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure for emgraph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Energy meter connection.
    pub device: DeviceConfig,
    /// Aggregation and night-window settings.
    pub analysis: AnalysisConfig,
    /// Chart output and styling.
    pub chart: ChartConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Energy meter connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Full URL of the `EM1Data.GetData` RPC endpoint.
    pub url: String,
    /// Channel selector sent as `id`.
    pub channel_id: ChannelId,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Cursor sent with the first request.
    pub initial_cursor: Cursor,
    /// Upper bound on requests per run.
    pub max_pages: u32,
}

/// Aggregation and night-window settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// IANA zone used for hour buckets.
    pub timezone: String,
    /// Night window covers hours `0..night_end_hour`.
    pub night_end_hour: u32,
    /// Buckets must satisfy `(now - start).num_days() < recency_days`.
    pub recency_days: i64,
}

/// Chart output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// PNG written on every run.
    pub output_path: PathBuf,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Title text; the local date is appended.
    pub title_prefix: String,
    /// X axis description.
    pub x_label: String,
    /// Y axis description.
    pub y_label: String,
    /// Open the chart in the system image viewer after writing it.
    pub display: bool,
    /// Colors and bar geometry.
    pub styling: StylingConfig,
}

/// Styling configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StylingConfig {
    /// Whether to draw grid lines.
    pub enable_grid: bool,
    /// Fraction of a slot covered by its bar, in `(0, 1]`.
    pub bar_width_ratio: f64,
    /// Color configuration.
    pub colors: ColorsConfig,
}

/// Color configuration, `#rrggbb`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorsConfig {
    /// Figure and plot background.
    pub background: String,
    /// Bar fill.
    pub bar: String,
    /// Bar outline.
    pub bar_outline: String,
    /// Grid lines.
    pub grid: String,
    /// Titles, labels and annotations.
    pub text: String,
}
