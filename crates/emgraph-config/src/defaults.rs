//! Default configuration values for a single EM PRO meter on the LAN.

use crate::schema::*;
use emgraph_common::{ChannelId, Cursor, LoggingConfig};
use std::path::PathBuf;

/// Endpoint of the Shelly EM PRO 50A on the local network.
pub const DEFAULT_DEVICE_URL: &str = "http://192.168.128.104/rpc/EM1Data.GetData";
/// Per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Request budget per run.
pub const DEFAULT_MAX_PAGES: u32 = 1000;
/// Zone used for hour buckets.
pub const DEFAULT_TIMEZONE: &str = "Europe/Paris";
/// Night window end (exclusive).
pub const DEFAULT_NIGHT_END_HOUR: u32 = 6;
/// Recency bound for night buckets, whole days.
pub const DEFAULT_RECENCY_DAYS: i64 = 2;
/// Output file.
pub const DEFAULT_OUTPUT_PATH: &str = "consumption_chart.png";

impl Default for Config {
    fn default() -> Self {
        Self {
            device: DeviceConfig::default(),
            analysis: AnalysisConfig::default(),
            chart: ChartConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DEVICE_URL.to_string(),
            channel_id: ChannelId(0),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            initial_cursor: Cursor(0),
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE.to_string(),
            night_end_hour: DEFAULT_NIGHT_END_HOUR,
            recency_days: DEFAULT_RECENCY_DAYS,
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            width: 1500,
            height: 500,
            title_prefix: "Consommation EM PRO50".to_string(),
            x_label: "Heure".to_string(),
            y_label: "Consommation (Wh)".to_string(),
            display: true,
            styling: StylingConfig::default(),
        }
    }
}

impl Default for StylingConfig {
    fn default() -> Self {
        Self {
            enable_grid: true,
            bar_width_ratio: 0.5,
            colors: ColorsConfig::default(),
        }
    }
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            background: "#000000".to_string(),
            bar: "#90ee90".to_string(),
            bar_outline: "#008000".to_string(),
            grid: "#808080".to_string(),
            text: "#ffffff".to_string(),
        }
    }
}
