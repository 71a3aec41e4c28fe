//! Validation of a loaded configuration.

use crate::loader::ConfigError;
use crate::schema::{ColorsConfig, Config};
use chrono_tz::Tz;
use emgraph_common::parse_timezone;
use url::Url;

impl Config {
    /// Validates the configuration, reporting the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.device.url)
            .map_err(|e| ConfigError::validation("device.url", e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::validation(
                "device.url",
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }

        if self.device.timeout_secs == 0 {
            return Err(ConfigError::validation(
                "device.timeout_secs",
                "must be greater than 0",
            ));
        }

        if self.device.max_pages == 0 {
            return Err(ConfigError::validation(
                "device.max_pages",
                "must be greater than 0",
            ));
        }

        self.timezone()?;

        if !(1..=24).contains(&self.analysis.night_end_hour) {
            return Err(ConfigError::validation(
                "analysis.night_end_hour",
                "must be between 1 and 24",
            ));
        }

        if self.analysis.recency_days <= 0 {
            return Err(ConfigError::validation(
                "analysis.recency_days",
                "must be greater than 0",
            ));
        }

        if self.chart.output_path.as_os_str().is_empty() {
            return Err(ConfigError::validation(
                "chart.output_path",
                "cannot be empty",
            ));
        }

        if self.chart.width == 0 || self.chart.height == 0 {
            return Err(ConfigError::validation(
                "chart.width/height",
                "must be greater than 0",
            ));
        }

        let ratio = self.chart.styling.bar_width_ratio;
        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(ConfigError::validation(
                "chart.styling.bar_width_ratio",
                "must be in (0, 1]",
            ));
        }

        validate_colors(&self.chart.styling.colors)
    }

    /// The configured analysis zone.
    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        parse_timezone(&self.analysis.timezone)
            .map_err(|e| ConfigError::validation("analysis.timezone", e.to_string()))
    }
}

fn validate_colors(colors: &ColorsConfig) -> Result<(), ConfigError> {
    [
        ("background", &colors.background),
        ("bar", &colors.bar),
        ("bar_outline", &colors.bar_outline),
        ("grid", &colors.grid),
        ("text", &colors.text),
    ]
    .into_iter()
    .find(|(_, value)| !is_hex_color(value))
    .map_or(Ok(()), |(name, value)| {
        Err(ConfigError::validation(
            format!("chart.styling.colors.{name}"),
            format!("'{value}' is not a #rrggbb color"),
        ))
    })
}

/// Whether `value` is a `#rrggbb` color.
pub fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .is_some_and(|hex| hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}
