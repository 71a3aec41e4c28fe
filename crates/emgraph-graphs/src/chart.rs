//! Chart model: everything the renderer draws, computed without fonts.

use crate::{aggregator::HourlyConsumption, utils::GraphUtils};
use chrono::DateTime;
use chrono_tz::Tz;
use emgraph_common::{format_local_date, format_wh};
use emgraph_config::ChartConfig;
use std::ops::Range;

/// One bar of the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    /// X-axis label, `YYYY-MM-DD HH`.
    pub label: String,
    /// Energy in Wh.
    pub value: f64,
}

/// The consumption bar chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsumptionChart {
    /// Title, ending with the local date.
    pub title: String,
    /// X axis description.
    pub x_label: String,
    /// Y axis description.
    pub y_label: String,
    /// Bars in chronological order.
    pub bars: Vec<Bar>,
    /// Night-time average in Wh.
    pub night_average: f64,
    /// Total consumption in Wh.
    pub total: f64,
}

impl ConsumptionChart {
    /// Builds the chart for `hourly`, titled with the date of `today`.
    pub fn build(
        hourly: &HourlyConsumption,
        night_average: f64,
        today: &DateTime<Tz>,
        config: &ChartConfig,
    ) -> Self {
        let bars = hourly
            .iter()
            .map(|(key, value)| Bar {
                label: key.to_string(),
                value,
            })
            .collect();

        Self {
            title: format!("{} {}", config.title_prefix, format_local_date(today)),
            x_label: config.x_label.clone(),
            y_label: config.y_label.clone(),
            bars,
            night_average,
            total: hourly.total(),
        }
    }

    /// Top-left annotation.
    pub fn night_annotation(&self) -> String {
        format!("Night Consumption Avg: {}", format_wh(self.night_average))
    }

    /// Top-right annotation.
    pub fn total_annotation(&self) -> String {
        format!("Total Consumption: {}", format_wh(self.total))
    }

    /// Y-axis extent covering every bar.
    pub fn y_range(&self) -> Range<f64> {
        GraphUtils::value_range(&self.values())
    }

    /// Bar labels in order.
    pub fn labels(&self) -> Vec<&str> {
        self.bars.iter().map(|bar| bar.label.as_str()).collect()
    }

    /// Bar values in order.
    pub fn values(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.value).collect()
    }

    /// Whether there is nothing to plot.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emgraph_common::test_utils::mock_timestamp;

    fn sample() -> HourlyConsumption {
        [
            ("2024-01-02 01".parse().unwrap(), 12.346),
            ("2024-01-01 23".parse().unwrap(), 100.0),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_build_orders_bars_and_titles() {
        let today = mock_timestamp(2024, 1, 2, 9, 0, 0).with_timezone(&chrono_tz::Europe::Paris);
        let chart = ConsumptionChart::build(&sample(), 12.346, &today, &ChartConfig::default());

        assert_eq!(chart.title, "Consommation EM PRO50 2024-01-02");
        assert_eq!(chart.labels(), vec!["2024-01-01 23", "2024-01-02 01"]);
        assert_eq!(chart.x_label, "Heure");
        assert_eq!(chart.y_label, "Consommation (Wh)");
        assert!((chart.total - 112.346).abs() < 1e-9);
    }

    #[test]
    fn test_annotations() {
        let today = mock_timestamp(2024, 1, 2, 9, 0, 0).with_timezone(&chrono_tz::UTC);
        let chart = ConsumptionChart::build(&sample(), 12.346, &today, &ChartConfig::default());

        assert_eq!(chart.night_annotation(), "Night Consumption Avg: 12.35 Wh");
        assert_eq!(chart.total_annotation(), "Total Consumption: 112.35 Wh");
    }

    #[test]
    fn test_title_uses_local_date() {
        // 23:30 UTC on Jan 1 is already Jan 2 in Paris.
        let today = mock_timestamp(2024, 1, 1, 23, 30, 0).with_timezone(&chrono_tz::Europe::Paris);
        let config = ChartConfig {
            title_prefix: "Meter".to_string(),
            ..ChartConfig::default()
        };
        let chart = ConsumptionChart::build(&HourlyConsumption::new(), 0.0, &today, &config);

        assert_eq!(chart.title, "Meter 2024-01-02");
        assert!(chart.is_empty());
        assert_eq!(chart.y_range(), 0.0..1.0);
        assert_eq!(chart.night_annotation(), "Night Consumption Avg: 0.00 Wh");
    }

    #[test]
    fn test_y_range_covers_tallest_bar() {
        let today = mock_timestamp(2024, 1, 2, 9, 0, 0).with_timezone(&chrono_tz::UTC);
        let chart = ConsumptionChart::build(&sample(), 0.0, &today, &ChartConfig::default());
        let range = chart.y_range();
        assert!(range.start <= 0.0);
        assert!(range.end >= 100.0);
    }
}
