//! Fetch → aggregate → analyze → render, once per run.

use crate::{
    aggregator::HourlyConsumption,
    chart::ConsumptionChart,
    data_fetcher::{DataFetcher, DeviceClient, FetchOutcome, StopReason},
    night_window::NightWindow,
    traits::{ChartViewer, GraphRenderer, RecordSource},
};
use chrono_tz::Tz;
use emgraph_common::{Clock, HourKey, Result};
use emgraph_config::{ChartConfig, Config};
use std::path::PathBuf;
use tracing::{info, instrument};

/// What one run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsumptionSummary {
    /// Sum of every hourly bucket, Wh.
    pub total_wh: f64,
    /// Mean of the qualifying night buckets, Wh.
    pub night_average_wh: f64,
    /// Number of hourly buckets.
    pub buckets: usize,
    /// Readings aggregated.
    pub readings: usize,
    /// Pages received from the device.
    pub pages: u32,
    /// Why pagination ended.
    pub stop_reason: StopReason,
    /// Where the chart was written.
    pub output_path: PathBuf,
    /// Earliest hour seen.
    pub first_hour: Option<HourKey>,
    /// Latest hour seen.
    pub last_hour: Option<HourKey>,
}

/// The whole consumption report for one device.
#[derive(Debug, Clone)]
pub struct ConsumptionReport<S> {
    fetcher: DataFetcher<S>,
    tz: Tz,
    window: NightWindow,
    chart: ChartConfig,
}

impl ConsumptionReport<DeviceClient> {
    /// Wires the HTTP client and every setting from `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let tz = config.timezone()?;
        let client = DeviceClient::from_config(&config.device)?;
        let fetcher = DataFetcher::new(
            client,
            config.device.initial_cursor,
            config.device.max_pages,
        );
        Ok(Self::new(
            fetcher,
            tz,
            NightWindow::from_config(&config.analysis),
            config.chart.clone(),
        ))
    }
}

impl<S: RecordSource> ConsumptionReport<S> {
    /// Assembles a report from its parts.
    pub const fn new(fetcher: DataFetcher<S>, tz: Tz, window: NightWindow, chart: ChartConfig) -> Self {
        Self {
            fetcher,
            tz,
            window,
            chart,
        }
    }

    /// Zone used for hour buckets.
    pub const fn timezone(&self) -> Tz {
        self.tz
    }

    /// Fetches every page and folds it into hourly buckets.
    pub async fn collect(&self) -> (HourlyConsumption, FetchOutcome) {
        let mut hourly = HourlyConsumption::new();
        let outcome = self
            .fetcher
            .fetch_all(|batch| {
                hourly.add_batch(&batch, &self.tz);
            })
            .await;
        (hourly, outcome)
    }

    /// Runs the report: fetch, aggregate, compute the night average against
    /// `clock`, render the chart and optionally show it.
    ///
    /// Network trouble only shortens the data; rendering and display
    /// failures are returned.
    #[instrument(skip_all, fields(renderer = renderer.name(), output = %self.chart.output_path.display()))]
    pub async fn run<R, V>(
        &self,
        clock: &dyn Clock,
        renderer: &R,
        viewer: &V,
    ) -> Result<ConsumptionSummary>
    where
        R: GraphRenderer + ?Sized,
        V: ChartViewer + ?Sized,
    {
        let (hourly, outcome) = self.collect().await;

        let now = clock.now().with_timezone(&self.tz);
        let night_average = self.window.average(&hourly, &now);
        let chart = ConsumptionChart::build(&hourly, night_average, &now, &self.chart);

        renderer
            .render_to_file(&chart, &self.chart.output_path)
            .await?;

        if self.chart.display {
            viewer.show(&self.chart.output_path)?;
        }

        let span = hourly.span();
        let summary = ConsumptionSummary {
            total_wh: chart.total,
            night_average_wh: night_average,
            buckets: hourly.len(),
            readings: hourly.reading_count(),
            pages: outcome.pages,
            stop_reason: outcome.stop_reason,
            output_path: self.chart.output_path.clone(),
            first_hour: span.map(|(first, _)| first),
            last_hour: span.map(|(_, last)| last),
        };

        info!(
            total_wh = summary.total_wh,
            night_average_wh = summary.night_average_wh,
            buckets = summary.buckets,
            readings = summary.readings,
            pages = summary.pages,
            stop_reason = %summary.stop_reason,
            "Consumption report complete"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MockRecordSource;
    use crate::viewer::NoopViewer;
    use async_trait::async_trait;
    use emgraph_common::test_utils::{assert_approx_eq, device_fixtures, mock_timestamp};
    use emgraph_common::{Cursor, EmGraphError, FixedClock};
    use std::path::Path;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingRenderer {
        charts: Mutex<Vec<(ConsumptionChart, PathBuf)>>,
    }

    #[async_trait]
    impl GraphRenderer for RecordingRenderer {
        async fn render_to_file(&self, chart: &ConsumptionChart, path: &Path) -> Result<()> {
            self.charts
                .lock()
                .unwrap()
                .push((chart.clone(), path.to_path_buf()));
            Ok(())
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }

    struct FailingRenderer;

    #[async_trait]
    impl GraphRenderer for FailingRenderer {
        async fn render_to_file(&self, _chart: &ConsumptionChart, _path: &Path) -> Result<()> {
            Err(EmGraphError::graph("disk full"))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    #[derive(Default)]
    struct RecordingViewer {
        shown: Mutex<Vec<PathBuf>>,
    }

    impl ChartViewer for RecordingViewer {
        fn show(&self, path: &Path) -> Result<()> {
            self.shown.lock().unwrap().push(path.to_path_buf());
            Ok(())
        }
    }

    fn report(source: MockRecordSource, display: bool) -> ConsumptionReport<MockRecordSource> {
        let chart = ChartConfig {
            output_path: PathBuf::from("out.png"),
            display,
            ..ChartConfig::default()
        };
        ConsumptionReport::new(
            DataFetcher::new(source, Cursor(0), 100),
            chrono_tz::Europe::Paris,
            NightWindow::default(),
            chart,
        )
    }

    fn two_page_source() -> MockRecordSource {
        let mut source = MockRecordSource::new();
        source.expect_fetch_page().returning(|cursor| {
            let page = if cursor == Cursor(0) {
                // 01:00-01:02 local, night.
                device_fixtures::page(
                    &[device_fixtures::constant_batch(
                        mock_timestamp(2024, 1, 2, 0, 0, 0),
                        3,
                        10.0,
                    )],
                    Some(100),
                )
            } else {
                // 09:00 local, day.
                device_fixtures::page(
                    &[device_fixtures::constant_batch(
                        mock_timestamp(2024, 1, 2, 8, 0, 0),
                        2,
                        50.0,
                    )],
                    Some(100),
                )
            };
            Ok(page)
        });
        source
    }

    #[tokio::test]
    async fn test_run_renders_and_summarizes() {
        let report = report(two_page_source(), true);
        let renderer = RecordingRenderer::default();
        let viewer = RecordingViewer::default();
        let clock = FixedClock(mock_timestamp(2024, 1, 2, 11, 0, 0));

        let summary = report.run(&clock, &renderer, &viewer).await.unwrap();

        assert_approx_eq(summary.total_wh, 130.0, 1e-9);
        assert_approx_eq(summary.night_average_wh, 30.0, 1e-9);
        assert_eq!(summary.buckets, 2);
        assert_eq!(summary.readings, 5);
        assert_eq!(summary.pages, 2);
        assert_eq!(summary.stop_reason, StopReason::CursorExhausted);
        assert_eq!(summary.first_hour, Some("2024-01-02 01".parse().unwrap()));
        assert_eq!(summary.last_hour, Some("2024-01-02 09".parse().unwrap()));

        let charts = renderer.charts.lock().unwrap();
        assert_eq!(charts.len(), 1);
        assert_eq!(charts[0].1, PathBuf::from("out.png"));
        assert_eq!(charts[0].0.labels(), vec!["2024-01-02 01", "2024-01-02 09"]);
        assert_eq!(charts[0].0.title, "Consommation EM PRO50 2024-01-02");
        assert_eq!(*viewer.shown.lock().unwrap(), vec![PathBuf::from("out.png")]);
    }

    #[tokio::test]
    async fn test_display_disabled_skips_viewer() {
        let report = report(two_page_source(), false);
        let viewer = RecordingViewer::default();
        let clock = FixedClock(mock_timestamp(2024, 1, 2, 11, 0, 0));

        report
            .run(&clock, &RecordingRenderer::default(), &viewer)
            .await
            .unwrap();

        assert!(viewer.shown.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_network_failure_still_renders() {
        let mut source = MockRecordSource::new();
        source
            .expect_fetch_page()
            .returning(|_| Err(EmGraphError::network("Connection failed")));
        let renderer = RecordingRenderer::default();
        let clock = FixedClock(mock_timestamp(2024, 1, 2, 11, 0, 0));

        let summary = report(source, false)
            .run(&clock, &renderer, &NoopViewer)
            .await
            .unwrap();

        assert_eq!(summary.stop_reason, StopReason::RequestFailed);
        assert_eq!(summary.buckets, 0);
        assert!(summary.total_wh.abs() < f64::EPSILON);
        assert!(summary.night_average_wh.abs() < f64::EPSILON);
        assert!(renderer.charts.lock().unwrap()[0].0.is_empty());
    }

    #[tokio::test]
    async fn test_render_failure_propagates() {
        let clock = FixedClock(mock_timestamp(2024, 1, 2, 11, 0, 0));
        let err = report(two_page_source(), true)
            .run(&clock, &FailingRenderer, &NoopViewer)
            .await
            .unwrap_err();
        assert!(matches!(err, EmGraphError::Graph { .. }));
    }

    #[test]
    fn test_from_config() {
        let report = ConsumptionReport::from_config(&Config::default()).unwrap();
        assert_eq!(report.timezone(), chrono_tz::Europe::Paris);
        assert_eq!(
            report.fetcher.source().url(),
            "http://192.168.128.104/rpc/EM1Data.GetData"
        );
    }
}
