//! Application orchestration: configuration, then one report run.

use crate::{cli::Args, error::AppResult};
use emgraph_common::{Clock, SystemClock};
use emgraph_config::{Config, ConfigLoader};
use emgraph_graphs::{
    BarChartRenderer, ChartViewer, ConsumptionReport, ConsumptionSummary, GraphRenderer,
    SystemViewer,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A configured emgraph run.
#[derive(Debug, Clone)]
pub struct App {
    config: Config,
    config_path: Option<PathBuf>,
}

impl App {
    /// Creates an app after validating `config`.
    pub fn new(config: Config) -> AppResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            config_path: None,
        })
    }

    /// Loads the configuration and lays the command line flags over it.
    pub fn from_args(args: &Args) -> AppResult<Self> {
        let config_path = ConfigLoader::resolve_path(args.config.as_deref());
        let mut config = ConfigLoader::load(config_path.as_deref())?;
        args.apply(&mut config);
        Ok(Self {
            config_path,
            ..Self::new(config)?
        })
    }

    /// The effective configuration.
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// File the configuration was read from, `None` for built-in defaults.
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Runs the report with the plotters renderer, the system viewer and the wall clock.
    pub async fn run(&self) -> AppResult<ConsumptionSummary> {
        let renderer = BarChartRenderer::from_config(&self.config.chart);
        self.run_with(&SystemClock, &renderer, &SystemViewer::new())
            .await
    }

    /// Runs the report with the given collaborators.
    pub async fn run_with<R, V>(
        &self,
        clock: &dyn Clock,
        renderer: &R,
        viewer: &V,
    ) -> AppResult<ConsumptionSummary>
    where
        R: GraphRenderer + ?Sized,
        V: ChartViewer + ?Sized,
    {
        self.prepare_output_dir()?;

        info!(
            device = %self.config.device.url,
            channel = %self.config.device.channel_id,
            timezone = %self.config.analysis.timezone,
            "Generating consumption chart"
        );

        let report = ConsumptionReport::from_config(&self.config)?;
        let summary = report.run(clock, renderer, viewer).await?;
        Ok(summary)
    }

    fn prepare_output_dir(&self) -> AppResult<()> {
        match self.config.chart.output_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
                debug!(dir = %parent.display(), "Creating output directory");
                fs::create_dir_all(parent)?;
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use emgraph_config::ConfigError;
    use std::path::PathBuf;

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = Config::default();
        config.device.url = "ftp://meter".to_string();

        let err = App::new(config).unwrap_err();
        assert!(matches!(err, AppError::Config(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_from_args_with_file_and_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("emgraph.yaml");
        std::fs::write(
            &path,
            "device:\n  url: http://10.1.1.1/rpc/EM1Data.GetData\nanalysis:\n  timezone: UTC\n",
        )
        .unwrap();

        let args = Args {
            config: Some(path.clone()),
            output: Some(PathBuf::from("today.png")),
            no_display: true,
            ..Args::default()
        };
        let app = App::from_args(&args).unwrap();

        assert_eq!(app.config_path(), Some(path.as_path()));
        assert_eq!(app.config().device.url, "http://10.1.1.1/rpc/EM1Data.GetData");
        assert_eq!(app.config().analysis.timezone, "UTC");
        assert_eq!(app.config().chart.output_path, PathBuf::from("today.png"));
        assert!(!app.config().chart.display);
    }

    #[test]
    fn test_missing_config_file() {
        let args = Args {
            config: Some(PathBuf::from("/nonexistent/emgraph.yaml")),
            ..Args::default()
        };
        assert!(matches!(
            App::from_args(&args),
            Err(AppError::Config(ConfigError::Io { .. }))
        ));
    }

    #[test]
    fn test_output_directory_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.chart.output_path = dir.path().join("charts").join("today.png");

        let app = App::new(config).unwrap();
        assert!(app.config_path().is_none());
        app.prepare_output_dir().unwrap();
        assert!(dir.path().join("charts").is_dir());
    }
}
