//! Command line arguments using clap.

use clap::Parser;
use emgraph_config::Config;
use std::path::PathBuf;

/// Command line arguments.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "emgraph")]
#[command(author, version, about = "Hourly consumption chart for an EM PRO energy meter")]
#[command(
    long_about = "Reads the recorded energy data of an EM PRO meter, sums it per local hour \
    and writes a bar chart annotated with the night-time average and the total.\n\
    \nConfiguration is read from --config, EMGRAPH_CONFIG_PATH or emgraph.yaml in the \
    working directory, in that order. EMGRAPH_* variables override file values and \
    command line flags override both.\n\
    \nExamples:\n  \
    emgraph\n  \
    emgraph --url http://10.0.0.5/rpc/EM1Data.GetData --no-display\n  \
    emgraph --config meter.yaml --output /tmp/today.png"
)]
pub struct Args {
    /// YAML configuration file
    #[arg(short, long, value_name = "PATH", env = "EMGRAPH_CONFIG_PATH")]
    pub config: Option<PathBuf>,

    /// Where to write the PNG chart
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Device RPC endpoint, e.g. http://192.168.1.20/rpc/EM1Data.GetData
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Write the chart without opening it
    #[arg(long)]
    pub no_display: bool,

    /// Log filter, e.g. `info` or `emgraph_graphs=debug`
    #[arg(long, value_name = "FILTER")]
    pub log_level: Option<String>,
}

impl Args {
    /// Lays the flags over a loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(output) = &self.output {
            config.chart.output_path.clone_from(output);
        }
        if let Some(url) = &self.url {
            config.device.url.clone_from(url);
        }
        if self.no_display {
            config.chart.display = false;
        }
        if let Some(level) = &self.log_level {
            config.logging.level.clone_from(level);
        }
    }
}
