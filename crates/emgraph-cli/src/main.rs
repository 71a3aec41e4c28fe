//! Main entry point for emgraph.

use anyhow::Context;
use clap::Parser;
use emgraph_cli::{App, Args};
use emgraph_common::{format_wh, init_logging};
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let app = App::from_args(&args).context("Failed to load configuration")?;
    init_logging(&app.config().logging).context("Failed to initialize logging")?;

    info!("Starting emgraph {}", env!("CARGO_PKG_VERSION"));
    match app.config_path() {
        Some(path) => info!(path = %path.display(), "Loaded configuration file"),
        None => info!("No configuration file found, using defaults"),
    }

    let summary = app
        .run()
        .await
        .context("Failed to produce the consumption chart")?;

    println!("Chart written to {}", summary.output_path.display());
    println!("Total consumption: {}", format_wh(summary.total_wh));
    println!("Night consumption average: {}", format_wh(summary.night_average_wh));
    Ok(())
}
