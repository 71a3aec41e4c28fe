//! # emgraph Graphs
//!
//! Fetches time-series readings from the energy meter, folds them into
//! hourly buckets, derives the night-time base load and renders the
//! consumption bar chart with plotters.
//!
//! Data flows strictly forward:
//! [`DataFetcher`] → [`HourlyConsumption`] → {[`NightWindow`], [`ConsumptionChart`]}.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod aggregator;
pub mod chart;
pub mod data_fetcher;
pub mod night_window;
pub mod pipeline;
pub mod renderer;
pub mod traits;
pub mod utils;
pub mod viewer;

pub use aggregator::*;
pub use chart::*;
pub use data_fetcher::*;
pub use night_window::*;
pub use pipeline::*;
pub use renderer::*;
pub use traits::*;
pub use utils::*;
pub use viewer::*;
