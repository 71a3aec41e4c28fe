//! # emgraph Common
//!
//! Shared types, errors, logging and time utilities for emgraph.
//!
//! This crate provides the foundational types used across the other crates
//! in the workspace: the device wire model, hour keys, the clock capability
//! and the workspace-wide error type.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod clock;
pub mod error;
pub mod logging;
pub mod types;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

pub use clock::*;
pub use error::{EmGraphError, Result};
pub use logging::{init_logging, LoggingConfig};
pub use types::*;
pub use utils::*;
