//! # emgraph Config
//!
//! Type-safe configuration for emgraph.
//!
//! Device endpoint, output path, time zone and night window all live here.
//! They are loaded from YAML, overridden from the environment and validated
//! before use.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod defaults;
pub mod loader;
pub mod schema;
pub mod validator;

pub use defaults::*;
pub use loader::*;
pub use schema::*;
