//! Event Loop Simulator CLI Library
//!
//! Provides the bundled scenarios, the runner that executes them on a
//! capturing event loop, and the command line definition for `loopsim`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod error;
pub mod runner;
pub mod scenarios;

pub use cli::Cli;
pub use error::{CliError, CliResult};
pub use runner::{Runner, ScenarioReport};
pub use scenarios::Scenario;
