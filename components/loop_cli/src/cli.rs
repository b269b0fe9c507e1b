//! Command line definition

use crate::error::CliResult;
use crate::scenarios::Scenario;
use clap::{ArgAction, Parser};
use loop_runtime::{LoopConfig, RejectionPolicy};
use std::path::PathBuf;

/// Deterministic event loop simulator
#[derive(Parser, Debug)]
#[command(name = "loopsim", version, about = "Replay event loop scenarios deterministically")]
pub struct Cli {
    /// Scenarios to run
    #[arg(value_enum)]
    pub scenarios: Vec<Scenario>,

    /// Run every bundled scenario
    #[arg(short, long)]
    pub all: bool,

    /// List bundled scenarios and exit
    #[arg(short, long)]
    pub list: bool,

    /// Print reports as JSON
    #[arg(long)]
    pub json: bool,

    /// JSON file with loop settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Stop a run on the first unhandled rejection
    #[arg(long)]
    pub fatal_rejections: bool,

    /// Abort a run after this many timer callbacks
    #[arg(long)]
    pub max_macrotasks: Option<usize>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Scenarios to run, in the order given
    pub fn selected(&self) -> Vec<Scenario> {
        if self.all {
            Scenario::ALL.to_vec()
        } else {
            self.scenarios.clone()
        }
    }

    /// Loop settings: the config file if any, then flag overrides
    pub fn loop_config(&self) -> CliResult<LoopConfig> {
        let mut config = match &self.config {
            Some(path) => LoopConfig::from_file(path)?,
            None => LoopConfig::default(),
        };
        if self.fatal_rejections {
            config.unhandled_rejections = RejectionPolicy::Fatal;
        }
        if let Some(limit) = self.max_macrotasks {
            config.max_macrotasks = Some(limit);
        }
        Ok(config)
    }

    /// Default tracing filter for the chosen verbosity
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
