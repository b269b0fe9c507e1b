//! Error types for the CLI

use loop_runtime::ConfigError;
use thiserror::Error;

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    /// The loop config could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// JSON report could not be rendered
    #[error("JSON output error: {0}")]
    Json(#[from] serde_json::Error),

    /// Nothing to run
    #[error("no scenario selected; pass a scenario name, --all or --list")]
    NoScenario,

    /// Some scenarios failed or printed an unexpected order
    #[error("{failed} scenario(s) failed")]
    Failed {
        /// Number of failing scenarios
        failed: usize,
    },
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
