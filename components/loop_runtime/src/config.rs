//! Event loop configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// What to do when a rejection is still unhandled after a microtask checkpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionPolicy {
    /// Record a diagnostic and keep running.
    #[default]
    Report,
    /// Record a diagnostic and stop the run with an error.
    Fatal,
}

/// Settings for an [`EventLoop`](crate::EventLoop).
///
/// # Examples
///
/// ```
/// use loop_runtime::{LoopConfig, RejectionPolicy};
///
/// let config = LoopConfig::from_json_str(r#"{ "unhandled_rejections": "fatal" }"#).unwrap();
/// assert_eq!(config.unhandled_rejections, RejectionPolicy::Fatal);
/// assert_eq!(config.start_time_ms, 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoopConfig {
    /// Initial reading of the logical clock.
    pub start_time_ms: u64,
    /// Unhandled rejection policy.
    pub unhandled_rejections: RejectionPolicy,
    /// Upper bound on macrotasks per run. Unbounded when unset.
    pub max_macrotasks: Option<usize>,
}

/// Errors raised while loading a [`LoopConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        /// Path that was read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
    /// The config is not valid JSON for [`LoopConfig`].
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

impl LoopConfig {
    /// Parses a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }
}
