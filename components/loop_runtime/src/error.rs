//! Errors that end an event loop run.

use crate::promise::PromiseId;
use crate::task_queue::TaskKind;
use core_types::Value;
use thiserror::Error;

/// Why [`EventLoop::run`](crate::EventLoop::run) stopped early.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoopError {
    /// The script or a timer callback threw.
    #[error("uncaught exception in {kind}: {reason}")]
    Uncaught {
        /// Which task threw
        kind: TaskKind,
        /// The thrown value
        reason: Value,
    },
    /// A rejection went unhandled under the fatal policy.
    #[error("unhandled promise rejection in {promise}: {reason}")]
    UnhandledRejection {
        /// The rejected promise
        promise: PromiseId,
        /// Its rejection reason
        reason: Value,
    },
    /// More macrotasks ran than `max_macrotasks` allows.
    #[error("macrotask limit of {limit} exceeded")]
    TaskLimit {
        /// Configured limit
        limit: usize,
    },
    /// `run` was called from inside a task body.
    #[error("event loop is already running")]
    Reentrant,
}
