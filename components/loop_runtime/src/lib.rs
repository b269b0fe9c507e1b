//! Deterministic event loop simulator.
//!
//! This crate reproduces the ordering guarantees of a JavaScript host:
//! - A call stack that runs one task body to completion at a time
//! - A microtask queue drained exhaustively whenever the stack empties
//! - A timer queue ordered by logical due time, one timer per loop turn
//! - Promises whose reactions always run as microtasks
//!
//! # Overview
//!
//! - [`EventLoop`] - The scheduler and the handle task bodies use to schedule work
//! - [`Promise`] - Single-settlement promises with chaining and adoption
//! - [`MicrotaskQueue`] / [`MacrotaskQueue`] - The two queue classes
//! - [`Console`] - Where task bodies write their output
//!
//! # Examples
//!
//! ```
//! use loop_runtime::{CaptureSink, EventLoop};
//! use core_types::Value;
//!
//! let sink = CaptureSink::new();
//! let event_loop = EventLoop::builder().with_sink(sink.clone()).build();
//!
//! event_loop
//!     .run(|el| {
//!         el.console().log(0);
//!         el.schedule_timer(0, |el| {
//!             el.console().log(1);
//!             Ok(())
//!         });
//!         el.console().log(3);
//!         Ok(())
//!     })
//!     .unwrap();
//!
//! assert_eq!(sink.values(), vec![Value::Smi(0), Value::Smi(3), Value::Smi(1)]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod call_stack;
pub mod clock;
pub mod config;
pub mod console;
pub mod error;
pub mod event_loop;
pub mod promise;
pub mod rejection;
pub mod task_queue;

// Re-export main types at crate root
pub use call_stack::CallStack;
pub use clock::{Clock, LogicalClock};
pub use config::{ConfigError, LoopConfig, RejectionPolicy};
pub use console::{CaptureSink, Console, OutputSink, StdoutSink};
pub use error::LoopError;
pub use event_loop::{EventLoop, EventLoopBuilder, RunSummary};
pub use promise::{handler, Handler, Promise, PromiseId, PromiseState, Resolution, Resolver};
pub use rejection::Diagnostic;
pub use task_queue::{MacrotaskQueue, MicrotaskQueue, Task, TaskBody, TaskKind, TimerHandle};
