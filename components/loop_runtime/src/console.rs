//! Console output sink.
//!
//! Task bodies log through [`Console`]; the event loop itself never writes
//! to it. Output order is the primary observable of a run, so tests inject a
//! [`CaptureSink`] and compare the recorded values.

use core_types::Value;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Destination for console output.
pub trait OutputSink {
    /// Write one logged value.
    fn write(&self, value: &Value);
}

/// Sink that prints each value on its own line to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn write(&self, value: &Value) {
        println!("{}", value);
    }
}

/// Sink that records every value in memory.
///
/// Clones share the same buffer, so a test can keep one clone and hand the
/// other to the event loop.
#[derive(Debug, Default, Clone)]
pub struct CaptureSink {
    output: Rc<RefCell<Vec<Value>>>,
}

impl CaptureSink {
    /// Creates an empty capture buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far.
    pub fn values(&self) -> Vec<Value> {
        self.output.borrow().clone()
    }

    /// Everything written so far, formatted the way the console prints it.
    pub fn lines(&self) -> Vec<String> {
        self.output.borrow().iter().map(ToString::to_string).collect()
    }
}

impl OutputSink for CaptureSink {
    fn write(&self, value: &Value) {
        self.output.borrow_mut().push(value.clone());
    }
}

/// `console` as seen by task bodies.
#[derive(Clone)]
pub struct Console {
    sink: Rc<dyn OutputSink>,
}

impl Console {
    /// Wraps a sink.
    pub fn new(sink: Rc<dyn OutputSink>) -> Self {
        Self { sink }
    }

    /// `console.log(value)`
    pub fn log(&self, value: impl Into<Value>) {
        self.sink.write(&value.into());
    }

    /// `console.log(a, b, ...)`: arguments are joined with spaces into one line.
    ///
    /// A single argument is written as-is.
    pub fn log_all(&self, values: &[Value]) {
        match values {
            [single] => self.sink.write(single),
            _ => {
                let line = values
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" ");
                self.sink.write(&Value::String(line));
            }
        }
    }

    /// `console.error(value)`. Shares the log sink.
    pub fn error(&self, value: impl Into<Value>) {
        self.log(value);
    }

    /// `console.error(a, b, ...)`
    pub fn error_all(&self, values: &[Value]) {
        self.log_all(values);
    }
}

impl fmt::Debug for Console {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Console {{ ... }}")
    }
}
