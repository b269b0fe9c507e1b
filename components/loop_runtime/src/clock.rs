//! Logical time source for timer ordering.

use std::cell::Cell;

/// A monotonic time source for the event loop.
///
/// The loop reads `now_ms` when arming a timer and advances the clock to a
/// timer's due time just before running it.
pub trait Clock {
    /// Current time in milliseconds.
    fn now_ms(&self) -> u64;

    /// Moves the clock forward to `ms`. Never moves it backwards.
    fn advance_to(&self, ms: u64);
}

/// A deterministic clock that only moves when the event loop fires a timer.
#[derive(Debug, Default)]
pub struct LogicalClock {
    now_ms: Cell<u64>,
}

impl LogicalClock {
    /// Creates a clock starting at `start_ms`.
    pub fn new(start_ms: u64) -> Self {
        Self {
            now_ms: Cell::new(start_ms),
        }
    }
}

impl Clock for LogicalClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }

    fn advance_to(&self, ms: u64) {
        if ms > self.now_ms.get() {
            self.now_ms.set(ms);
        }
    }
}
