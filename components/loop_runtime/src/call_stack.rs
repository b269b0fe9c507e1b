//! Synchronous execution tracking.

use crate::task_queue::Task;
use crate::EventLoop;
use core_types::Value;
use std::cell::Cell;

/// Tracks whether a task body is currently executing.
///
/// The event loop only pulls from its queues while the stack is empty.
#[derive(Debug, Default)]
pub struct CallStack {
    depth: Cell<usize>,
}

impl CallStack {
    /// Creates an empty call stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no task body is running.
    pub fn is_empty(&self) -> bool {
        self.depth.get() == 0
    }

    /// Number of task bodies currently on the stack.
    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    /// Runs `task` to completion.
    ///
    /// Errors thrown by the body are returned, not handled. The stack is
    /// popped again before this returns, whatever the outcome.
    pub fn run(&self, task: Task, event_loop: &EventLoop) -> Result<(), Value> {
        let _frame = Frame::push(self);
        tracing::trace!(seq = task.seq(), kind = %task.kind(), "running task");
        task.run(event_loop)
    }
}

struct Frame<'a> {
    stack: &'a CallStack,
}

impl<'a> Frame<'a> {
    fn push(stack: &'a CallStack) -> Self {
        stack.depth.set(stack.depth.get() + 1);
        Self { stack }
    }
}

impl Drop for Frame<'_> {
    fn drop(&mut self) {
        self.stack.depth.set(self.stack.depth.get() - 1);
    }
}
