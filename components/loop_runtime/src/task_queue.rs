//! Task and microtask queue management.
//!
//! This module provides the queues the event loop pulls from once the call
//! stack is empty. Microtasks are plain FIFO; macrotasks (timers) are ordered
//! by due time, then by enqueue order, and can be cancelled by handle.

use crate::EventLoop;
use core_types::Value;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;

/// Body of a task. `Err` carries a thrown value.
pub type TaskBody = Box<dyn FnOnce(&EventLoop) -> Result<(), Value>>;

/// Which queue a task came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// The top-level script handed to [`EventLoop::run`]
    Script,
    /// Promise reaction or explicitly queued microtask
    Microtask,
    /// Timer callback
    Macrotask,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskKind::Script => "script",
            TaskKind::Microtask => "microtask",
            TaskKind::Macrotask => "macrotask",
        };
        f.write_str(name)
    }
}

/// A unit of work executed to completion on the call stack.
pub struct Task {
    seq: u64,
    kind: TaskKind,
    due_ms: Option<u64>,
    body: TaskBody,
}

impl Task {
    /// Creates a new Task from a closure.
    ///
    /// # Arguments
    ///
    /// * `kind` - The queue the task belongs to
    /// * `seq` - Enqueue order, unique per event loop
    /// * `f` - The function to execute when the task runs
    pub fn new<F>(kind: TaskKind, seq: u64, f: F) -> Self
    where
        F: FnOnce(&EventLoop) -> Result<(), Value> + 'static,
    {
        Self {
            seq,
            kind,
            due_ms: None,
            body: Box::new(f),
        }
    }

    /// Enqueue order of this task.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// The queue this task belongs to.
    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    /// Logical due time, set for timer tasks once they are queued.
    pub fn due_ms(&self) -> Option<u64> {
        self.due_ms
    }

    /// Executes the task.
    ///
    /// # Returns
    ///
    /// `Err` with the thrown value if the body threw.
    pub fn run(self, event_loop: &EventLoop) -> Result<(), Value> {
        (self.body)(event_loop)
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("seq", &self.seq)
            .field("kind", &self.kind)
            .field("due_ms", &self.due_ms)
            .finish_non_exhaustive()
    }
}

/// Identity of a scheduled timer, used for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TimerHandle(u64);

impl TimerHandle {
    /// Raw timer id (the seq of the timer task).
    pub fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// A queue for microtasks.
///
/// Plain FIFO. The event loop drains it until it is observed empty, so
/// microtasks queued while draining run in the same checkpoint.
#[derive(Debug, Default)]
pub struct MicrotaskQueue {
    queue: VecDeque<Task>,
}

impl MicrotaskQueue {
    /// Creates a new empty MicrotaskQueue.
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    /// Adds a microtask to the end of the queue.
    pub fn enqueue(&mut self, task: Task) {
        self.queue.push_back(task);
    }

    /// Removes and returns the next microtask from the queue.
    pub fn dequeue(&mut self) -> Option<Task> {
        self.queue.pop_front()
    }

    /// Returns true if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Returns the number of microtasks in the queue.
    pub fn len(&self) -> usize {
        self.queue.len()
    }
}

/// A queue for timer tasks.
///
/// Ordered by `(due_ms, seq)`: earlier deadlines first, equal deadlines in
/// registration order.
#[derive(Debug, Default)]
pub struct MacrotaskQueue {
    entries: BTreeMap<(u64, u64), Task>,
    due_by_handle: HashMap<TimerHandle, u64>,
}

impl MacrotaskQueue {
    /// Creates a new empty MacrotaskQueue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `task` to become runnable at `now_ms + delay_ms`.
    pub fn enqueue_after(&mut self, now_ms: u64, delay_ms: u64, mut task: Task) -> TimerHandle {
        let due_ms = now_ms.saturating_add(delay_ms);
        let handle = TimerHandle(task.seq);
        task.due_ms = Some(due_ms);
        self.due_by_handle.insert(handle, due_ms);
        self.entries.insert((due_ms, task.seq), task);
        handle
    }

    /// Removes and returns the earliest task.
    pub fn pop_next(&mut self) -> Option<(TimerHandle, Task)> {
        let ((_, seq), task) = self.entries.pop_first()?;
        let handle = TimerHandle(seq);
        self.due_by_handle.remove(&handle);
        Some((handle, task))
    }

    /// Removes a queued task by handle.
    ///
    /// Returns false if the timer already fired or was never queued here.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.due_by_handle.remove(&handle) {
            Some(due_ms) => self.entries.remove(&(due_ms, handle.0)).is_some(),
            None => false,
        }
    }

    /// Due time of the earliest task, if any.
    pub fn next_due_ms(&self) -> Option<u64> {
        self.entries.keys().next().map(|(due_ms, _)| *due_ms)
    }

    /// Returns true if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of queued timers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
