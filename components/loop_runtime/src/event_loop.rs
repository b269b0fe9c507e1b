//! Event loop implementation.
//!
//! This module provides the scheduler that coordinates the call stack, the
//! microtask queue and the timer queue following the JavaScript event loop
//! model. Each turn of the loop:
//! 1. Runs one task to completion on the call stack
//! 2. Drains the microtask queue until it is observed empty
//! 3. Reports rejections that are still unhandled
//! 4. Pops the next timer, advancing the logical clock to its due time
//!
//! The first task is the script handed to [`EventLoop::run`]; the run ends
//! when both queues are empty.

use crate::call_stack::CallStack;
use crate::clock::{Clock, LogicalClock};
use crate::config::{LoopConfig, RejectionPolicy};
use crate::console::{Console, OutputSink, StdoutSink};
use crate::error::LoopError;
use crate::promise::{Promise, PromiseId, Resolver};
use crate::rejection::{Diagnostic, RejectionTracker};
use crate::task_queue::{MacrotaskQueue, MicrotaskQueue, Task, TaskKind, TimerHandle};
use core_types::Value;
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

type DiagnosticHook = Box<dyn Fn(&Diagnostic)>;

/// Counters describing what a run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Timer callbacks executed
    pub macrotasks_run: usize,
    /// Microtasks executed (promise reactions included)
    pub microtasks_run: usize,
    /// Logical clock reading when the run ended
    pub final_time_ms: u64,
    /// Unhandled rejections reported
    pub unhandled_rejections: usize,
}

struct LoopInner {
    config: LoopConfig,
    call_stack: CallStack,
    microtasks: RefCell<MicrotaskQueue>,
    macrotasks: RefCell<MacrotaskQueue>,
    clock: Box<dyn Clock>,
    console: Console,
    rejections: RefCell<RejectionTracker>,
    diagnostics: RefCell<Vec<Diagnostic>>,
    diagnostic_hook: Option<DiagnosticHook>,
    next_seq: Cell<u64>,
    next_promise_id: Cell<u64>,
    macrotasks_run: Cell<usize>,
    microtasks_run: Cell<usize>,
    unhandled_rejections: Cell<usize>,
}

/// The JavaScript event loop.
///
/// A cheap, cloneable handle. Task bodies receive `&EventLoop` and use it to
/// schedule timers, queue microtasks, create promises and log.
///
/// # Examples
///
/// ```
/// use loop_runtime::{CaptureSink, EventLoop};
/// use core_types::Value;
///
/// let sink = CaptureSink::new();
/// let event_loop = EventLoop::builder().with_sink(sink.clone()).build();
///
/// event_loop
///     .run(|el| {
///         el.schedule_timer(0, |el| {
///             el.console().log(2);
///             Ok(())
///         });
///         el.queue_microtask(|el| {
///             el.console().log(1);
///             Ok(())
///         });
///         el.console().log(0);
///         Ok(())
///     })
///     .unwrap();
///
/// assert_eq!(sink.values(), vec![Value::Smi(0), Value::Smi(1), Value::Smi(2)]);
/// ```
#[derive(Clone)]
pub struct EventLoop {
    inner: Rc<LoopInner>,
}

/// Builder for [`EventLoop`].
pub struct EventLoopBuilder {
    config: LoopConfig,
    clock: Option<Box<dyn Clock>>,
    sink: Rc<dyn OutputSink>,
    diagnostic_hook: Option<DiagnosticHook>,
}

impl EventLoopBuilder {
    /// Use `config` instead of the defaults.
    pub fn with_config(mut self, config: LoopConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a custom clock. Defaults to a [`LogicalClock`] at `start_time_ms`.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    /// Send console output to `sink`. Defaults to stdout.
    pub fn with_sink(mut self, sink: impl OutputSink + 'static) -> Self {
        self.sink = Rc::new(sink);
        self
    }

    /// Call `hook` for every diagnostic as it is reported.
    pub fn with_diagnostic_hook(mut self, hook: impl Fn(&Diagnostic) + 'static) -> Self {
        self.diagnostic_hook = Some(Box::new(hook));
        self
    }

    /// Builds the event loop.
    pub fn build(self) -> EventLoop {
        let clock = self
            .clock
            .unwrap_or_else(|| Box::new(LogicalClock::new(self.config.start_time_ms)));
        EventLoop {
            inner: Rc::new(LoopInner {
                config: self.config,
                call_stack: CallStack::new(),
                microtasks: RefCell::new(MicrotaskQueue::new()),
                macrotasks: RefCell::new(MacrotaskQueue::new()),
                clock,
                console: Console::new(self.sink),
                rejections: RefCell::new(RejectionTracker::default()),
                diagnostics: RefCell::new(Vec::new()),
                diagnostic_hook: self.diagnostic_hook,
                next_seq: Cell::new(0),
                next_promise_id: Cell::new(0),
                macrotasks_run: Cell::new(0),
                microtasks_run: Cell::new(0),
                unhandled_rejections: Cell::new(0),
            }),
        }
    }
}

impl EventLoop {
    /// Creates an EventLoop with default config, logging to stdout.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts building a customised EventLoop.
    pub fn builder() -> EventLoopBuilder {
        EventLoopBuilder {
            config: LoopConfig::default(),
            clock: None,
            sink: Rc::new(StdoutSink),
            diagnostic_hook: None,
        }
    }

    /// Runs `script` and then the loop until both queues are empty.
    ///
    /// # Errors
    ///
    /// - [`LoopError::Uncaught`] if the script or a timer callback throws
    /// - [`LoopError::UnhandledRejection`] under [`RejectionPolicy::Fatal`]
    /// - [`LoopError::TaskLimit`] if `max_macrotasks` is exceeded
    /// - [`LoopError::Reentrant`] if called from inside a task body
    pub fn run<F>(&self, script: F) -> Result<RunSummary, LoopError>
    where
        F: FnOnce(&EventLoop) -> Result<(), Value> + 'static,
    {
        if !self.inner.call_stack.is_empty() {
            return Err(LoopError::Reentrant);
        }

        let result = self.run_to_completion(script);
        self.inner.rejections.borrow_mut().clear();
        result
    }

    fn run_to_completion<F>(&self, script: F) -> Result<RunSummary, LoopError>
    where
        F: FnOnce(&EventLoop) -> Result<(), Value> + 'static,
    {
        tracing::debug!(now_ms = self.now_ms(), "event loop started");
        let script = Task::new(TaskKind::Script, self.next_seq(), script);
        self.run_task(script)?;
        self.checkpoint()?;

        let mut fired = 0usize;
        loop {
            let next = self.inner.macrotasks.borrow_mut().pop_next();
            let Some((handle, task)) = next else {
                break;
            };

            if let Some(limit) = self.inner.config.max_macrotasks {
                if fired >= limit {
                    tracing::warn!(limit, "macrotask limit reached, stopping");
                    return Err(LoopError::TaskLimit { limit });
                }
            }

            if let Some(due_ms) = task.due_ms() {
                self.inner.clock.advance_to(due_ms);
            }
            tracing::trace!(timer = %handle, now_ms = self.now_ms(), "timer fired");

            self.run_task(task)?;
            fired += 1;
            self.inner.macrotasks_run.set(self.inner.macrotasks_run.get() + 1);
            self.checkpoint()?;
        }

        let summary = self.summary();
        tracing::debug!(?summary, "event loop finished");
        Ok(summary)
    }

    /// `setTimeout(callback, delay_ms)`.
    ///
    /// The callback becomes runnable at `now + delay_ms` on the logical
    /// clock. Timers with the same due time fire in registration order.
    pub fn schedule_timer<F>(&self, delay_ms: u64, callback: F) -> TimerHandle
    where
        F: FnOnce(&EventLoop) -> Result<(), Value> + 'static,
    {
        let task = Task::new(TaskKind::Macrotask, self.next_seq(), callback);
        let now_ms = self.now_ms();
        let handle = self
            .inner
            .macrotasks
            .borrow_mut()
            .enqueue_after(now_ms, delay_ms, task);
        tracing::trace!(timer = %handle, delay_ms, now_ms, "timer scheduled");
        handle
    }

    /// `clearTimeout(handle)`.
    ///
    /// Returns false if the timer already fired or was already cancelled.
    pub fn cancel_timer(&self, handle: TimerHandle) -> bool {
        let cancelled = self.inner.macrotasks.borrow_mut().cancel(handle);
        tracing::trace!(timer = %handle, cancelled, "timer cancel requested");
        cancelled
    }

    /// `queueMicrotask(callback)`.
    ///
    /// If the callback throws, a [`Diagnostic::MicrotaskError`] is reported
    /// and the loop keeps going.
    pub fn queue_microtask<F>(&self, callback: F)
    where
        F: FnOnce(&EventLoop) -> Result<(), Value> + 'static,
    {
        let task = Task::new(TaskKind::Microtask, self.next_seq(), callback);
        self.inner.microtasks.borrow_mut().enqueue(task);
    }

    /// `new Promise(executor)`.
    pub fn create_promise<F>(&self, executor: F) -> Promise
    where
        F: FnOnce(&EventLoop, Resolver) -> Result<(), Value>,
    {
        Promise::new(self, executor)
    }

    /// The console task bodies log to.
    pub fn console(&self) -> &Console {
        &self.inner.console
    }

    /// Current logical time.
    pub fn now_ms(&self) -> u64 {
        self.inner.clock.now_ms()
    }

    /// The configuration this loop was built with.
    pub fn config(&self) -> &LoopConfig {
        &self.inner.config
    }

    /// Returns true if no task body is executing.
    pub fn is_call_stack_empty(&self) -> bool {
        self.inner.call_stack.is_empty()
    }

    /// Number of queued microtasks.
    pub fn pending_microtasks(&self) -> usize {
        self.inner.microtasks.borrow().len()
    }

    /// Number of queued timers.
    pub fn pending_macrotasks(&self) -> usize {
        self.inner.macrotasks.borrow().len()
    }

    /// Due time of the earliest queued timer, if any.
    pub fn next_timer_ms(&self) -> Option<u64> {
        self.inner.macrotasks.borrow().next_due_ms()
    }

    /// Every diagnostic reported so far, in order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.inner.diagnostics.borrow().clone()
    }

    /// Counters accumulated so far.
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            macrotasks_run: self.inner.macrotasks_run.get(),
            microtasks_run: self.inner.microtasks_run.get(),
            final_time_ms: self.now_ms(),
            unhandled_rejections: self.inner.unhandled_rejections.get(),
        }
    }

    fn next_seq(&self) -> u64 {
        let seq = self.inner.next_seq.get();
        self.inner.next_seq.set(seq + 1);
        seq
    }

    pub(crate) fn next_promise_id(&self) -> PromiseId {
        let id = self.inner.next_promise_id.get();
        self.inner.next_promise_id.set(id + 1);
        PromiseId(id)
    }

    pub(crate) fn track_rejection(&self, promise: Promise) {
        self.inner.rejections.borrow_mut().track(promise);
    }

    pub(crate) fn rejection_handled(&self, id: PromiseId) {
        let diagnostic = self.inner.rejections.borrow_mut().handled(id);
        if let Some(diagnostic) = diagnostic {
            tracing::debug!(promise = %id, "rejection handled late");
            self.report(diagnostic);
        }
    }

    fn run_task(&self, task: Task) -> Result<(), LoopError> {
        let kind = task.kind();
        self.inner
            .call_stack
            .run(task, self)
            .map_err(|reason| {
                tracing::error!(%kind, %reason, "uncaught exception");
                LoopError::Uncaught { kind, reason }
            })
    }

    /// Drains microtasks, then reports rejections nobody handled.
    fn checkpoint(&self) -> Result<(), LoopError> {
        self.drain_microtasks();
        self.flush_rejections()
    }

    fn drain_microtasks(&self) {
        debug_assert!(self.inner.call_stack.is_empty());
        let mut ran = 0usize;
        loop {
            let next = self.inner.microtasks.borrow_mut().dequeue();
            let Some(task) = next else {
                break;
            };
            let seq = task.seq();
            if let Err(error) = self.inner.call_stack.run(task, self) {
                tracing::error!(seq, %error, "microtask threw");
                self.report(Diagnostic::MicrotaskError { seq, error });
            }
            ran += 1;
        }
        self.inner
            .microtasks_run
            .set(self.inner.microtasks_run.get() + ran);
        tracing::debug!(ran, "microtask queue drained");
    }

    fn flush_rejections(&self) -> Result<(), LoopError> {
        let unhandled = self.inner.rejections.borrow_mut().take_unhandled();
        for diagnostic in unhandled {
            let Diagnostic::UnhandledRejection { promise, reason } = &diagnostic else {
                continue;
            };
            tracing::warn!(promise = %promise, %reason, "unhandled promise rejection");
            let fatal = match self.inner.config.unhandled_rejections {
                RejectionPolicy::Fatal => Some(LoopError::UnhandledRejection {
                    promise: *promise,
                    reason: reason.clone(),
                }),
                RejectionPolicy::Report => None,
            };
            self.inner
                .unhandled_rejections
                .set(self.inner.unhandled_rejections.get() + 1);
            self.report(diagnostic);
            if let Some(error) = fatal {
                return Err(error);
            }
        }
        Ok(())
    }

    fn report(&self, diagnostic: Diagnostic) {
        if let Some(hook) = &self.inner.diagnostic_hook {
            hook(&diagnostic);
        }
        self.inner.diagnostics.borrow_mut().push(diagnostic);
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLoop")
            .field("now_ms", &self.now_ms())
            .field("call_stack_depth", &self.inner.call_stack.depth())
            .field("pending_microtasks", &self.pending_microtasks())
            .field("pending_macrotasks", &self.pending_macrotasks())
            .field("next_timer_ms", &self.next_timer_ms())
            .finish()
    }
}
