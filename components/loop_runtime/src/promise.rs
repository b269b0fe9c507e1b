//! Promise implementation following the Promise/A+ specification.
//!
//! Promises are shared handles into the event loop's single-threaded world.
//! Settling a promise never runs its reactions inline: each reaction becomes
//! a microtask, in registration order.

use crate::EventLoop;
use core_types::{JsError, Value};
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// A reaction handler. Receives the settled value or reason; `Err` is a throw.
pub type Handler = Box<dyn FnOnce(&EventLoop, Value) -> Result<Resolution, Value>>;

/// Boxes a closure as a [`Handler`].
///
/// The closure may return anything convertible into a [`Resolution`]: a
/// [`Value`], `()` for `undefined`, or a [`Promise`] to adopt.
pub fn handler<F, R>(f: F) -> Handler
where
    F: FnOnce(&EventLoop, Value) -> Result<R, Value> + 'static,
    R: Into<Resolution>,
{
    Box::new(move |event_loop, value| f(event_loop, value).map(Into::into))
}

/// Unique id of a promise within one event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PromiseId(pub(crate) u64);

impl fmt::Display for PromiseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "promise#{}", self.0)
    }
}

/// The state of a Promise.
///
/// Once settled (Fulfilled or Rejected), a Promise cannot change state.
#[derive(Debug, Clone, PartialEq)]
pub enum PromiseState {
    /// The initial state; the promise is neither fulfilled nor rejected.
    Pending,
    /// The promise has been fulfilled with a value.
    Fulfilled(Value),
    /// The promise has been rejected with a reason.
    Rejected(Value),
}

impl PromiseState {
    /// Returns true while the promise is unsettled.
    pub fn is_pending(&self) -> bool {
        matches!(self, PromiseState::Pending)
    }
}

/// What a promise is resolved with.
///
/// Adopting another promise is explicit; plain values never are thenables.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// Fulfill with this value.
    Value(Value),
    /// Follow this promise's eventual outcome.
    Adopt(Promise),
}

impl From<Value> for Resolution {
    fn from(value: Value) -> Self {
        Resolution::Value(value)
    }
}

impl From<()> for Resolution {
    fn from(_: ()) -> Self {
        Resolution::Value(Value::Undefined)
    }
}

impl From<Promise> for Resolution {
    fn from(promise: Promise) -> Self {
        Resolution::Adopt(promise)
    }
}

#[derive(Debug, Clone)]
enum Settled {
    Fulfilled(Value),
    Rejected(Value),
}

/// A reaction to be triggered when a Promise settles.
///
/// This represents the handlers registered via `.then()`, together with the
/// resolving functions of the promise `.then()` returned.
struct PromiseReaction {
    on_fulfilled: Option<Handler>,
    on_rejected: Option<Handler>,
    derived: Resolver,
}

struct PromiseInner {
    id: PromiseId,
    state: PromiseState,
    reactions: Vec<PromiseReaction>,
    /// Set once any reaction has been attached.
    handled: bool,
}

/// A JavaScript Promise.
///
/// Cloning yields another handle to the same promise.
///
/// # Examples
///
/// ```
/// use loop_runtime::{CaptureSink, EventLoop, Promise, PromiseState};
/// use core_types::Value;
///
/// let sink = CaptureSink::new();
/// let event_loop = EventLoop::builder().with_sink(sink.clone()).build();
///
/// event_loop
///     .run(|el| {
///         Promise::resolved(el, Value::Smi(1)).then(el, |el, v| {
///             el.console().log(v);
///             Ok(())
///         });
///         Ok(())
///     })
///     .unwrap();
///
/// assert_eq!(sink.values(), vec![Value::Smi(1)]);
/// ```
#[derive(Clone)]
pub struct Promise {
    inner: Rc<RefCell<PromiseInner>>,
}

impl Promise {
    pub(crate) fn pending(event_loop: &EventLoop) -> Self {
        Self {
            inner: Rc::new(RefCell::new(PromiseInner {
                id: event_loop.next_promise_id(),
                state: PromiseState::Pending,
                reactions: Vec::new(),
                handled: false,
            })),
        }
    }

    /// `new Promise(executor)`.
    ///
    /// The executor runs synchronously. If it throws, the promise is rejected
    /// with the thrown value unless it was already resolved.
    pub fn new<F>(event_loop: &EventLoop, executor: F) -> Self
    where
        F: FnOnce(&EventLoop, Resolver) -> Result<(), Value>,
    {
        let promise = Self::pending(event_loop);
        let resolver = Resolver::new(&promise);
        if let Err(thrown) = executor(event_loop, resolver.clone()) {
            resolver.reject(event_loop, thrown);
        }
        promise
    }

    /// `Promise.resolve(value)`. A promise passed in is returned as-is.
    pub fn resolved(event_loop: &EventLoop, value: impl Into<Resolution>) -> Self {
        match value.into() {
            Resolution::Adopt(promise) => promise,
            Resolution::Value(value) => {
                let promise = Self::pending(event_loop);
                promise.settle(event_loop, Settled::Fulfilled(value));
                promise
            }
        }
    }

    /// `Promise.reject(reason)`.
    pub fn rejected(event_loop: &EventLoop, reason: impl Into<Value>) -> Self {
        let promise = Self::pending(event_loop);
        promise.settle(event_loop, Settled::Rejected(reason.into()));
        promise
    }

    /// Id of this promise.
    pub fn id(&self) -> PromiseId {
        self.inner.borrow().id
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> PromiseState {
        self.inner.borrow().state.clone()
    }

    /// Returns true while the promise is unsettled.
    pub fn is_pending(&self) -> bool {
        self.inner.borrow().state.is_pending()
    }

    /// Returns true if both handles refer to the same promise.
    pub fn ptr_eq(&self, other: &Promise) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn rejection_reason(&self) -> Option<Value> {
        match &self.inner.borrow().state {
            PromiseState::Rejected(reason) => Some(reason.clone()),
            _ => None,
        }
    }

    /// `.then(onFulfilled)`. Rejections pass through to the returned promise.
    pub fn then<F, R>(&self, event_loop: &EventLoop, on_fulfilled: F) -> Promise
    where
        F: FnOnce(&EventLoop, Value) -> Result<R, Value> + 'static,
        R: Into<Resolution>,
    {
        self.then_with(event_loop, Some(handler(on_fulfilled)), None)
    }

    /// `.catch(onRejected)`. Fulfillment values pass through.
    pub fn catch<F, R>(&self, event_loop: &EventLoop, on_rejected: F) -> Promise
    where
        F: FnOnce(&EventLoop, Value) -> Result<R, Value> + 'static,
        R: Into<Resolution>,
    {
        self.then_with(event_loop, None, Some(handler(on_rejected)))
    }

    /// `.finally(onFinally)`.
    ///
    /// Runs on either outcome. The callback's result is adopted first, so a
    /// returned promise is waited on, and only then does the original
    /// outcome pass through. If the callback throws or its promise rejects,
    /// the returned promise rejects with that reason instead.
    pub fn finally<F, R>(&self, event_loop: &EventLoop, on_finally: F) -> Promise
    where
        F: FnOnce(&EventLoop) -> Result<R, Value> + 'static,
        R: Into<Resolution> + 'static,
    {
        let callback = Rc::new(RefCell::new(Some(on_finally)));
        let on_reject_callback = callback.clone();

        let on_fulfilled: Handler = Box::new(move |el, value| {
            let done = run_finally(el, &*callback)?;
            Ok(Resolution::Adopt(done.then(el, move |_, _| Ok(value))))
        });
        let on_rejected: Handler = Box::new(move |el, reason| {
            let done = run_finally(el, &*on_reject_callback)?;
            let rethrow = done.then(el, move |_, _| -> Result<Value, Value> { Err(reason) });
            Ok(Resolution::Adopt(rethrow))
        });
        self.then_with(event_loop, Some(on_fulfilled), Some(on_rejected))
    }

    /// `.then(onFulfilled, onRejected)` with either handler optional.
    ///
    /// # Returns
    ///
    /// A new Promise settled from the outcome of the matching handler, or
    /// from this promise's outcome when that handler is absent.
    pub fn then_with(
        &self,
        event_loop: &EventLoop,
        on_fulfilled: Option<Handler>,
        on_rejected: Option<Handler>,
    ) -> Promise {
        let derived = Promise::pending(event_loop);
        let reaction = PromiseReaction {
            on_fulfilled,
            on_rejected,
            derived: Resolver::new(&derived),
        };

        let mut inner = self.inner.borrow_mut();
        let was_handled = std::mem::replace(&mut inner.handled, true);
        let settled = match &inner.state {
            PromiseState::Pending => None,
            PromiseState::Fulfilled(value) => Some(Settled::Fulfilled(value.clone())),
            PromiseState::Rejected(reason) => Some(Settled::Rejected(reason.clone())),
        };

        match settled {
            None => inner.reactions.push(reaction),
            Some(settled) => {
                let id = inner.id;
                drop(inner);
                if matches!(settled, Settled::Rejected(_)) && !was_handled {
                    event_loop.rejection_handled(id);
                }
                enqueue_reaction_job(event_loop, reaction, settled);
            }
        }

        derived
    }

    fn settle(&self, event_loop: &EventLoop, settled: Settled) {
        let (id, reactions, handled) = {
            let mut inner = self.inner.borrow_mut();
            if !inner.state.is_pending() {
                return;
            }
            inner.state = match &settled {
                Settled::Fulfilled(value) => PromiseState::Fulfilled(value.clone()),
                Settled::Rejected(reason) => PromiseState::Rejected(reason.clone()),
            };
            (inner.id, std::mem::take(&mut inner.reactions), inner.handled)
        };

        tracing::trace!(
            promise = %id,
            fulfilled = matches!(settled, Settled::Fulfilled(_)),
            reactions = reactions.len(),
            "promise settled"
        );

        if matches!(settled, Settled::Rejected(_)) && !handled {
            event_loop.track_rejection(self.clone());
        }
        for reaction in reactions {
            enqueue_reaction_job(event_loop, reaction, settled.clone());
        }
    }
}

impl fmt::Debug for Promise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Promise")
            .field("id", &inner.id)
            .field("state", &inner.state)
            .field("reactions", &inner.reactions.len())
            .finish()
    }
}

fn enqueue_reaction_job(event_loop: &EventLoop, reaction: PromiseReaction, settled: Settled) {
    event_loop.queue_microtask(move |el| {
        run_reaction(el, reaction, settled);
        Ok(())
    });
}

/// Calls the `finally` callback once and wraps its result in a promise.
fn run_finally<F, R>(
    event_loop: &EventLoop,
    callback: &RefCell<Option<F>>,
) -> Result<Promise, Value>
where
    F: FnOnce(&EventLoop) -> Result<R, Value>,
    R: Into<Resolution>,
{
    let on_finally = callback.borrow_mut().take();
    let resolution = match on_finally {
        Some(f) => f(event_loop)?.into(),
        None => Resolution::Value(Value::Undefined),
    };
    Ok(Promise::resolved(event_loop, resolution))
}

/// Runs one reaction. Handler throws become rejections of the derived promise.
fn run_reaction(event_loop: &EventLoop, reaction: PromiseReaction, settled: Settled) {
    let PromiseReaction {
        on_fulfilled,
        on_rejected,
        derived,
    } = reaction;

    let outcome = match settled {
        Settled::Fulfilled(value) => match on_fulfilled {
            Some(f) => f(event_loop, value),
            None => Ok(Resolution::Value(value)),
        },
        Settled::Rejected(reason) => match on_rejected {
            Some(f) => f(event_loop, reason),
            None => Err(reason),
        },
    };

    match outcome {
        Ok(resolution) => derived.resolve(event_loop, resolution),
        Err(thrown) => derived.reject(event_loop, thrown),
    }
}

/// The `resolve`/`reject` pair handed to an executor.
///
/// Only the first call on a pair has any effect. Clones share that state, so
/// a clone moved into a timer callback still races the original.
#[derive(Clone)]
pub struct Resolver {
    promise: Promise,
    already_resolved: Rc<Cell<bool>>,
}

impl Resolver {
    fn new(promise: &Promise) -> Self {
        Self {
            promise: promise.clone(),
            already_resolved: Rc::new(Cell::new(false)),
        }
    }

    /// The promise these functions settle.
    pub fn promise(&self) -> &Promise {
        &self.promise
    }

    /// `resolve(value)`.
    ///
    /// Resolving with another promise subscribes to it from a microtask, so
    /// adoption is never synchronous. Resolving a promise with itself rejects
    /// it with a `TypeError`.
    pub fn resolve(&self, event_loop: &EventLoop, resolution: impl Into<Resolution>) {
        if self.already_resolved.replace(true) {
            return;
        }
        match resolution.into() {
            Resolution::Value(value) => self.promise.settle(event_loop, Settled::Fulfilled(value)),
            Resolution::Adopt(other) if other.ptr_eq(&self.promise) => {
                let error = JsError::type_error("Chaining cycle detected for promise");
                self.promise
                    .settle(event_loop, Settled::Rejected(Value::Error(error)));
            }
            Resolution::Adopt(other) => {
                let target = self.promise.clone();
                event_loop.queue_microtask(move |el| {
                    adopt(el, &target, &other);
                    Ok(())
                });
            }
        }
    }

    /// `reject(reason)`.
    pub fn reject(&self, event_loop: &EventLoop, reason: impl Into<Value>) {
        if self.already_resolved.replace(true) {
            return;
        }
        self.promise
            .settle(event_loop, Settled::Rejected(reason.into()));
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("promise", &self.promise.id())
            .field("already_resolved", &self.already_resolved.get())
            .finish()
    }
}

/// Makes `target` follow `source` with a fresh pair of resolving functions.
fn adopt(event_loop: &EventLoop, target: &Promise, source: &Promise) {
    let on_fulfill = Resolver::new(target);
    let on_reject = on_fulfill.clone();
    source.then_with(
        event_loop,
        Some(handler(move |el, value| {
            on_fulfill.resolve(el, value);
            Ok(())
        })),
        Some(handler(move |el, reason| {
            on_reject.reject(el, reason);
            Ok(())
        })),
    );
}
