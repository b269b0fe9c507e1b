//! Unhandled rejection tracking.
//!
//! A promise rejected with no reaction attached is remembered until the next
//! microtask checkpoint. If still nobody handled it by then, it is reported
//! once. Attaching a handler to an already-reported promise reports that too.

use crate::promise::{Promise, PromiseId};
use core_types::Value;
use serde::Serialize;
use std::collections::HashSet;

/// Something the event loop reports outside of console output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A rejected promise had no handler after a full microtask drain.
    UnhandledRejection {
        /// The rejected promise
        promise: PromiseId,
        /// Its rejection reason
        reason: Value,
    },
    /// A handler was attached to a promise previously reported as unhandled.
    RejectionHandled {
        /// The promise that is now handled
        promise: PromiseId,
    },
    /// A `queue_microtask` callback threw.
    MicrotaskError {
        /// Seq of the failing microtask
        seq: u64,
        /// The thrown value
        error: Value,
    },
}

#[derive(Debug, Default)]
pub(crate) struct RejectionTracker {
    pending: Vec<Promise>,
    reported: HashSet<PromiseId>,
}

impl RejectionTracker {
    /// A promise was rejected while nothing was subscribed to it.
    pub(crate) fn track(&mut self, promise: Promise) {
        self.pending.push(promise);
    }

    /// A reaction was attached to a rejected promise.
    pub(crate) fn handled(&mut self, id: PromiseId) -> Option<Diagnostic> {
        self.pending.retain(|p| p.id() != id);
        self.reported
            .remove(&id)
            .then_some(Diagnostic::RejectionHandled { promise: id })
    }

    /// Forgets everything tracked. Called when a run ends, so a handler
    /// attached during a later run is not reported as late.
    pub(crate) fn clear(&mut self) {
        self.pending.clear();
        self.reported.clear();
    }

    /// Reports every promise still unhandled, in rejection order.
    pub(crate) fn take_unhandled(&mut self) -> Vec<Diagnostic> {
        let pending = std::mem::take(&mut self.pending);
        pending
            .into_iter()
            .filter_map(|promise| {
                let reason = promise.rejection_reason()?;
                self.reported.insert(promise.id());
                Some(Diagnostic::UnhandledRejection {
                    promise: promise.id(),
                    reason,
                })
            })
            .collect()
    }
}
