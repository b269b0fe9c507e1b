//! Contract tests for loop_runtime component
//!
//! These tests pin the public surface task bodies and hosts depend on:
//! the submission API, the promise API and the diagnostic types.

use core_types::Value;
use loop_runtime::{
    CaptureSink, Diagnostic, EventLoop, LoopConfig, LoopError, Promise, PromiseState,
    Resolution, Resolver, RunSummary, TimerHandle,
};

mod event_loop_contract {
    use super::*;

    #[test]
    fn event_loop_new_returns_self() {
        let event_loop = EventLoop::new();
        let _ = event_loop;
    }

    #[test]
    fn schedule_timer_returns_handle() {
        let event_loop = EventLoop::new();
        let handle: TimerHandle = event_loop.schedule_timer(0, |_| Ok(()));
        assert!(event_loop.cancel_timer(handle));
    }

    #[test]
    fn timer_handles_are_distinct() {
        let event_loop = EventLoop::new();
        let a = event_loop.schedule_timer(0, |_| Ok(()));
        let b = event_loop.schedule_timer(0, |_| Ok(()));
        assert_ne!(a, b);
    }

    #[test]
    fn run_returns_summary() {
        let event_loop = EventLoop::new();
        let summary: Result<RunSummary, LoopError> = event_loop.run(|_| Ok(()));
        assert!(summary.is_ok());
    }

    #[test]
    fn create_promise_returns_promise() {
        let event_loop = EventLoop::new();
        let promise: Promise = event_loop.create_promise(|_, _: Resolver| Ok(()));
        assert!(promise.is_pending());
    }

    #[test]
    fn event_loop_handles_share_state() {
        let event_loop = EventLoop::new();
        let other = event_loop.clone();
        other.queue_microtask(|_| Ok(()));
        assert_eq!(event_loop.pending_microtasks(), 1);
    }

    #[test]
    fn config_is_exposed() {
        let event_loop = EventLoop::builder()
            .with_config(LoopConfig {
                max_macrotasks: Some(1),
                ..LoopConfig::default()
            })
            .build();
        assert_eq!(event_loop.config().max_macrotasks, Some(1));
    }
}

mod promise_contract {
    use super::*;

    #[test]
    fn then_returns_new_promise() {
        let event_loop = EventLoop::new();
        let promise = Promise::resolved(&event_loop, Value::Undefined);
        let chained = promise.then(&event_loop, |_, v| Ok(v));
        assert!(!chained.ptr_eq(&promise));
    }

    #[test]
    fn promise_state_carries_value() {
        let event_loop = EventLoop::new();
        let promise = Promise::resolved(&event_loop, Value::Smi(42));
        assert_eq!(promise.state(), PromiseState::Fulfilled(Value::Smi(42)));
    }

    #[test]
    fn resolution_conversions() {
        let event_loop = EventLoop::new();
        assert!(matches!(Resolution::from(Value::Smi(1)), Resolution::Value(_)));
        assert!(matches!(
            Resolution::from(()),
            Resolution::Value(Value::Undefined)
        ));
        let promise = Promise::resolved(&event_loop, Value::Undefined);
        assert!(matches!(Resolution::from(promise), Resolution::Adopt(_)));
    }
}

mod diagnostic_contract {
    use super::*;

    #[test]
    fn diagnostics_serialize_with_type_tag() {
        let sink = CaptureSink::new();
        let event_loop = EventLoop::builder().with_sink(sink).build();
        event_loop
            .run(|el| {
                Promise::rejected(el, Value::from("r"));
                Ok(())
            })
            .unwrap();

        let diagnostics: Vec<Diagnostic> = event_loop.diagnostics();
        let json = serde_json::to_value(&diagnostics).unwrap();
        assert_eq!(json[0]["type"], "unhandled_rejection");
        assert_eq!(json[0]["reason"], "r");
    }

    #[test]
    fn loop_error_messages() {
        let error = LoopError::TaskLimit { limit: 2 };
        assert_eq!(error.to_string(), "macrotask limit of 2 exceeded");
        assert_eq!(
            LoopError::Reentrant.to_string(),
            "event loop is already running"
        );
    }
}
