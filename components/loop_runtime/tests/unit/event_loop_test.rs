//! Unit tests for EventLoop

use core_types::{JsError, Value};
use loop_runtime::{CaptureSink, EventLoop, LoopConfig, LoopError, TaskKind};

fn capture_loop() -> (EventLoop, CaptureSink) {
    let sink = CaptureSink::new();
    let event_loop = EventLoop::builder().with_sink(sink.clone()).build();
    (event_loop, sink)
}

#[test]
fn new_event_loop_has_empty_queues() {
    let event_loop = EventLoop::new();
    assert_eq!(event_loop.pending_microtasks(), 0);
    assert_eq!(event_loop.pending_macrotasks(), 0);
}

#[test]
fn schedule_timer_adds_to_macrotask_queue() {
    let event_loop = EventLoop::new();
    event_loop.schedule_timer(0, |_| Ok(()));
    assert_eq!(event_loop.pending_macrotasks(), 1);
}

#[test]
fn queue_microtask_adds_to_microtask_queue() {
    let event_loop = EventLoop::new();
    event_loop.queue_microtask(|_| Ok(()));
    assert_eq!(event_loop.pending_microtasks(), 1);
}

#[test]
fn run_leaves_queues_empty() {
    let (event_loop, _) = capture_loop();
    event_loop
        .run(|el| {
            el.schedule_timer(5, |el| {
                el.queue_microtask(|_| Ok(()));
                Ok(())
            });
            el.queue_microtask(|_| Ok(()));
            Ok(())
        })
        .unwrap();
    assert_eq!(event_loop.pending_microtasks(), 0);
    assert_eq!(event_loop.pending_macrotasks(), 0);
    assert!(event_loop.is_call_stack_empty());
}

#[test]
fn call_stack_is_busy_inside_task_bodies() {
    let (event_loop, sink) = capture_loop();
    event_loop
        .run(|el| {
            el.console().log(el.is_call_stack_empty());
            el.schedule_timer(0, |el| {
                el.console().log(el.is_call_stack_empty());
                Ok(())
            });
            Ok(())
        })
        .unwrap();
    assert_eq!(sink.values(), vec![Value::Boolean(false), Value::Boolean(false)]);
}

#[test]
fn cancelled_timer_never_fires() {
    let (event_loop, sink) = capture_loop();
    event_loop
        .run(|el| {
            let first = el.schedule_timer(0, |el| {
                el.console().log(1);
                Ok(())
            });
            el.schedule_timer(0, |el| {
                el.console().log(2);
                Ok(())
            });
            el.console().log(el.cancel_timer(first));
            Ok(())
        })
        .unwrap();
    assert_eq!(sink.values(), vec![Value::Boolean(true), Value::Smi(2)]);
}

#[test]
fn cancelling_a_fired_timer_is_a_noop() {
    let (event_loop, sink) = capture_loop();
    event_loop
        .run(|el| {
            let first = el.schedule_timer(0, |_| Ok(()));
            el.schedule_timer(1, move |el| {
                el.console().log(el.cancel_timer(first));
                Ok(())
            });
            Ok(())
        })
        .unwrap();
    assert_eq!(sink.values(), vec![Value::Boolean(false)]);
}

#[test]
fn script_throw_is_fatal() {
    let (event_loop, sink) = capture_loop();
    let result = event_loop.run(|el| {
        el.schedule_timer(0, |el| {
            el.console().log("never");
            Ok(())
        });
        Err(Value::from(JsError::error("boom")))
    });

    assert_eq!(
        result,
        Err(LoopError::Uncaught {
            kind: TaskKind::Script,
            reason: Value::from(JsError::error("boom")),
        })
    );
    assert!(sink.values().is_empty());
}

#[test]
fn timer_throw_stops_the_run() {
    let (event_loop, sink) = capture_loop();
    let result = event_loop.run(|el| {
        el.schedule_timer(0, |_| Err(Value::from("timer failed")));
        el.schedule_timer(0, |el| {
            el.console().log("never");
            Ok(())
        });
        Ok(())
    });

    match result {
        Err(LoopError::Uncaught { kind, reason }) => {
            assert_eq!(kind, TaskKind::Macrotask);
            assert_eq!(reason, Value::from("timer failed"));
        }
        other => panic!("expected uncaught error, got {:?}", other),
    }
    assert!(sink.values().is_empty());
    assert_eq!(event_loop.pending_macrotasks(), 1);
}

#[test]
fn macrotask_limit_stops_runaway_timers() {
    fn tick(el: &EventLoop) -> Result<(), Value> {
        el.console().log(Value::from(el.now_ms() as f64));
        el.schedule_timer(1, tick);
        Ok(())
    }

    let sink = CaptureSink::new();
    let config = LoopConfig {
        max_macrotasks: Some(3),
        ..LoopConfig::default()
    };
    let event_loop = EventLoop::builder()
        .with_config(config)
        .with_sink(sink.clone())
        .build();

    let result = event_loop.run(|el| {
        el.schedule_timer(1, tick);
        Ok(())
    });

    assert_eq!(result, Err(LoopError::TaskLimit { limit: 3 }));
    assert_eq!(sink.values(), vec![Value::Smi(1), Value::Smi(2), Value::Smi(3)]);
}

#[test]
fn summary_counts_tasks() {
    let (event_loop, _) = capture_loop();
    let summary = event_loop
        .run(|el| {
            el.schedule_timer(3, |el| {
                el.queue_microtask(|_| Ok(()));
                Ok(())
            });
            el.schedule_timer(7, |_| Ok(()));
            el.queue_microtask(|_| Ok(()));
            Ok(())
        })
        .unwrap();

    assert_eq!(summary.macrotasks_run, 2);
    assert_eq!(summary.microtasks_run, 2);
    assert_eq!(summary.final_time_ms, 7);
    assert_eq!(summary.unhandled_rejections, 0);
}
