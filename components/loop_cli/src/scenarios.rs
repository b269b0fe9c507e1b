//! Bundled scenarios.
//!
//! Each scenario is a small script replayed on the simulator, together with
//! the console order a browser or Node prints for the same program.

use clap::ValueEnum;
use core_types::Value;
use loop_runtime::{EventLoop, Promise};
use serde::Serialize;
use std::fmt;

/// Signature shared by all scenario scripts.
pub type Script = fn(&EventLoop) -> Result<(), Value>;

/// A bundled scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scenario {
    /// Two zero-delay timers around synchronous logs
    CallbackWebApi,
    /// Resolved promise, explicit microtasks and a timer
    Mashup,
    /// Promise resolved from a timer callback
    PromiseInit,
    /// Three-link `.then` chain
    Chaining,
    /// Validation chains with one success and one rejection
    UserFilter,
    /// Rejected promise nobody handles
    UnhandledRejection,
}

impl Scenario {
    /// Every bundled scenario, in listing order.
    pub const ALL: [Scenario; 6] = [
        Scenario::CallbackWebApi,
        Scenario::Mashup,
        Scenario::PromiseInit,
        Scenario::Chaining,
        Scenario::UserFilter,
        Scenario::UnhandledRejection,
    ];

    /// Command line name.
    pub fn name(self) -> &'static str {
        match self {
            Scenario::CallbackWebApi => "callback-web-api",
            Scenario::Mashup => "mashup",
            Scenario::PromiseInit => "promise-init",
            Scenario::Chaining => "chaining",
            Scenario::UserFilter => "user-filter",
            Scenario::UnhandledRejection => "unhandled-rejection",
        }
    }

    /// One-line summary for `--list`.
    pub fn description(self) -> &'static str {
        match self {
            Scenario::CallbackWebApi => "setTimeout callbacks wait for the synchronous script",
            Scenario::Mashup => "promise reactions and queueMicrotask run before a timer",
            Scenario::PromiseInit => "a timer resolves a promise, its reaction runs right after",
            Scenario::Chaining => "each .then link runs one microtask after the previous one",
            Scenario::UserFilter => "a rejection skips .then links and lands in .catch",
            Scenario::UnhandledRejection => "a rejection without handlers is reported",
        }
    }

    /// Console lines the scenario must print, in order.
    pub fn expected_output(self) -> Vec<&'static str> {
        match self {
            Scenario::CallbackWebApi => vec!["0", "3", "4", "5", "1", "2"],
            Scenario::Mashup => vec!["5", "1", "3", "4", "2"],
            Scenario::PromiseInit => vec!["0", "3", "1", "2"],
            Scenario::Chaining => vec!["FINALLY", "1", "2", "4"],
            Scenario::UserFilter => vec![
                r#"Filtering User: { name: "Haitam", username: "sch0penheimer" }"#,
                r#"Filtering User: { name: "NotHaitam", username: "not_sch0penheimer" }"#,
                "User is different than Haitam, cannot be passed !",
                "User Succefully Validated! Now Querying the backend",
                r#"User not valid ! Error: { name: "NotHaitam", username: "not_sch0penheimer" }"#,
                r#"Backend queried successfuly, response: { name: "Haitam", username: "sch0penheimer" }"#,
            ],
            Scenario::UnhandledRejection => vec!["start", "timer"],
        }
    }

    /// The script to hand to [`EventLoop::run`].
    pub fn script(self) -> Script {
        match self {
            Scenario::CallbackWebApi => callback_web_api,
            Scenario::Mashup => mashup,
            Scenario::PromiseInit => promise_init,
            Scenario::Chaining => chaining,
            Scenario::UserFilter => user_filter,
            Scenario::UnhandledRejection => unhandled_rejection,
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn log_later(value: i32) -> impl FnOnce(&EventLoop) -> Result<(), Value> {
    move |el| {
        el.console().log(value);
        Ok(())
    }
}

fn callback_web_api(el: &EventLoop) -> Result<(), Value> {
    el.console().log(0);
    el.schedule_timer(0, log_later(1));
    el.schedule_timer(0, log_later(2));
    el.console().log(3);
    el.console().log(4);
    el.console().log(5);
    Ok(())
}

fn mashup(el: &EventLoop) -> Result<(), Value> {
    Promise::resolved(el, Value::Undefined).then(el, |el, _| {
        el.console().log(1);
        Ok(())
    });
    el.schedule_timer(10, log_later(2));
    el.queue_microtask(|el| {
        el.console().log(3);
        el.queue_microtask(log_later(4));
        Ok(())
    });
    el.console().log(5);
    Ok(())
}

fn promise_init(el: &EventLoop) -> Result<(), Value> {
    el.console().log(0);
    el.schedule_timer(0, log_later(1));
    el.create_promise(|el, resolver| {
        el.schedule_timer(0, move |el| {
            resolver.resolve(el, Value::Smi(2));
            Ok(())
        });
        Ok(())
    })
    .then(el, |el, result| {
        el.console().log(result);
        Ok(())
    });
    el.console().log(3);
    Ok(())
}

fn log_and_double(el: &EventLoop, result: Value) -> Result<Value, Value> {
    el.console().log(result.clone());
    let n = result.as_number().unwrap_or(f64::NAN);
    Ok(Value::number(n * 2.0))
}

fn chaining(el: &EventLoop) -> Result<(), Value> {
    el.create_promise(|el, resolver| {
        resolver.resolve(el, Value::Smi(1));
        Ok(())
    })
    .then(el, log_and_double)
    .then(el, log_and_double)
    .then(el, |el, result| {
        el.console().log(result);
        Ok(())
    });
    el.console().log("FINALLY");
    Ok(())
}

fn user(name: &str, username: &str) -> Value {
    Value::object([("name", Value::from(name)), ("username", Value::from(username))])
}

fn filter_user(el: &EventLoop, user: Value) -> Promise {
    el.create_promise(move |el, resolver| {
        el.console()
            .log_all(&[Value::from("Filtering User:"), user.clone()]);
        if user.get("name").and_then(Value::as_str) == Some("Haitam") {
            resolver.resolve(el, user);
        } else {
            el.console()
                .log("User is different than Haitam, cannot be passed !");
            resolver.reject(el, user);
        }
        Ok(())
    })
}

fn query_backend(el: &EventLoop, user: Value) -> Promise {
    el.create_promise(move |el, resolver| {
        resolver.resolve(el, user);
        Ok(())
    })
}

fn validate(el: &EventLoop, user: Value) {
    filter_user(el, user)
        .then(el, |el, filtered| {
            el.console()
                .log("User Succefully Validated! Now Querying the backend");
            Ok(query_backend(el, filtered))
        })
        .then(el, |el, response| {
            el.console().log_all(&[
                Value::from("Backend queried successfuly, response:"),
                response,
            ]);
            Ok(())
        })
        .catch(el, |el, err| {
            el.console()
                .error_all(&[Value::from("User not valid ! Error:"), err]);
            Ok(())
        });
}

fn user_filter(el: &EventLoop) -> Result<(), Value> {
    validate(el, user("Haitam", "sch0penheimer"));
    validate(el, user("NotHaitam", "not_sch0penheimer"));
    Ok(())
}

fn unhandled_rejection(el: &EventLoop) -> Result<(), Value> {
    el.console().log("start");
    Promise::rejected(el, Value::from("nobody handles this"));
    el.schedule_timer(0, |el| {
        el.console().log("timer");
        Ok(())
    });
    Ok(())
}
