//! Core JavaScript value types and error handling.
//!
//! This crate provides the value model shared by the event loop simulator:
//! the values task bodies pass around, settle promises with, and write to the
//! console sink.
//!
//! # Overview
//!
//! - [`Value`] - Tagged representation of JavaScript values
//! - [`JsError`] - JavaScript error objects (thrown or used as rejection reasons)
//! - [`ErrorKind`] - Types of JavaScript errors
//!
//! # Examples
//!
//! ```
//! use core_types::{ErrorKind, JsError, Value};
//!
//! // Create JavaScript values
//! let num = Value::Smi(42);
//! assert_eq!(num.to_string(), "42");
//! assert_eq!(Value::number(42.0), num);
//!
//! // Create an error
//! let error = JsError::new(ErrorKind::TypeError, "Chaining cycle detected for promise");
//! assert_eq!(error.to_string(), "TypeError: Chaining cycle detected for promise");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod value;

pub use error::{ErrorKind, JsError};
pub use value::Value;
