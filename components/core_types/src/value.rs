//! JavaScript value representation.
//!
//! This module provides the `Value` enum that task bodies pass between
//! promises, handlers and the console sink.

use crate::JsError;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// Represents any JavaScript value the simulator carries.
///
/// Numbers keep the engine's split between small integers (`Smi`) and
/// doubles. Objects are plain property lists in insertion order, which is
/// the order the console prints them in.
///
/// # Examples
///
/// ```
/// use core_types::Value;
///
/// let number = Value::Smi(42);
/// let float = Value::Double(3.5);
///
/// assert_eq!(number.as_number(), Some(42.0));
/// assert_eq!(float.to_string(), "3.5");
/// assert_eq!(Value::Undefined.to_string(), "undefined");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// JavaScript undefined value
    Undefined,
    /// JavaScript null value
    Null,
    /// JavaScript boolean (true or false)
    Boolean(bool),
    /// Small integer
    Smi(i32),
    /// IEEE 754 double-precision floating point
    Double(f64),
    /// JavaScript string value
    String(String),
    /// Plain object literal, properties in insertion order
    Object(Vec<(String, Value)>),
    /// Error object
    Error(JsError),
}

impl Value {
    /// Builds a number, using `Smi` when the value is an integer that fits.
    ///
    /// ```
    /// use core_types::Value;
    ///
    /// assert_eq!(Value::number(4.0), Value::Smi(4));
    /// assert_eq!(Value::number(0.5), Value::Double(0.5));
    /// ```
    pub fn number(n: f64) -> Self {
        let in_range = n >= f64::from(i32::MIN) && n <= f64::from(i32::MAX);
        let negative_zero = n == 0.0 && n.is_sign_negative();
        if n.fract() == 0.0 && in_range && !negative_zero {
            Value::Smi(n as i32)
        } else {
            Value::Double(n)
        }
    }

    /// Builds an object literal from `(key, value)` pairs.
    ///
    /// ```
    /// use core_types::Value;
    ///
    /// let user = Value::object([("name", Value::from("Haitam"))]);
    /// assert_eq!(user.get("name"), Some(&Value::from("Haitam")));
    /// ```
    pub fn object<K, I>(props: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Object(props.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Property lookup on objects; `None` for anything else or a missing key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(props) => props.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Numeric view of the value, if it is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Smi(n) => Some(f64::from(*n)),
            Value::Double(n) => Some(*n),
            _ => None,
        }
    }

    /// String view of the value, if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Formats the value the way it appears nested inside another value:
    /// strings are quoted, everything else matches `Display`.
    pub fn inspect(&self) -> String {
        match self {
            Value::String(s) => format!("{:?}", s),
            other => other.to_string(),
        }
    }
}

/// Console-style formatting.
///
/// Top-level strings print raw, object properties print with `inspect`.
///
/// ```
/// use core_types::Value;
///
/// assert_eq!(Value::Smi(42).to_string(), "42");
/// assert_eq!(Value::from("hi").to_string(), "hi");
/// let user = Value::object([("name", Value::from("Haitam"))]);
/// assert_eq!(user.to_string(), r#"{ name: "Haitam" }"#);
/// ```
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Smi(n) => write!(f, "{}", n),
            Value::Double(n) => {
                if n.is_nan() {
                    write!(f, "NaN")
                } else if n.is_infinite() {
                    if n.is_sign_positive() {
                        write!(f, "Infinity")
                    } else {
                        write!(f, "-Infinity")
                    }
                } else if n.fract() == 0.0 && n.abs() < 1e15 {
                    // Integer-valued doubles display without decimal point
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::String(s) => write!(f, "{}", s),
            Value::Object(props) if props.is_empty() => write!(f, "{{}}"),
            Value::Object(props) => {
                write!(f, "{{ ")?;
                for (i, (key, value)) in props.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value.inspect())?;
                }
                write!(f, " }}")
            }
            Value::Error(e) => write!(f, "{}", e),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Undefined | Value::Null => serializer.serialize_none(),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Smi(n) => serializer.serialize_i32(*n),
            Value::Double(n) => serializer.serialize_f64(*n),
            Value::String(s) => serializer.serialize_str(s),
            Value::Object(props) => {
                let mut map = serializer.serialize_map(Some(props.len()))?;
                for (key, value) in props {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Value::Error(e) => e.serialize(serializer),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Smi(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<JsError> for Value {
    fn from(e: JsError) -> Self {
        Value::Error(e)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Undefined
    }
}
