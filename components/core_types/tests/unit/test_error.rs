//! Unit tests for JsError and ErrorKind

use core_types::{ErrorKind, JsError, Value};

#[cfg(test)]
mod error_kind_tests {
    use super::*;

    #[test]
    fn test_error_kind_display_names() {
        assert_eq!(ErrorKind::Error.to_string(), "Error");
        assert_eq!(ErrorKind::TypeError.to_string(), "TypeError");
    }
}

#[cfg(test)]
mod js_error_tests {
    use super::*;

    #[test]
    fn test_js_error_is_std_error() {
        let error: Box<dyn std::error::Error> = Box::new(JsError::error("boom"));
        assert_eq!(error.to_string(), "Error: boom");
    }

    #[test]
    fn test_js_error_as_value() {
        let value = Value::from(JsError::type_error("Chaining cycle detected for promise"));
        assert!(matches!(&value, Value::Error(e) if e.kind == ErrorKind::TypeError));
        assert_eq!(
            value.to_string(),
            "TypeError: Chaining cycle detected for promise"
        );
    }

    #[test]
    fn test_js_error_serializes_kind_and_message() {
        let json = serde_json::to_value(JsError::type_error("bad")).unwrap();
        assert_eq!(json["kind"], "TypeError");
        assert_eq!(json["message"], "bad");
    }
}
