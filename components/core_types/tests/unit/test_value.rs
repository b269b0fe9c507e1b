//! Unit tests for Value enum

use core_types::Value;

#[cfg(test)]
mod value_creation_tests {
    use super::*;

    #[test]
    fn test_value_from_primitives() {
        assert_eq!(Value::from(true), Value::Boolean(true));
        assert_eq!(Value::from(7), Value::Smi(7));
        assert_eq!(Value::from("x"), Value::String("x".to_string()));
        assert_eq!(Value::from(()), Value::Undefined);
    }

    #[test]
    fn test_value_from_f64_prefers_smi() {
        assert_eq!(Value::from(8.0), Value::Smi(8));
        assert_eq!(Value::from(2.5), Value::Double(2.5));
        assert!(matches!(Value::from(1e12), Value::Double(_)));
    }

    #[test]
    fn test_object_preserves_insertion_order() {
        let user = Value::object([
            ("username", Value::from("sch0penheimer")),
            ("name", Value::from("Haitam")),
        ]);
        match &user {
            Value::Object(props) => {
                assert_eq!(props[0].0, "username");
                assert_eq!(props[1].0, "name");
            }
            other => panic!("expected object, got {:?}", other),
        }
    }
}

#[cfg(test)]
mod value_access_tests {
    use super::*;

    #[test]
    fn test_get_on_object() {
        let user = Value::object([("name", Value::from("Haitam"))]);
        assert_eq!(user.get("name").and_then(Value::as_str), Some("Haitam"));
        assert_eq!(user.get("missing"), None);
    }

    #[test]
    fn test_get_on_non_object() {
        assert_eq!(Value::Smi(1).get("name"), None);
    }

    #[test]
    fn test_as_number() {
        assert_eq!(Value::Smi(2).as_number(), Some(2.0));
        assert_eq!(Value::Double(0.5).as_number(), Some(0.5));
        assert_eq!(Value::from("2").as_number(), None);
    }
}

#[cfg(test)]
mod value_display_tests {
    use super::*;

    #[test]
    fn test_display_numbers() {
        assert_eq!(Value::Smi(-3).to_string(), "-3");
        assert_eq!(Value::Double(4.0).to_string(), "4");
        assert_eq!(Value::Double(1.5).to_string(), "1.5");
        assert_eq!(Value::Double(f64::NAN).to_string(), "NaN");
        assert_eq!(Value::Double(f64::NEG_INFINITY).to_string(), "-Infinity");
    }

    #[test]
    fn test_display_object_like_console() {
        let user = Value::object([
            ("name", Value::from("NotHaitam")),
            ("username", Value::from("not_sch0penheimer")),
        ]);
        assert_eq!(
            user.to_string(),
            r#"{ name: "NotHaitam", username: "not_sch0penheimer" }"#
        );
    }

    #[test]
    fn test_display_empty_object() {
        assert_eq!(Value::Object(vec![]).to_string(), "{}");
    }

    #[test]
    fn test_display_special_numbers() {
        assert_eq!(Value::Double(f64::NAN).to_string(), "NaN");
        assert_eq!(Value::Double(f64::NEG_INFINITY).to_string(), "-Infinity");
        assert_eq!(Value::Double(0.5).to_string(), "0.5");
    }
}

#[cfg(test)]
mod value_serialize_tests {
    use super::*;

    #[test]
    fn test_serialize_object_as_json_map() {
        let user = Value::object([("name", Value::from("Haitam")), ("age", Value::Smi(3))]);
        let json = serde_json::to_string(&user).unwrap();
        assert_eq!(json, r#"{"name":"Haitam","age":3}"#);
    }

    #[test]
    fn test_serialize_undefined_as_null() {
        assert_eq!(serde_json::to_string(&Value::Undefined).unwrap(), "null");
    }
}
