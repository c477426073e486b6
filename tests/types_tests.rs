//! Integration tests for type conversion
//!
//! Values encoded as SQL literals must decode back to the same value through
//! the type registry.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use mapi_cursor::types::{to_sql_literal, unescape, TypeRegistry};
use mapi_cursor::{Error, Value};
use uuid::Uuid;

/// The text a server would send back for a literal
fn literal_payload(literal: &str) -> String {
    let body = ["DATE ", "TIME ", "TIMESTAMP "]
        .iter()
        .find_map(|prefix| literal.strip_prefix(*prefix))
        .unwrap_or(literal);
    match body.strip_prefix('\'').and_then(|b| b.strip_suffix('\'')) {
        Some(quoted) => unescape(quoted),
        None => body.to_string(),
    }
}

fn round_trip(tag: &str, value: Value) {
    let registry = TypeRegistry::default();
    let literal = to_sql_literal(&value).unwrap();
    let decoded = registry.convert(tag, &literal_payload(&literal)).unwrap();
    assert_eq!(decoded, value, "tag {} literal {}", tag, literal);
}

mod round_trip_tests {
    use super::*;

    #[test]
    fn test_integers() {
        for n in [0, 1, -1, 42, i64::MAX, i64::MIN] {
            round_trip("int", Value::Integer(n));
            round_trip("bigint", Value::Integer(n));
        }
    }

    #[test]
    fn test_floats() {
        for f in [0.0, 0.1, -2.5, 1e300, f64::MIN_POSITIVE] {
            round_trip("double", Value::Float(f));
        }
    }

    #[test]
    fn test_booleans() {
        round_trip("boolean", Value::Boolean(true));
        round_trip("bit", Value::Boolean(false));
    }

    #[test]
    fn test_temporal() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let time = NaiveTime::from_hms_milli_opt(23, 59, 58, 250).unwrap();
        round_trip("date", Value::Date(date));
        round_trip("time", Value::Time(time));
        round_trip("timestamp", Value::Timestamp(NaiveDateTime::new(date, time)));
    }

    #[test]
    fn test_uuid() {
        let id = Uuid::parse_str("6f1f9c1e-2a3b-4c5d-8e9f-0a1b2c3d4e5f").unwrap();
        round_trip("uuid", Value::Uuid(id));
    }

    #[test]
    fn test_json() {
        let doc = serde_json::json!({"name": "it's", "tags": [1, 2], "nested": {"ok": true}});
        round_trip("json", Value::Json(doc));
    }
}

mod registry_tests {
    use super::*;

    #[test]
    fn test_quoted_strings_are_unescaped() {
        let registry = TypeRegistry::default();
        assert_eq!(
            registry.convert("varchar", "\"say \\\"hi\\\"\\n\"").unwrap(),
            Value::from("say \"hi\"\n")
        );
    }

    #[test]
    fn test_oid_suffix() {
        let registry = TypeRegistry::default();
        assert_eq!(registry.convert("oid", "12@0").unwrap(), Value::Integer(12));
        assert!(matches!(registry.convert("oid", "12"), Err(Error::DataConversion(_))));
    }

    #[test]
    fn test_custom_converter() {
        let mut registry = TypeRegistry::empty();
        registry.register("inet", |raw| Ok(Value::String(format!("inet:{}", raw))));
        assert_eq!(
            registry.convert("inet", "10.0.0.1").unwrap(),
            Value::from("inet:10.0.0.1")
        );
        assert!(matches!(registry.convert("int", "1"), Err(Error::UnsupportedType(_))));
    }
}
