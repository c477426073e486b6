//! Value to SQL literal encoding
//!
//! Parameters passed to `execute` are substituted into the statement text as
//! SQL literals. This is the inverse of the type registry: a value decoded
//! from a field and encoded again denotes the same value to the server.

use super::date::{encode_date, encode_time, encode_timestamp};
use super::text::quote;
use crate::error::{Error, Result};
use crate::row::Value;

/// Encode a value as a SQL literal
pub fn to_sql_literal(value: &Value) -> Result<String> {
    let literal = match value {
        Value::Null => "NULL".to_string(),
        Value::String(s) => quote(s),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) if f.is_finite() => format!("{:?}", f),
        Value::Float(f) => {
            return Err(Error::InvalidParameter(format!(
                "float {} has no SQL literal",
                f
            )))
        }
        Value::Boolean(b) => b.to_string(),
        Value::Decimal(d) => d.clone(),
        Value::Date(d) => encode_date(d),
        Value::Time(t) => encode_time(t),
        Value::Timestamp(ts) => encode_timestamp(ts),
        Value::Uuid(u) => quote(&u.to_string()),
        Value::Json(json) => quote(&json.to_string()),
    };
    Ok(literal)
}
