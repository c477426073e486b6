//! Wire type tag to value conversion
//!
//! Every result column carries a type tag (`int`, `str`, `timestamp`, ...).
//! The [`TypeRegistry`] maps each tag to a converter that turns the raw field
//! text into a [`Value`].

use std::collections::HashMap;
use std::fmt;

use uuid::Uuid;

use super::date::{decode_date, decode_time, decode_timestamp};
use super::text::strip;
use crate::constants::{type_tag, NULL_TOKENS, OID_SUFFIX};
use crate::error::{Error, Result};
use crate::row::Value;

/// Function converting a raw field into a value
pub type Converter = fn(&str) -> Result<Value>;

/// Registry of converters keyed by wire type tag.
///
/// The default registry knows the tags of the exchange protocol plus the SQL
/// type names servers commonly emit. Custom tags can be added with
/// [`register`](TypeRegistry::register).
///
/// # Example
///
/// ```rust
/// use mapi_cursor::types::TypeRegistry;
/// use mapi_cursor::Value;
///
/// let registry = TypeRegistry::default();
/// assert_eq!(registry.convert("int", "42").unwrap(), Value::Integer(42));
/// assert_eq!(registry.convert("str", "NULL").unwrap(), Value::Null);
/// assert!(registry.convert("blob", "00").is_err());
/// ```
#[derive(Clone)]
pub struct TypeRegistry {
    converters: HashMap<String, Converter>,
}

impl TypeRegistry {
    /// Create a registry without any converters
    pub fn empty() -> Self {
        Self {
            converters: HashMap::new(),
        }
    }

    /// Register (or replace) the converter of a type tag
    pub fn register(&mut self, tag: impl Into<String>, converter: Converter) -> &mut Self {
        self.converters.insert(tag.into(), converter);
        self
    }

    /// Check whether a tag has a converter
    pub fn supports(&self, tag: &str) -> bool {
        self.converters.contains_key(tag)
    }

    /// Convert a raw field of the given type.
    ///
    /// NULL tokens yield [`Value::Null`] before the tag is looked up.
    pub fn convert(&self, tag: &str, data: &str) -> Result<Value> {
        if NULL_TOKENS.contains(&data) {
            return Ok(Value::Null);
        }
        let converter = self
            .converters
            .get(tag)
            .ok_or_else(|| Error::UnsupportedType(tag.to_string()))?;
        converter(data)
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register(type_tag::NONE, decode_raw_field)
            .register(type_tag::VOID, decode_str_field)
            .register(type_tag::STR, decode_str_field)
            .register(type_tag::URL, decode_str_field)
            .register(type_tag::COLOR, decode_str_field)
            .register(type_tag::INT, decode_int_field)
            .register(type_tag::OID, decode_oid_field)
            .register(type_tag::FLT, decode_float_field)
            .register(type_tag::DBL, decode_float_field)
            .register(type_tag::BIT, decode_bool_field)
            .register(type_tag::DATE, decode_date_field)
            .register(type_tag::DAYTIME, decode_time_field)
            .register(type_tag::TIMESTAMP, decode_timestamp_field)
            .register(type_tag::UUID, decode_uuid_field)
            .register(type_tag::JSON, decode_json_field)
            .register(type_tag::DECIMAL, decode_decimal_field);

        // SQL type names
        for tag in ["tinyint", "smallint", "bigint", "hugeint", "serial"] {
            registry.register(tag, decode_int_field);
        }
        for tag in ["real", "double"] {
            registry.register(tag, decode_float_field);
        }
        for tag in ["char", "varchar", "clob"] {
            registry.register(tag, decode_str_field);
        }
        registry.register("boolean", decode_bool_field).register("time", decode_time_field);
        registry
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<&str> = self.converters.keys().map(String::as_str).collect();
        tags.sort_unstable();
        f.debug_struct("TypeRegistry").field("tags", &tags).finish()
    }
}

fn decode_raw_field(data: &str) -> Result<Value> {
    Ok(Value::String(data.to_string()))
}

fn decode_str_field(data: &str) -> Result<Value> {
    Ok(Value::String(strip(data)))
}

fn decode_int_field(data: &str) -> Result<Value> {
    data.parse::<i64>()
        .map(Value::Integer)
        .map_err(|e| Error::DataConversion(format!("invalid integer {:?}: {}", data, e)))
}

fn decode_oid_field(data: &str) -> Result<Value> {
    let digits = data.strip_suffix(OID_SUFFIX).ok_or_else(|| {
        Error::DataConversion(format!("oid {:?} lacks the {} suffix", data, OID_SUFFIX))
    })?;
    decode_int_field(digits)
}

fn decode_float_field(data: &str) -> Result<Value> {
    data.parse::<f64>()
        .map(Value::Float)
        .map_err(|e| Error::DataConversion(format!("invalid float {:?}: {}", data, e)))
}

fn decode_bool_field(data: &str) -> Result<Value> {
    match data {
        "true" => Ok(Value::Boolean(true)),
        "false" => Ok(Value::Boolean(false)),
        _ => Err(Error::DataConversion(format!("invalid boolean {:?}", data))),
    }
}

fn decode_date_field(data: &str) -> Result<Value> {
    decode_date(data).map(Value::Date)
}

fn decode_time_field(data: &str) -> Result<Value> {
    decode_time(data).map(Value::Time)
}

fn decode_timestamp_field(data: &str) -> Result<Value> {
    decode_timestamp(data).map(Value::Timestamp)
}

fn decode_uuid_field(data: &str) -> Result<Value> {
    Uuid::parse_str(&strip(data))
        .map(Value::Uuid)
        .map_err(|e| Error::DataConversion(format!("invalid uuid {:?}: {}", data, e)))
}

fn decode_json_field(data: &str) -> Result<Value> {
    serde_json::from_str(&strip(data))
        .map(Value::Json)
        .map_err(|e| Error::DataConversion(format!("invalid json {:?}: {}", data, e)))
}

fn decode_decimal_field(data: &str) -> Result<Value> {
    decode_float_field(data)?;
    Ok(Value::Decimal(data.to_string()))
}
