//! DATE, DAYTIME and TIMESTAMP decoding and encoding
//!
//! The server sends temporal values as text:
//! - `date`: `2024-01-31`
//! - `daytime`: `13:45:00` or `13:45:00.250000`
//! - `timestamp`: `2024-01-31 13:45:00.250000` (fraction optional)
//!
//! Encoding produces the typed SQL literal accepted in statements, e.g.
//! `TIMESTAMP '2024-01-31 13:45:00.250000'`.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::constants::datetime_format;
use crate::error::{Error, Result};

/// Decode a `date` field
pub fn decode_date(data: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(data, datetime_format::DATE)
        .map_err(|e| Error::DataConversion(format!("invalid date {:?}: {}", data, e)))
}

/// Decode a `daytime` field
pub fn decode_time(data: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(data, datetime_format::TIME)
        .map_err(|e| Error::DataConversion(format!("invalid time {:?}: {}", data, e)))
}

/// Decode a `timestamp` field
pub fn decode_timestamp(data: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(data, datetime_format::TIMESTAMP)
        .map_err(|e| Error::DataConversion(format!("invalid timestamp {:?}: {}", data, e)))
}

/// Encode a date as a SQL literal
pub fn encode_date(date: &NaiveDate) -> String {
    format!("DATE '{}'", date.format(datetime_format::DATE))
}

/// Encode a time of day as a SQL literal
pub fn encode_time(time: &NaiveTime) -> String {
    format!("TIME '{}'", time.format(datetime_format::TIME))
}

/// Encode a timestamp as a SQL literal
pub fn encode_timestamp(ts: &NaiveDateTime) -> String {
    format!("TIMESTAMP '{}'", ts.format(datetime_format::TIMESTAMP))
}
