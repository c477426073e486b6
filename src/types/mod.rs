//! MAPI data type decoding and encoding
//!
//! This module converts raw field text from the wire into [`Value`](crate::Value)s
//! and encodes values back into SQL literals for statement parameters.

mod date;
mod literal;
mod registry;
mod text;

pub use date::{
    decode_date, decode_time, decode_timestamp, encode_date, encode_time, encode_timestamp,
};
pub use literal::to_sql_literal;
pub use registry::{Converter, TypeRegistry};
pub use text::{quote, strip, unescape};
