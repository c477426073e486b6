//! MAPI protocol messages
//!
//! This module contains the response line grammar, the block decoder and the
//! page request message.

mod decoder;
mod export;
mod line;

pub use decoder::{ColumnBuilder, ResultDecoder};
pub use export::ExportMessage;
pub use line::{split_fields, Line, TableHeader};
