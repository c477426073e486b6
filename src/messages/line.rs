//! Response line classification
//!
//! Every line of a response block starts with a marker naming its kind.
//! [`Line::classify`] maps a line to its variant and parses the fields the
//! variant carries. It holds no state; applying a line to a result is the
//! job of the [`ResultDecoder`](super::ResultDecoder).

use crate::constants::{marker, FIELD_SEPARATOR, IDENTITY_SEPARATOR};
use crate::error::{Error, Result};

/// Fields of a query-table header (`&1 id rowcount columns tuples`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableHeader {
    /// Server-side query identifier, used for `Xexport`
    pub query_id: i64,
    /// Total number of rows in the result
    pub row_count: i64,
    /// Number of columns
    pub column_count: usize,
    /// Number of rows that follow in this block
    pub rows_in_block: usize,
}

/// One classified response line
#[derive(Debug, Clone, PartialEq)]
pub enum Line<'a> {
    /// Start of a new result set
    TableHeader(TableHeader),
    /// Comment or informational line, ignored
    Comment(&'a str),
    /// Header field line: per-column values plus the field identity
    Field {
        /// One value per column
        values: Vec<&'a str>,
        /// Identity such as `name` or `type`
        identity: &'a str,
    },
    /// Row of raw fields
    Tuple(Vec<&'a str>),
    /// Single raw value, not split into fields
    TupleNoSlice(&'a str),
    /// Next page of the current result follows
    Block,
    /// Schema (DDL) statement acknowledged
    Schema,
    /// Update statement result
    Update {
        /// Number of affected rows
        affected: i64,
        /// Generated identifier, if the server reported one
        last_id: Option<i64>,
    },
    /// Transaction statement acknowledged
    Transaction,
    /// End of the response
    Prompt,
    /// Error reported by the server
    Error(&'a str),
    /// Unstructured reply, treated as a single value.
    ///
    /// Lowest precedence: any line no other marker claims lands here, so a
    /// malformed structured line is silently accepted as data.
    Fallback(&'a str),
}

impl<'a> Line<'a> {
    /// Classify a line by its leading marker
    pub fn classify(line: &'a str) -> Result<Self> {
        if line.starts_with(marker::QTABLE) || line.starts_with(marker::QPREPARE) {
            return parse_table_header(&line[2..]).map(Line::TableHeader);
        }
        if let Some(rest) = line.strip_prefix(marker::COMMENT) {
            return Ok(Line::Comment(rest));
        }
        if let Some(rest) = line.strip_prefix(marker::INFO_FIELD) {
            return parse_field(rest);
        }
        if let Some(rest) = line.strip_prefix(marker::INFO) {
            return Ok(Line::Comment(rest));
        }
        if let Some(rest) = line.strip_prefix(marker::HEADER_FIELD) {
            return parse_field(rest);
        }
        if let Some(rest) = line.strip_prefix(marker::TUPLE) {
            return Ok(Line::Tuple(split_fields(rest.strip_suffix(']').unwrap_or(rest))));
        }
        if let Some(rest) = line.strip_prefix(marker::TUPLE_PAREN) {
            return Ok(Line::Tuple(split_fields(rest.strip_suffix(')').unwrap_or(rest))));
        }
        if let Some(rest) = line.strip_prefix(marker::TUPLE_NOSLICE) {
            return Ok(Line::TupleNoSlice(rest));
        }
        if line.starts_with(marker::QBLOCK) {
            return Ok(Line::Block);
        }
        if line.starts_with(marker::QSCHEMA) {
            return Ok(Line::Schema);
        }
        if let Some(rest) = line.strip_prefix(marker::QUPDATE) {
            return parse_update(rest);
        }
        if line.starts_with(marker::QTRANS) {
            return Ok(Line::Transaction);
        }
        if line == marker::PROMPT {
            return Ok(Line::Prompt);
        }
        if let Some(rest) = line.strip_prefix(marker::ERROR) {
            return Ok(Line::Error(rest));
        }
        Ok(Line::Fallback(line))
    }

    /// Short name of the line kind, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Line::TableHeader(_) => "table_header",
            Line::Comment(_) => "comment",
            Line::Field { .. } => "field",
            Line::Tuple(_) => "tuple",
            Line::TupleNoSlice(_) => "tuple_noslice",
            Line::Block => "block",
            Line::Schema => "schema",
            Line::Update { .. } => "update",
            Line::Transaction => "transaction",
            Line::Prompt => "prompt",
            Line::Error(_) => "error",
            Line::Fallback(_) => "fallback",
        }
    }
}

fn parse_number<T: std::str::FromStr>(field: Option<&str>, what: &str, line: &str) -> Result<T> {
    field
        .and_then(|f| f.parse().ok())
        .ok_or_else(|| Error::protocol(format!("invalid {} in header {:?}", what, line)))
}

fn parse_table_header(rest: &str) -> Result<TableHeader> {
    let mut fields = rest.split_whitespace();
    Ok(TableHeader {
        query_id: parse_number(fields.next(), "query id", rest)?,
        row_count: parse_number(fields.next(), "row count", rest)?,
        column_count: parse_number(fields.next(), "column count", rest)?,
        rows_in_block: parse_number(fields.next(), "tuple count", rest)?,
    })
}

fn parse_update(rest: &str) -> Result<Line<'_>> {
    let mut fields = rest.split_whitespace();
    let affected = parse_number(fields.next(), "affected row count", rest)?;
    let last_id: i64 = parse_number(fields.next(), "last id", rest)?;
    Ok(Line::Update {
        affected,
        last_id: (last_id >= 0).then_some(last_id),
    })
}

fn parse_field(rest: &str) -> Result<Line<'_>> {
    let (data, identity) = rest
        .rsplit_once(IDENTITY_SEPARATOR)
        .ok_or_else(|| Error::protocol(format!("header line without identity: {:?}", rest)))?;
    let values = data
        .split('\t')
        .map(|v| v.trim().trim_end_matches(',').trim_end())
        .collect();
    Ok(Line::Field {
        values,
        identity: identity.trim(),
    })
}

/// Split the body of a tuple line on `,\t`, ignoring separators inside
/// double-quoted strings. Fields are trimmed.
pub fn split_fields(body: &str) -> Vec<&str> {
    let bytes = body.as_bytes();
    let sep = FIELD_SEPARATOR.as_bytes();
    let mut fields = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' if in_quotes => i += 1,
            b'"' => in_quotes = !in_quotes,
            _ if !in_quotes && bytes[i..].starts_with(sep) => {
                fields.push(body[start..i].trim());
                i += sep.len();
                start = i;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    fields.push(body[start..].trim());
    fields
}
