//! SQL statement handling
//!
//! This module provides the result set metadata published by the decoder and
//! the parameter substitution `execute` performs before sending a statement.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::row::Value;
use crate::types::to_sql_literal;

/// Metadata for a result column
///
/// The server reports names, type tags and type sizes through header lines.
/// Fields the protocol does not carry are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescription {
    /// Column name
    pub name: String,
    /// Wire type tag
    pub type_code: String,
    /// Display size
    pub display_size: Option<usize>,
    /// Internal size (first `typesizes` integer)
    pub internal_size: Option<usize>,
    /// Precision (decimal columns only)
    pub precision: Option<u32>,
    /// Scale (decimal columns only)
    pub scale: Option<u32>,
    /// Whether NULL values are allowed
    pub null_ok: Option<bool>,
}

impl ColumnDescription {
    /// Create a new column with minimal info
    pub fn new(name: impl Into<String>, type_code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_code: type_code.into(),
            display_size: None,
            internal_size: None,
            precision: None,
            scale: None,
            null_ok: None,
        }
    }
}

/// Parameters bound into a statement by `execute`
///
/// Statements use `%s` for positional and `%(name)s` for named placeholders;
/// `%%` stands for a literal percent sign.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Params {
    /// No parameters; the statement is sent as written
    #[default]
    None,
    /// Values for `%s` placeholders, in order
    Positional(Vec<Value>),
    /// Values for `%(name)s` placeholders
    Named(HashMap<String, Value>),
    /// A single value for a single `%s` placeholder
    Scalar(Value),
}

impl Params {
    /// Build named parameters from `(name, value)` pairs
    pub fn named<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Params::Named(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Check if there are no parameters to bind
    pub fn is_empty(&self) -> bool {
        matches!(self, Params::None)
    }
}

impl From<Vec<Value>> for Params {
    fn from(values: Vec<Value>) -> Self {
        Params::Positional(values)
    }
}

impl From<HashMap<String, Value>> for Params {
    fn from(values: HashMap<String, Value>) -> Self {
        Params::Named(values)
    }
}

impl From<Value> for Params {
    fn from(value: Value) -> Self {
        Params::Scalar(value)
    }
}

/// Substitute parameters into an operation, producing the statement text
pub fn substitute(operation: &str, params: &Params) -> Result<String> {
    if params.is_empty() {
        return Ok(operation.to_string());
    }
    let positional: &[Value] = match params {
        Params::Positional(values) => values,
        Params::Scalar(value) => std::slice::from_ref(value),
        Params::None | Params::Named(_) => &[],
    };

    let mut out = String::with_capacity(operation.len());
    let mut next = 0usize;
    let mut rest = operation;

    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(tail) = after.strip_prefix('%') {
            out.push('%');
            rest = tail;
        } else if let Some(tail) = after.strip_prefix('s') {
            if matches!(params, Params::Named(_)) {
                return Err(Error::InvalidParameter(
                    "positional placeholder with named parameters".to_string(),
                ));
            }
            let value = positional.get(next).ok_or_else(|| {
                Error::InvalidParameter(format!(
                    "not enough parameters: {} given",
                    positional.len()
                ))
            })?;
            out.push_str(&to_sql_literal(value)?);
            next += 1;
            rest = tail;
        } else if let Some(named) = after.strip_prefix('(') {
            let Params::Named(values) = params else {
                return Err(Error::InvalidParameter(
                    "named placeholder requires named parameters".to_string(),
                ));
            };
            let (name, tail) = named
                .split_once(")s")
                .ok_or_else(|| Error::InvalidParameter("unterminated named placeholder".to_string()))?;
            let value = values
                .get(name)
                .ok_or_else(|| Error::InvalidParameter(format!("missing parameter {:?}", name)))?;
            out.push_str(&to_sql_literal(value)?);
            rest = tail;
        } else {
            out.push('%');
            rest = after;
        }
    }
    out.push_str(rest);

    if next < positional.len() {
        return Err(Error::InvalidParameter(format!(
            "not all parameters converted: {} given, {} used",
            positional.len(),
            next
        )));
    }
    Ok(out)
}

/// Terminate a statement the way the server expects (`;` plus newline)
pub fn terminate(query: &str) -> String {
    let trimmed = query.trim_end();
    if trimmed.ends_with(';') {
        format!("{}\n", trimmed)
    } else {
        format!("{};\n", trimmed)
    }
}

/// Check whether an operation is a comment that is never sent
pub fn is_comment(operation: &str) -> bool {
    operation.starts_with('#')
}
