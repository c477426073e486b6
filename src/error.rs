//! Error types for the MAPI cursor
//!
//! This module defines every error a cursor operation can raise, from
//! malformed response blocks to misuse of the cursor API.

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the MAPI cursor
#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum Error {
    // =========================================================================
    // Cursor State Errors
    // =========================================================================
    /// Cursor is closed
    #[error("cursor is closed")]
    CursorClosed,

    /// Fetch or scroll before any execute
    #[error("do an execute() first")]
    NotExecuted,

    /// Fetch on an operation that did not produce rows
    #[error("query didn't result in a resultset")]
    NoResultSet,

    /// Scroll destination beyond the result set
    #[error("value beyond length of resultset: position {position}, row count {row_count}")]
    OutOfRange { position: i64, row_count: i64 },

    /// Execute parameters of unsupported shape
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    // =========================================================================
    // Protocol Errors
    // =========================================================================
    /// Decoded tuple field count does not match the column count
    #[error("length of row doesn't match header: expected {expected} fields, got {actual}")]
    RowShapeMismatch { expected: usize, actual: usize },

    /// Response block or connection in an unexpected state
    #[error("protocol error: {0}")]
    ProtocolState(String),

    /// Error line sent by the server
    #[error("server error: {message}")]
    Server { message: String },

    // =========================================================================
    // Data Type Errors
    // =========================================================================
    /// Unknown wire type tag
    #[error("type {0} is not supported")]
    UnsupportedType(String),

    /// Raw field could not be converted for its type
    #[error("data conversion error: {0}")]
    DataConversion(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// Failure reported by the transport collaborator
    #[error("transport error: {0}")]
    Transport(String),
}

impl Error {
    /// Create a new server error
    pub fn server(message: impl Into<String>) -> Self {
        Error::Server {
            message: message.into(),
        }
    }

    /// Create a new protocol state error
    pub fn protocol(message: impl Into<String>) -> Self {
        Error::ProtocolState(message.into())
    }

    /// SQLSTATE code of a server error, when the message carries one
    ///
    /// Server messages have the form `42S02!table not found`.
    pub fn sqlstate(&self) -> Option<&str> {
        match self {
            Error::Server { message } => {
                let (code, _) = message.split_once('!')?;
                (code.len() == 5 && code.chars().all(|c| c.is_ascii_alphanumeric()))
                    .then_some(code)
            }
            _ => None,
        }
    }

    /// Check if this error came from the server
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Server { .. })
    }

    /// Check if this error is caused by misuse of the cursor API
    pub fn is_programming_error(&self) -> bool {
        matches!(
            self,
            Error::CursorClosed
                | Error::NotExecuted
                | Error::NoResultSet
                | Error::InvalidParameter(_)
                | Error::UnsupportedType(_)
        )
    }
}
