//! Export message for retrieving a page of rows
//!
//! This module implements the `Xexport` command used to retrieve additional
//! rows from an already-executed query that the server still holds.

/// Export message to retrieve rows from a server-side result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportMessage {
    /// Query ID to export from
    query_id: i64,
    /// Position of the first row to send
    offset: usize,
    /// Number of rows to send
    amount: usize,
}

impl ExportMessage {
    /// Create a new export message
    pub fn new(query_id: i64, offset: usize, amount: usize) -> Self {
        Self {
            query_id,
            offset,
            amount,
        }
    }

    /// Build the transport-level command text
    pub fn build_request(&self) -> String {
        format!("Xexport {} {} {}", self.query_id, self.offset, self.amount)
    }

    /// Get the query ID
    pub fn query_id(&self) -> i64 {
        self.query_id
    }

    /// Get the offset of the first requested row
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Get the number of rows requested
    pub fn amount(&self) -> usize {
        self.amount
    }
}
