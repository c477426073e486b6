//! Result cursor
//!
//! A [`Cursor`] executes statements on a [`Connection`] and serves the rows of
//! the result. Only one page of rows is buffered at a time; fetching past the
//! buffered page transparently requests the next one from the server.
//!
//! # Example
//!
//! ```rust
//! use mapi_cursor::transport::MemoryTransport;
//! use mapi_cursor::{Config, Connection, ScrollMode, Value};
//!
//! # fn main() -> mapi_cursor::Result<()> {
//! let transport = MemoryTransport::new();
//! transport.push_reply("&1 0 3 1 3\n% n # name\n% int # type\n[ 1 ]\n[ 2 ]\n[ 3 ]\n");
//!
//! let conn = Connection::new(transport.clone(), Config::new());
//! let mut cursor = conn.cursor();
//! cursor.execute("SELECT n FROM t WHERE n < %s", vec![Value::from(4)])?;
//!
//! let first = cursor.fetch_one()?.unwrap();
//! assert_eq!(first.get_i64(0), Some(1));
//!
//! let rest = cursor.fetch_all()?;
//! assert_eq!(rest.len(), 2);
//!
//! // back to the start; the page is requested again
//! transport.push_reply("&6 0 1 3 3\n[ 1 ]\n[ 2 ]\n[ 3 ]\n");
//! cursor.scroll(0, ScrollMode::Absolute)?;
//! assert_eq!(cursor.fetch_all()?.len(), 3);
//! # Ok(())
//! # }
//! ```

use std::fmt;

use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::row::Row;
use crate::statement::{is_comment, substitute, terminate, ColumnDescription, Params};
use crate::window::{Pager, QueryId, ResultWindow};

/// Severity of a cursor message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    /// Something was ignored while decoding
    Warning,
    /// An operation failed
    Error,
}

/// Entry of the cursor message log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Severity
    pub level: MessageLevel,
    /// Message text
    pub text: String,
}

impl Message {
    /// Create a warning
    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            text: text.into(),
        }
    }

    /// Create an error entry. Server errors keep the text the server sent.
    pub fn error(error: &Error) -> Self {
        let text = match error {
            Error::Server { message } => message.clone(),
            other => other.to_string(),
        };
        Self {
            level: MessageLevel::Error,
            text,
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            MessageLevel::Warning => write!(f, "warning: {}", self.text),
            MessageLevel::Error => write!(f, "error: {}", self.text),
        }
    }
}

/// How `scroll` interprets its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollMode {
    /// Move relative to current position (default)
    #[default]
    Relative,
    /// Move to absolute position
    Absolute,
}

/// A cursor over the results of one connection
pub struct Cursor {
    connection: Option<Connection>,
    operation: String,
    /// Absolute index of the next row to fetch
    position: usize,
    window: ResultWindow,
    messages: Vec<Message>,
    executed: bool,
    arraysize: usize,
    /// Summed count of the last `execute_many`
    rowcount: Option<i64>,
}

impl Cursor {
    pub(crate) fn new(connection: Connection) -> Self {
        let arraysize = connection.config().arraysize;
        Self {
            connection: Some(connection),
            operation: String::new(),
            position: 0,
            window: ResultWindow::new(),
            messages: Vec::new(),
            executed: false,
            arraysize,
            rowcount: None,
        }
    }

    // =========================================================================
    // Execution
    // =========================================================================

    /// Execute a statement and return its row count.
    ///
    /// The count is the number of rows selected or affected, or -1 when the
    /// statement reports neither. Operations starting with `#` are comments:
    /// nothing is sent and 0 is returned.
    pub fn execute(&mut self, operation: &str, params: impl Into<Params>) -> Result<i64> {
        if self.connection.is_none() {
            return self.record(Err(Error::CursorClosed));
        }
        self.messages.clear();
        let result = self.run(operation, &params.into());
        self.record(result)
    }

    /// Execute a statement once per parameter set.
    ///
    /// Returns the summed count of affected rows, which also becomes the
    /// cursor's `rowcount`.
    pub fn execute_many<I, P>(&mut self, operation: &str, param_sets: I) -> Result<i64>
    where
        I: IntoIterator<Item = P>,
        P: Into<Params>,
    {
        if self.connection.is_none() {
            return self.record(Err(Error::CursorClosed));
        }
        let mut total = 0;
        for params in param_sets {
            let count = self.execute(operation, params)?;
            if count > 0 {
                total += count;
            }
        }
        self.rowcount = Some(total);
        tracing::debug!(operation = operation, affected = total, "executemany finished");
        Ok(total)
    }

    fn run(&mut self, operation: &str, params: &Params) -> Result<i64> {
        self.window.reset();
        self.position = 0;
        self.executed = false;
        self.rowcount = None;
        self.operation = operation.to_string();

        let query = substitute(operation, params)?;
        if is_comment(&query) {
            tracing::trace!("comment operation, nothing sent");
            self.executed = true;
            return Ok(0);
        }
        let statement = terminate(&query);

        let connection = self.connection.as_ref().ok_or(Error::CursorClosed)?;
        let block = connection.cmd(&statement)?;
        let mut pager = Pager {
            connection,
            arraysize: self.arraysize,
            messages: &mut self.messages,
        };
        if let Err(e) = self.window.load(&block, &mut pager) {
            self.window.reset();
            return Err(e);
        }

        self.executed = true;
        tracing::debug!(
            query = ?self.window.query(),
            row_count = self.window.row_count(),
            buffered = self.window.rows().len(),
            "statement executed"
        );
        Ok(self.window.row_count())
    }

    // =========================================================================
    // Fetching
    // =========================================================================

    /// Fetch the next row, or `None` at the end of the result
    pub fn fetch_one(&mut self) -> Result<Option<Row>> {
        let result = self.fetch_one_inner();
        self.record(result)
    }

    fn fetch_one_inner(&mut self) -> Result<Option<Row>> {
        self.check_result_set()?;
        if self.position >= self.window.total() || !self.buffer(self.position)? {
            return Ok(None);
        }
        let row = self.window.row_at(self.position).cloned();
        if row.is_some() {
            self.position += 1;
        }
        Ok(row)
    }

    /// Fetch up to `size` rows (`None` means the cursor's arraysize).
    ///
    /// Fewer rows are returned only at the end of the result.
    pub fn fetch_many(&mut self, size: Option<usize>) -> Result<Vec<Row>> {
        let limit = size.unwrap_or(self.arraysize);
        let result = self.check_result_set().and_then(|_| self.take(limit));
        self.record(result)
    }

    /// Fetch all remaining rows
    pub fn fetch_all(&mut self) -> Result<Vec<Row>> {
        let result = self.check_result_set().and_then(|_| self.take(usize::MAX));
        self.record(result)
    }

    /// Iterate over the remaining rows.
    ///
    /// The iterator stops after yielding the first error.
    pub fn rows(&mut self) -> Rows<'_> {
        Rows {
            cursor: self,
            done: false,
        }
    }

    fn take(&mut self, limit: usize) -> Result<Vec<Row>> {
        let mut rows = Vec::new();
        while rows.len() < limit && self.position < self.window.total() {
            if !self.buffer(self.position)? {
                break;
            }
            let wanted = (limit - rows.len()).min(self.window.total() - self.position);
            let stop = self.window.end().min(self.position + wanted);
            let chunk = self.window.slice(self.position, stop);
            let taken = chunk.len();
            rows.extend_from_slice(chunk);
            self.position += taken;
        }
        Ok(rows)
    }

    /// Make sure `position` is buffered, requesting rows when needed.
    ///
    /// Returns `false` when no rows exist at that position.
    fn buffer(&mut self, position: usize) -> Result<bool> {
        if self.window.contains(position) {
            return Ok(true);
        }
        let result = {
            let (window, mut pager) = self.split()?;
            if position == window.end() {
                window.next_page(position, &mut pager)
            } else if window.query().is_server() {
                window.scroll_to(position as i64, &mut pager).map(|_| true)
            } else {
                Ok(false)
            }
        };
        let result = self.invalidate(result)?;
        Ok(result && self.window.contains(position))
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Skip the rest of the buffered page and load the next one.
    ///
    /// Returns whether another page existed. When it did, the cursor is
    /// positioned at its first row; otherwise at the end of the result.
    pub fn next_set(&mut self) -> Result<bool> {
        let result = self.next_set_inner();
        self.record(result)
    }

    fn next_set_inner(&mut self) -> Result<bool> {
        self.check_result_set()?;
        let position = self.position;
        let result = {
            let (window, mut pager) = self.split()?;
            window.next_page(position, &mut pager)
        };
        let advanced = self.invalidate(result)?;
        self.position = if advanced {
            self.window.offset()
        } else {
            self.window.total()
        };
        Ok(advanced)
    }

    /// Move the cursor and re-fetch the rows at the destination.
    ///
    /// The destination may be the end of the result but not beyond it.
    pub fn scroll(&mut self, value: i64, mode: ScrollMode) -> Result<()> {
        let result = self.scroll_inner(value, mode);
        self.record(result)
    }

    fn scroll_inner(&mut self, value: i64, mode: ScrollMode) -> Result<()> {
        self.check_result_set()?;
        let target = match mode {
            ScrollMode::Relative => (self.position as i64).saturating_add(value),
            ScrollMode::Absolute => value,
        };
        let result = {
            let (window, mut pager) = self.split()?;
            window.scroll_to(target, &mut pager)
        };
        self.invalidate(result)?;
        tracing::trace!(position = target, "cursor scrolled");
        self.position = target as usize;
        Ok(())
    }

    /// Close the cursor. Every later operation fails with `CursorClosed`.
    pub fn close(&mut self) -> Result<()> {
        match self.connection.take() {
            Some(_) => {
                self.window.reset();
                self.executed = false;
                self.rowcount = None;
                Ok(())
            }
            None => self.record(Err(Error::CursorClosed)),
        }
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    /// Rows selected or affected by the last operation, -1 if not applicable
    pub fn rowcount(&self) -> i64 {
        self.rowcount.unwrap_or_else(|| self.window.row_count())
    }

    /// Column descriptions of the current result
    pub fn description(&self) -> Option<&[ColumnDescription]> {
        self.window.description()
    }

    /// Identifier generated by the last insert
    pub fn lastrowid(&self) -> Option<i64> {
        self.window.last_row_id()
    }

    /// Warnings and errors since the last execute
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Empty the message log
    pub fn clear_messages(&mut self) {
        self.messages.clear();
    }

    /// Index of the next row to fetch, if there is a result set
    pub fn rownumber(&self) -> Option<usize> {
        (self.executed && self.window.query().is_result_set()).then_some(self.position)
    }

    /// Rows per page for `fetch_many` and server page requests
    pub fn arraysize(&self) -> usize {
        self.arraysize
    }

    /// Set the page size (at least one row)
    pub fn set_arraysize(&mut self, arraysize: usize) {
        self.arraysize = arraysize.max(1);
    }

    /// Text of the last executed operation
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// The buffered window of the current result
    pub fn window(&self) -> &ResultWindow {
        &self.window
    }

    /// Check if the cursor is closed
    pub fn is_closed(&self) -> bool {
        self.connection.is_none()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn check_result_set(&self) -> Result<()> {
        if self.connection.is_none() {
            return Err(Error::CursorClosed);
        }
        if !self.executed {
            return Err(Error::NotExecuted);
        }
        if self.window.query() == QueryId::None {
            return Err(Error::NoResultSet);
        }
        Ok(())
    }

    fn split(&mut self) -> Result<(&mut ResultWindow, Pager<'_>)> {
        let connection = self.connection.as_ref().ok_or(Error::CursorClosed)?;
        Ok((
            &mut self.window,
            Pager {
                connection,
                arraysize: self.arraysize,
                messages: &mut self.messages,
            },
        ))
    }

    /// A failed page request leaves no usable result behind
    fn invalidate<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            if !matches!(e, Error::OutOfRange { .. }) {
                self.window.reset();
            }
        }
        result
    }

    fn record<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            tracing::debug!(error = %e, "cursor operation failed");
            self.messages.push(Message::error(e));
        }
        result
    }
}

impl fmt::Debug for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("operation", &self.operation)
            .field("position", &self.position)
            .field("query", &self.window.query())
            .field("row_count", &self.window.row_count())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Iterator over the remaining rows of a cursor
pub struct Rows<'a> {
    cursor: &'a mut Cursor,
    done: bool,
}

impl Iterator for Rows<'_> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.cursor.fetch_one() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::row::Value;
    use crate::transport::{MemoryTransport, Request};

    const TWO_ROWS: &str = "&1 1 2 2 2\n% t,\tt # table_name\n% id,\tname # name\n% int,\tvarchar # type\n[ 1,\t\"a\"\t]\n[ 2,\t\"b\"\t]\n";

    fn cursor_with(replies: &[&str]) -> (Cursor, MemoryTransport) {
        let transport = MemoryTransport::new();
        for reply in replies {
            transport.push_reply(*reply);
        }
        let conn = Connection::new(transport.clone(), Config::new());
        (conn.cursor(), transport)
    }

    #[test]
    fn test_execute_select() {
        let (mut cursor, transport) = cursor_with(&[TWO_ROWS]);
        assert_eq!(cursor.execute("SELECT id, name FROM t", Params::None).unwrap(), 2);
        assert_eq!(cursor.rownumber(), Some(0));
        assert_eq!(cursor.description().unwrap()[1].name, "name");
        assert_eq!(
            transport.requests(),
            vec![Request::Query("SELECT id, name FROM t;\n".into())]
        );

        let row = cursor.fetch_one().unwrap().unwrap();
        assert_eq!(row.values(), &[Value::Integer(1), Value::from("a")]);
        assert_eq!(cursor.fetch_all().unwrap().len(), 1);
        assert!(cursor.fetch_one().unwrap().is_none());
        assert!(cursor.fetch_all().unwrap().is_empty());
    }

    #[test]
    fn test_execute_substitutes_parameters() {
        let (mut cursor, transport) = cursor_with(&["&2 1 -1\n"]);
        cursor
            .execute("INSERT INTO t VALUES (%s, %s);", vec![Value::from(1), Value::from("it's")])
            .unwrap();
        assert_eq!(
            transport.requests()[0].text(),
            "INSERT INTO t VALUES (1, 'it\\'s');\n"
        );
        assert_eq!(cursor.operation(), "INSERT INTO t VALUES (%s, %s);");
    }

    #[test]
    fn test_update_result() {
        let (mut cursor, _) = cursor_with(&["&2 5 7\n"]);
        assert_eq!(cursor.execute("UPDATE t SET x = 1", Params::None).unwrap(), 5);
        assert_eq!(cursor.lastrowid(), Some(7));
        assert!(cursor.description().is_none());
        assert_eq!(cursor.rownumber(), None);
        assert!(matches!(cursor.fetch_one(), Err(Error::NoResultSet)));
    }

    #[test]
    fn test_comment_sends_nothing() {
        let (mut cursor, transport) = cursor_with(&[]);
        assert_eq!(cursor.execute("# just a note", Params::None).unwrap(), 0);
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_fetch_before_execute() {
        let (mut cursor, _) = cursor_with(&[]);
        assert!(matches!(cursor.fetch_one(), Err(Error::NotExecuted)));
        assert!(matches!(cursor.fetch_many(None), Err(Error::NotExecuted)));
        assert!(matches!(cursor.scroll(0, ScrollMode::Absolute), Err(Error::NotExecuted)));
        assert!(matches!(cursor.next_set(), Err(Error::NotExecuted)));
        assert_eq!(cursor.messages().len(), 4);
        assert!(cursor.messages().iter().all(|m| m.level == MessageLevel::Error));
    }

    #[test]
    fn test_server_error_is_logged() {
        let (mut cursor, _) = cursor_with(&["!42S02!table not found\n"]);
        let err = cursor.execute("SELECT * FROM missing", Params::None).unwrap_err();
        assert_eq!(err.sqlstate(), Some("42S02"));
        assert_eq!(cursor.messages(), &[Message {
            level: MessageLevel::Error,
            text: "42S02!table not found".into(),
        }]);
        assert!(matches!(cursor.fetch_one(), Err(Error::NotExecuted)));
    }

    #[test]
    fn test_execute_clears_messages() {
        let (mut cursor, _) = cursor_with(&["!boom\n", "&3\n"]);
        assert!(cursor.execute("bad", Params::None).is_err());
        assert_eq!(cursor.messages().len(), 1);
        cursor.execute("CREATE TABLE t (x int)", Params::None).unwrap();
        assert!(cursor.messages().is_empty());
        assert_eq!(cursor.rowcount(), -1);
    }

    #[test]
    fn test_close() {
        let (mut cursor, transport) = cursor_with(&[TWO_ROWS]);
        cursor.execute("SELECT 1", Params::None).unwrap();
        cursor.close().unwrap();
        assert!(cursor.is_closed());
        assert!(matches!(cursor.fetch_one(), Err(Error::CursorClosed)));
        assert!(matches!(cursor.execute("SELECT 1", Params::None), Err(Error::CursorClosed)));
        assert!(matches!(cursor.close(), Err(Error::CursorClosed)));
        assert_eq!(transport.requests().len(), 1);
    }

    #[test]
    fn test_local_scroll() {
        let (mut cursor, transport) = cursor_with(&["[ 1 ]\n[ 2 ]\n[ 3 ]\n"]);
        assert_eq!(cursor.execute("SELECT 1", Params::None).unwrap(), 3);
        cursor.fetch_many(Some(2)).unwrap();
        cursor.scroll(-2, ScrollMode::Relative).unwrap();
        assert_eq!(cursor.rownumber(), Some(0));
        assert_eq!(cursor.fetch_all().unwrap().len(), 3);
        assert!(matches!(
            cursor.scroll(1, ScrollMode::Relative),
            Err(Error::OutOfRange { position: 4, row_count: 3 })
        ));
        assert!(cursor.scroll(-4, ScrollMode::Relative).is_err());
        // the failed scroll kept the result
        cursor.scroll(1, ScrollMode::Absolute).unwrap();
        assert_eq!(cursor.fetch_one().unwrap().unwrap()[0], Value::from("2"));
        assert_eq!(transport.requests().len(), 1);
    }

    #[test]
    fn test_next_set_pages() {
        let (mut cursor, transport) = cursor_with(&[
            "&1 3 5 1 2\n% int # type\n[ 0 ]\n[ 1 ]\n",
            "&6 3 1 2 2\n[ 2 ]\n[ 3 ]\n",
        ]);
        cursor.set_arraysize(2);
        cursor.execute("SELECT n FROM t", Params::None).unwrap();
        cursor.fetch_one().unwrap();

        assert!(cursor.next_set().unwrap());
        assert_eq!(cursor.rownumber(), Some(2));
        assert_eq!(cursor.fetch_one().unwrap().unwrap()[0], Value::Integer(2));
        assert_eq!(transport.requests()[1], Request::Command("Xexport 3 2 2".into()));
    }

    #[test]
    fn test_next_set_exhausted() {
        let (mut cursor, _) = cursor_with(&[TWO_ROWS]);
        cursor.execute("SELECT 1", Params::None).unwrap();
        assert!(!cursor.next_set().unwrap());
        assert_eq!(cursor.rownumber(), Some(2));
        assert!(cursor.fetch_one().unwrap().is_none());
    }

    #[test]
    fn test_failed_page_invalidates_result() {
        let (mut cursor, _) = cursor_with(&["&1 3 5 1 2\n% int # type\n[ 0 ]\n[ 1 ]\n", "!export failed\n"]);
        cursor.execute("SELECT n FROM t", Params::None).unwrap();
        assert!(matches!(cursor.fetch_all(), Err(Error::Server { .. })));
        assert!(matches!(cursor.fetch_one(), Err(Error::NoResultSet)));
    }

    #[test]
    fn test_execute_many_sums_counts() {
        let (mut cursor, transport) = cursor_with(&["&2 1 -1\n", "&2 2 -1\n", "&2 0 -1\n"]);
        let total = cursor
            .execute_many(
                "DELETE FROM t WHERE x = %s",
                vec![Value::from(1), Value::from(2), Value::from(3)],
            )
            .unwrap();
        assert_eq!(total, 3);
        assert_eq!(cursor.rowcount(), 3);
        assert_eq!(transport.requests().len(), 3);
        assert_eq!(transport.requests()[2].text(), "DELETE FROM t WHERE x = 3;\n");
    }

    #[test]
    fn test_execute_many_keeps_last_result_pageable() {
        let (mut cursor, transport) = cursor_with(&[
            "&1 7 3 1 3\n% int # type\n[ 1 ]\n[ 2 ]\n[ 3 ]\n",
            "&1 8 3 1 3\n% int # type\n[ 4 ]\n[ 5 ]\n[ 6 ]\n",
        ]);
        let total = cursor
            .execute_many("SELECT n FROM t WHERE g = %s", vec![Value::from(1), Value::from(2)])
            .unwrap();
        assert_eq!(total, 6);
        assert_eq!(cursor.rowcount(), 6);

        let rows = cursor.fetch_all().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][0], Value::Integer(4));
        assert_eq!(transport.requests().len(), 2);

        transport.push_reply("&2 1 -1\n");
        cursor.execute("DELETE FROM t", Params::None).unwrap();
        assert_eq!(cursor.rowcount(), 1);
    }

    #[test]
    fn test_relative_scroll_overflow_is_out_of_range() {
        let (mut cursor, _) = cursor_with(&["[ 1 ]\n[ 2 ]\n"]);
        cursor.execute("SELECT 1", Params::None).unwrap();
        cursor.fetch_one().unwrap();

        assert!(matches!(
            cursor.scroll(i64::MAX, ScrollMode::Relative),
            Err(Error::OutOfRange { row_count: 2, .. })
        ));
        assert!(matches!(
            cursor.scroll(i64::MIN, ScrollMode::Relative),
            Err(Error::OutOfRange { .. })
        ));
        assert_eq!(cursor.rownumber(), Some(1));
        assert_eq!(cursor.fetch_one().unwrap().unwrap()[0], Value::from("2"));
    }

    #[test]
    fn test_rows_iterator() {
        let (mut cursor, _) = cursor_with(&[TWO_ROWS]);
        cursor.execute("SELECT 1", Params::None).unwrap();
        let ids: Vec<i64> = cursor
            .rows()
            .map(|row| row.unwrap().get_i64(0).unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_arraysize_from_config() {
        let transport = MemoryTransport::new();
        let conn = Connection::new(transport, Config::new().arraysize(7));
        let mut cursor = conn.cursor();
        assert_eq!(cursor.arraysize(), 7);
        cursor.set_arraysize(0);
        assert_eq!(cursor.arraysize(), 1);
    }
}
