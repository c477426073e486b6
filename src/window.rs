//! Result window management
//!
//! A [`ResultWindow`] buffers the slice of a result set the client currently
//! holds. When the cursor moves outside that slice the window asks the server
//! for the matching rows with an `Xexport` request and decodes the reply in
//! place.

use crate::connection::Connection;
use crate::cursor::Message;
use crate::error::{Error, Result};
use crate::messages::{ExportMessage, ResultDecoder};
use crate::row::Row;
use crate::statement::ColumnDescription;

/// Identifies the result set a window belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryId {
    /// The last operation produced no result set
    #[default]
    None,
    /// Result set held by the server, pageable with `Xexport`
    Server(i64),
    /// Result set without a server-side handle; fully buffered
    Local,
}

impl QueryId {
    /// Whether the result can be paged from the server
    pub fn is_server(&self) -> bool {
        matches!(self, QueryId::Server(_))
    }

    /// Whether there is a result set at all
    pub fn is_result_set(&self) -> bool {
        !matches!(self, QueryId::None)
    }
}

/// What a window needs to re-fetch rows
pub(crate) struct Pager<'a> {
    pub connection: &'a Connection,
    pub arraysize: usize,
    pub messages: &'a mut Vec<Message>,
}

/// The buffered part of a result set
#[derive(Debug, Clone)]
pub struct ResultWindow {
    pub(crate) query: QueryId,
    /// Total rows (selected or affected); -1 when not applicable
    pub(crate) row_count: i64,
    /// Position of `rows[0]` in the whole result
    pub(crate) offset: usize,
    pub(crate) rows: Vec<Row>,
    pub(crate) description: Option<Vec<ColumnDescription>>,
    pub(crate) last_row_id: Option<i64>,
}

impl Default for ResultWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultWindow {
    /// Create an empty window
    pub fn new() -> Self {
        Self {
            query: QueryId::None,
            row_count: -1,
            offset: 0,
            rows: Vec::new(),
            description: None,
            last_row_id: None,
        }
    }

    /// Forget the current result
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// The result set this window belongs to
    pub fn query(&self) -> QueryId {
        self.query
    }

    /// Total row count, -1 when not applicable
    pub fn row_count(&self) -> i64 {
        self.row_count
    }

    /// Row count usable as a position bound
    pub fn total(&self) -> usize {
        self.row_count.max(0) as usize
    }

    /// Position of the first buffered row
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Position one past the last buffered row
    pub fn end(&self) -> usize {
        self.offset + self.rows.len()
    }

    /// The buffered rows
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Column descriptions of the current result
    pub fn description(&self) -> Option<&[ColumnDescription]> {
        self.description.as_deref()
    }

    /// Identifier generated by the last insert
    pub fn last_row_id(&self) -> Option<i64> {
        self.last_row_id
    }

    /// Check if a position is buffered
    pub fn contains(&self, position: usize) -> bool {
        position >= self.offset && position < self.end()
    }

    /// Buffered row at an absolute position
    pub fn row_at(&self, position: usize) -> Option<&Row> {
        position
            .checked_sub(self.offset)
            .and_then(|index| self.rows.get(index))
    }

    /// Buffered rows in the absolute range `from..to`
    pub fn slice(&self, from: usize, to: usize) -> &[Row] {
        let start = from.saturating_sub(self.offset).min(self.rows.len());
        let stop = to.saturating_sub(self.offset).min(self.rows.len());
        &self.rows[start..stop.max(start)]
    }

    /// Results without a server handle count their buffered rows
    pub(crate) fn count_local_rows(&mut self) {
        if !self.query.is_server() {
            self.query = QueryId::Local;
            self.row_count = self.rows.len() as i64;
        }
    }

    /// Decode a response block into this window
    pub(crate) fn load(&mut self, block: &str, pager: &mut Pager<'_>) -> Result<()> {
        ResultDecoder::new(pager.connection.registry(), self, &mut *pager.messages).decode(block)
    }

    /// Slide the window to the page after the buffered rows.
    ///
    /// Returns `false` when `position` is already at the end of the result,
    /// when no rows follow the buffer, or when the result cannot be paged.
    pub(crate) fn next_page(&mut self, position: usize, pager: &mut Pager<'_>) -> Result<bool> {
        let QueryId::Server(query_id) = self.query else {
            return Ok(false);
        };
        let total = self.total();
        if position >= total {
            return Ok(false);
        }
        let next = self.end();
        if next >= total {
            return Ok(false);
        }

        self.offset = next;
        let amount = pager.arraysize.min(total - next);
        self.fetch(query_id, amount, pager)?;
        Ok(true)
    }

    /// Re-anchor the window at an absolute position and fetch from there
    pub(crate) fn scroll_to(&mut self, position: i64, pager: &mut Pager<'_>) -> Result<()> {
        if position < 0 || position > self.row_count {
            return Err(Error::OutOfRange {
                position,
                row_count: self.row_count,
            });
        }
        let QueryId::Server(query_id) = self.query else {
            // local results are fully buffered
            return Ok(());
        };

        let position = position as usize;
        self.offset = position;
        let amount = pager.arraysize.min(self.total() - position);
        if amount == 0 {
            self.rows.clear();
            return Ok(());
        }
        self.fetch(query_id, amount, pager)
    }

    fn fetch(&mut self, query_id: i64, amount: usize, pager: &mut Pager<'_>) -> Result<()> {
        let request = ExportMessage::new(query_id, self.offset, amount).build_request();
        tracing::debug!(
            query_id = query_id,
            offset = self.offset,
            amount = amount,
            "requesting result page"
        );
        let block = pager.connection.command(&request)?;
        self.rows.clear();
        self.load(&block, pager)?;

        if self.rows.is_empty() {
            return Err(Error::protocol(format!(
                "export of {} rows at offset {} returned no rows",
                amount, self.offset
            )));
        }
        Ok(())
    }
}
