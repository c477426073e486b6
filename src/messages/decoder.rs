//! Response block decoding
//!
//! The [`ResultDecoder`] walks the lines of one response block and applies
//! each classified [`Line`] to a [`ResultWindow`]. Decoding ends at the prompt
//! (success) or at the first error line (failure).

use crate::constants::{type_tag, FieldIdentity, GENERIC_COLUMN_NAME};
use crate::cursor::Message;
use crate::error::{Error, Result};
use crate::row::{Row, Value};
use crate::statement::ColumnDescription;
use crate::types::TypeRegistry;
use crate::window::{QueryId, ResultWindow};

use super::line::{Line, TableHeader};

/// Accumulates per-column header fields until the column list is published
#[derive(Debug, Default, Clone)]
pub struct ColumnBuilder {
    /// Column count announced by the table header, if there was one
    column_count: Option<usize>,
    names: Vec<String>,
    types: Vec<String>,
    type_sizes: Vec<(usize, u32)>,
    published: bool,
}

impl ColumnBuilder {
    /// Create a builder for a result with the given column count
    pub fn new(column_count: usize) -> Self {
        Self {
            column_count: Some(column_count),
            ..Self::default()
        }
    }

    /// Check that a header line has one value per announced column
    pub fn check_width(&self, identity: &str, width: usize) -> Result<()> {
        match self.column_count {
            Some(expected) if expected != width => Err(Error::protocol(format!(
                "{} line has {} values for {} columns",
                identity, width, expected
            ))),
            _ => Ok(()),
        }
    }

    /// Set the column names
    pub fn names(&mut self, values: &[&str]) {
        self.names = values.iter().map(|v| v.to_string()).collect();
    }

    /// Set the wire type tags
    pub fn types(&mut self, values: &[&str]) {
        self.types = values.iter().map(|v| v.to_string()).collect();
    }

    /// Set the `digits scale` pairs
    pub fn type_sizes(&mut self, values: &[&str]) -> Result<()> {
        self.type_sizes = values
            .iter()
            .map(|pair| {
                let mut parts = pair.split_whitespace();
                let digits = parts.next().and_then(|d| d.parse().ok());
                let scale = parts.next().map_or(Some(0), |s| s.parse().ok());
                digits
                    .zip(scale)
                    .ok_or_else(|| Error::protocol(format!("invalid typesizes entry {:?}", pair)))
            })
            .collect::<Result<_>>()?;
        Ok(())
    }

    /// Whether the column list was published already
    pub fn is_published(&self) -> bool {
        self.published
    }

    /// Finalize the column descriptions
    pub fn build(&mut self) -> Vec<ColumnDescription> {
        self.published = true;
        self.types
            .iter()
            .enumerate()
            .map(|(i, type_code)| {
                let mut column = ColumnDescription::new(
                    self.names.get(i).cloned().unwrap_or_default(),
                    type_code.clone(),
                );
                if let Some(&(digits, scale)) = self.type_sizes.get(i) {
                    column.internal_size = Some(digits);
                    if type_code == type_tag::DECIMAL {
                        column.precision = Some(digits as u32);
                        column.scale = Some(scale);
                    }
                }
                column
            })
            .collect()
    }
}

/// Applies the lines of a response block to a result window
pub struct ResultDecoder<'a> {
    registry: &'a TypeRegistry,
    window: &'a mut ResultWindow,
    messages: &'a mut Vec<Message>,
    builder: Option<ColumnBuilder>,
}

impl<'a> ResultDecoder<'a> {
    /// Create a decoder writing into `window`; warnings go to `messages`
    pub fn new(
        registry: &'a TypeRegistry,
        window: &'a mut ResultWindow,
        messages: &'a mut Vec<Message>,
    ) -> Self {
        Self {
            registry,
            window,
            messages,
            builder: None,
        }
    }

    /// Decode one response block
    pub fn decode(mut self, block: &str) -> Result<()> {
        for text in block.split('\n') {
            let line = Line::classify(text)?;
            tracing::trace!(kind = line.kind(), "decoding response line");
            match line {
                Line::Prompt => return Ok(()),
                Line::Error(message) => return Err(Error::server(message)),
                other => self.apply(other)?,
            }
        }
        Err(Error::protocol("unexpected end of response"))
    }

    fn apply(&mut self, line: Line<'_>) -> Result<()> {
        match line {
            Line::TableHeader(header) => self.table_header(header),
            Line::Comment(_) => {}
            Line::Field { values, identity } => self.field(&values, identity)?,
            Line::Tuple(fields) => self.tuple(&fields)?,
            Line::TupleNoSlice(value) => self.tuple_noslice(value),
            Line::Block => self.window.rows.clear(),
            Line::Schema | Line::Transaction => self.no_result(-1, None),
            Line::Update { affected, last_id } => self.no_result(affected, last_id),
            Line::Fallback(text) => self.fallback(text),
            Line::Prompt | Line::Error(_) => {}
        }
        Ok(())
    }

    fn table_header(&mut self, header: TableHeader) {
        tracing::debug!(
            query_id = header.query_id,
            row_count = header.row_count,
            columns = header.column_count,
            rows = header.rows_in_block,
            "result set header"
        );
        let window = &mut *self.window;
        window.query = QueryId::Server(header.query_id);
        window.row_count = header.row_count;
        window.offset = 0;
        window.rows.clear();
        window.description = None;
        window.last_row_id = None;
        self.builder = Some(ColumnBuilder::new(header.column_count));
    }

    fn field(&mut self, values: &[&str], identity: &str) -> Result<()> {
        let builder = self.builder.get_or_insert_with(ColumnBuilder::default);

        match FieldIdentity::parse(identity) {
            Some(FieldIdentity::Name) => {
                builder.check_width(identity, values.len())?;
                builder.names(values);
            }
            Some(FieldIdentity::Type) => {
                builder.check_width(identity, values.len())?;
                builder.types(values);
                self.publish();
            }
            Some(FieldIdentity::TypeSizes) => {
                builder.check_width(identity, values.len())?;
                builder.type_sizes(values)?;
                if builder.is_published() {
                    self.publish();
                }
            }
            Some(FieldIdentity::TableName) | Some(FieldIdentity::Length) => {}
            None => {
                let text = format!("unknown header field: {}", identity);
                tracing::warn!("{}", text);
                self.messages.push(Message::warning(text));
            }
        }
        Ok(())
    }

    fn publish(&mut self) {
        let Some(builder) = self.builder.as_mut() else {
            return;
        };
        let columns = builder.build();
        tracing::trace!(columns = columns.len(), "column descriptions published");

        let window = &mut *self.window;
        window.description = Some(columns);
        window.offset = 0;
        window.last_row_id = None;
        if !window.query.is_server() {
            window.query = QueryId::Local;
            window.row_count = window.rows.len() as i64;
        }
    }

    fn tuple(&mut self, fields: &[&str]) -> Result<()> {
        let registry = self.registry;
        let window = &mut *self.window;
        let columns = window
            .description
            .get_or_insert_with(|| vec![ColumnDescription::new(GENERIC_COLUMN_NAME, type_tag::NONE)]);

        if fields.len() != columns.len() {
            return Err(Error::RowShapeMismatch {
                expected: columns.len(),
                actual: fields.len(),
            });
        }
        let values = fields
            .iter()
            .zip(columns.iter())
            .map(|(field, column)| registry.convert(&column.type_code, field))
            .collect::<Result<Vec<_>>>()?;

        window.rows.push(Row::new(values));
        window.count_local_rows();
        Ok(())
    }

    fn tuple_noslice(&mut self, value: &str) {
        let window = &mut *self.window;
        window
            .description
            .get_or_insert_with(|| vec![ColumnDescription::new(GENERIC_COLUMN_NAME, type_tag::NONE)]);
        window.rows.push(Row::new(vec![Value::String(value.to_string())]));
        window.count_local_rows();
    }

    fn no_result(&mut self, row_count: i64, last_row_id: Option<i64>) {
        let window = &mut *self.window;
        window.query = QueryId::None;
        window.row_count = row_count;
        window.offset = 0;
        window.rows.clear();
        window.description = None;
        window.last_row_id = last_row_id;
        self.builder = None;
    }

    fn fallback(&mut self, text: &str) {
        tracing::trace!("unstructured reply treated as a single value");
        let window = &mut *self.window;
        window.query = QueryId::Local;
        window.row_count = 1;
        window.offset = 0;
        window.rows = vec![Row::new(vec![Value::String(text.to_string())])];
        window.description = Some(vec![ColumnDescription::new(
            GENERIC_COLUMN_NAME,
            type_tag::NONE,
        )]);
        window.last_row_id = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(block: &str) -> (Result<()>, ResultWindow, Vec<Message>) {
        let registry = TypeRegistry::default();
        let mut window = ResultWindow::new();
        let mut messages = Vec::new();
        let result = ResultDecoder::new(&registry, &mut window, &mut messages).decode(block);
        (result, window, messages)
    }

    #[test]
    fn test_column_builder_decimal_sizes() {
        let mut builder = ColumnBuilder::new(2);
        builder.names(&["price", "n"]);
        builder.types(&["decimal", "int"]);
        builder.type_sizes(&["10 2", "32 0"]).unwrap();
        let columns = builder.build();

        assert_eq!(columns[0].name, "price");
        assert_eq!(columns[0].precision, Some(10));
        assert_eq!(columns[0].scale, Some(2));
        assert_eq!(columns[0].internal_size, Some(10));
        assert_eq!(columns[1].internal_size, Some(32));
        assert_eq!(columns[1].precision, None);
        assert!(builder.is_published());
    }

    #[test]
    fn test_column_builder_rejects_bad_sizes() {
        let mut builder = ColumnBuilder::new(1);
        assert!(builder.type_sizes(&["ten 2"]).is_err());
    }

    #[test]
    fn test_table_result() {
        let block = "&1 4 2 2 2\n% t,\tt # table_name\n% id,\tname # name\n% int,\tvarchar # type\n% 32 0,\t5 0 # typesizes\n[ 1,\t\"a\"\t]\n[ 2,\tNULL\t]\n";
        let (result, window, messages) = decode(block);
        result.unwrap();

        assert_eq!(window.query, QueryId::Server(4));
        assert_eq!(window.row_count, 2);
        assert_eq!(window.rows.len(), 2);
        assert_eq!(window.rows[0].values(), &[Value::Integer(1), Value::from("a")]);
        assert!(window.rows[1].is_null(1));
        let description = window.description.unwrap();
        assert_eq!(description[1].name, "name");
        assert_eq!(description[1].internal_size, Some(5));
        assert!(messages.is_empty());
    }

    #[test]
    fn test_header_total_survives_partial_block() {
        let (result, window, _) = decode("&1 0 250 1 1\n% int # type\n[ 7 ]\n");
        result.unwrap();
        assert_eq!(window.row_count, 250);
        assert_eq!(window.rows.len(), 1);
    }

    #[test]
    fn test_headerless_tuples() {
        let (result, window, _) = decode("[ 1 ]\n[ 2 ]\n");
        result.unwrap();
        assert_eq!(window.query, QueryId::Local);
        assert_eq!(window.row_count, 2);
        assert_eq!(window.description.unwrap()[0].type_code, "none");
        assert_eq!(window.rows[1][0], Value::from("2"));
    }

    #[test]
    fn test_row_shape_mismatch() {
        let (result, _, _) = decode("&1 0 1 2 1\n% int,\tint # type\n[ 1 ]\n");
        assert!(matches!(
            result,
            Err(Error::RowShapeMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_unknown_field_is_warning() {
        let (result, window, messages) = decode("&1 0 0 1 0\n% x # flavour\n% int # type\n");
        result.unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].text.contains("flavour"));
        assert!(window.description.is_some());
    }

    #[test]
    fn test_update_schema_transaction() {
        let (result, window, _) = decode("&2 5 7\n");
        result.unwrap();
        assert_eq!(window.row_count, 5);
        assert_eq!(window.last_row_id, Some(7));
        assert_eq!(window.query, QueryId::None);
        assert!(window.description.is_none());

        for block in ["&3\n", "&4 t\n"] {
            let (result, window, _) = decode(block);
            result.unwrap();
            assert_eq!(window.row_count, -1);
            assert_eq!(window.query, QueryId::None);
        }
    }

    #[test]
    fn test_block_marker_clears_rows() {
        let registry = TypeRegistry::default();
        let mut window = ResultWindow::new();
        let mut messages = Vec::new();
        ResultDecoder::new(&registry, &mut window, &mut messages)
            .decode("&1 1 3 1 2\n% int # type\n[ 1 ]\n[ 2 ]\n")
            .unwrap();
        ResultDecoder::new(&registry, &mut window, &mut messages)
            .decode("&6 1 1 1 2\n[ 3 ]\n")
            .unwrap();
        assert_eq!(window.rows.len(), 1);
        assert_eq!(window.rows[0][0], Value::Integer(3));
        assert_eq!(window.row_count, 3);
    }

    #[test]
    fn test_fallback_single_value() {
        let (result, window, _) = decode("hello world\n");
        result.unwrap();
        assert_eq!(window.query, QueryId::Local);
        assert_eq!(window.row_count, 1);
        assert_eq!(window.rows[0][0], Value::from("hello world"));
    }

    #[test]
    fn test_fallback_swallows_malformed_structured_line() {
        // a garbled update marker is accepted as plain data
        let (result, window, _) = decode("&7 5 7\n");
        result.unwrap();
        assert_eq!(window.rows[0][0], Value::from("&7 5 7"));
    }

    #[test]
    fn test_error_and_missing_prompt() {
        let (result, _, _) = decode("!42S02!table not found\n");
        assert!(matches!(result, Err(Error::Server { ref message }) if message == "42S02!table not found"));

        let (result, _, _) = decode("&2 5 7");
        assert!(matches!(result, Err(Error::ProtocolState(_))));
    }

    #[test]
    fn test_huge_header_counts_do_not_allocate() {
        let (result, window, _) = decode("&1 0 5 1 18446744073709551615\n% int # type\n[ 1 ]\n");
        result.unwrap();
        assert_eq!(window.row_count, 5);
        assert_eq!(window.rows.len(), 1);

        let (result, _, _) = decode("&1 0 5 18446744073709551615 1\n% int # type\n[ 1 ]\n");
        assert!(matches!(result, Err(Error::ProtocolState(_))));
    }

    #[test]
    fn test_header_width_must_match_column_count() {
        for block in [
            "&1 0 1 2 1\n% int # type\n",
            "&1 0 1 2 1\n% a,\tb,\tc # name\n",
            "&1 0 1 1 1\n% int # type\n% 32 0,\t8 0 # typesizes\n",
        ] {
            let (result, _, _) = decode(block);
            assert!(matches!(result, Err(Error::ProtocolState(_))), "block {:?}", block);
        }
        // header-less metadata has no announced width
        let (result, window, _) = decode("% a,\tb # name\n% int,\tint # type\n[ 1,\t2 ]\n");
        result.unwrap();
        assert_eq!(window.rows[0].len(), 2);
    }

    #[test]
    fn test_empty_block_is_prompt() {
        let (result, window, _) = decode("");
        result.unwrap();
        assert_eq!(window.query, QueryId::None);
    }
}
