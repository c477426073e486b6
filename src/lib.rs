#![warn(missing_docs)]

//! # mapi-cursor
//!
//! A client-side decoder and paginated result cursor for the MAPI line
//! protocol.
//!
//! The server answers each query with a block of text lines. Every line starts
//! with a marker naming its kind: result headers, column metadata, tuples,
//! update counts, errors, and the terminating prompt. This crate turns such a
//! block into typed rows addressable by index, and pages through large results
//! with follow-up `Xexport` requests as the cursor moves past the buffered rows.
//!
//! ## Features
//!
//! - **Windowed results** - Only one page of rows is held client-side
//! - **Random access** - Relative and absolute scrolling with on-demand re-fetch
//! - **Typed values** - Pluggable converters keyed by wire type tag
//! - **Transport agnostic** - Bring any [`Transport`]; an in-memory one is included
//!
//! ## Quick Start
//!
//! ```rust
//! use mapi_cursor::transport::MemoryTransport;
//! use mapi_cursor::{Config, Connection, Params};
//!
//! # fn main() -> mapi_cursor::Result<()> {
//! let transport = MemoryTransport::new();
//! transport.push_reply(
//!     "&1 0 2 2 2\n% id,\tname # name\n% int,\tvarchar # type\n[ 1,\t\"Alice\"\t]\n[ 2,\t\"Bob\"\t]\n",
//! );
//!
//! let conn = Connection::new(transport, Config::new());
//! let mut cursor = conn.cursor();
//! cursor.execute("SELECT id, name FROM users", Params::None)?;
//!
//! for row in cursor.fetch_all()? {
//!     let id = row.get_i64(0).unwrap_or(0);
//!     let name = row.get_string(1).unwrap_or("");
//!     println!("User {}: {}", id, name);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Parameters
//!
//! ```rust
//! use mapi_cursor::transport::MemoryTransport;
//! use mapi_cursor::{Config, Connection, Params, Value};
//!
//! # fn main() -> mapi_cursor::Result<()> {
//! let transport = MemoryTransport::new();
//! transport.push_reply("&2 1 42\n");
//! transport.push_reply("&2 1 -1\n");
//!
//! let conn = Connection::new(transport, Config::new());
//! let mut cursor = conn.cursor();
//!
//! // Positional
//! cursor.execute(
//!     "INSERT INTO users (name, age) VALUES (%s, %s)",
//!     vec![Value::from("Alice"), Value::from(30)],
//! )?;
//! assert_eq!(cursor.lastrowid(), Some(42));
//!
//! // Named
//! cursor.execute(
//!     "UPDATE users SET age = %(age)s WHERE name = %(name)s",
//!     Params::named([("age", Value::from(31)), ("name", Value::from("Alice"))]),
//! )?;
//! assert_eq!(cursor.rowcount(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Data Types
//!
//! | Wire Type | Rust Type |
//! |-----------|-----------|
//! | `int`, `oid`, `bigint`, ... | `i64` |
//! | `double`, `real`, ... | `f64` |
//! | `varchar`, `char`, `clob`, ... | `String` |
//! | `boolean` | `bool` |
//! | `decimal` | `String` (exact text) |
//! | `date` | `chrono::NaiveDate` |
//! | `time` | `chrono::NaiveTime` |
//! | `timestamp` | `chrono::NaiveDateTime` |
//! | `uuid` | `uuid::Uuid` |
//! | `json` | `serde_json::Value` |
//!
//! Other tags can be added with [`TypeRegistry::register`].

pub mod config;
pub mod connection;
pub mod constants;
pub mod cursor;
pub mod error;
pub mod messages;
pub mod row;
pub mod statement;
pub mod transport;
pub mod types;
pub mod window;

// Re-exports for convenience
pub use config::Config;
pub use connection::Connection;
pub use cursor::{Cursor, Message, MessageLevel, Rows, ScrollMode};
pub use error::{Error, Result};
pub use row::{Row, Value};
pub use statement::{ColumnDescription, Params};
pub use transport::{MemoryTransport, Transport};
pub use types::TypeRegistry;
pub use window::{QueryId, ResultWindow};

// Re-export serde_json for users working with JSON columns
pub use serde_json;
