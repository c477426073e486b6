//! Shared connection handle
//!
//! A [`Connection`] wraps one [`Transport`] and hands out cursors. All cursors
//! created from the same connection share the transport and are not isolated
//! from each other: changes made through one cursor are immediately visible
//! to the others.
//!
//! Only one request may be outstanding on a connection at a time. A request
//! issued while another is still waiting for its reply fails fast with a
//! protocol error instead of interleaving on the wire.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::Config;
use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::transport::Transport;
use crate::types::TypeRegistry;

struct Inner {
    transport: Mutex<Box<dyn Transport>>,
    config: Config,
}

/// Cloneable handle to a MAPI connection.
///
/// # Example
///
/// ```rust
/// use mapi_cursor::transport::MemoryTransport;
/// use mapi_cursor::{Config, Connection, Params};
///
/// # fn main() -> mapi_cursor::Result<()> {
/// let transport = MemoryTransport::new();
/// transport.push_reply("&1 0 1 1 1\n% n # name\n% int # type\n[ 42 ]\n");
///
/// let conn = Connection::new(transport, Config::new());
/// let mut cursor = conn.cursor();
/// assert_eq!(cursor.execute("SELECT 42 AS n", Params::None)?, 1);
/// assert_eq!(cursor.fetch_one()?.unwrap().get_i64(0), Some(42));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Connection {
    inner: Arc<Inner>,
}

impl Connection {
    /// Create a connection over an established transport
    pub fn new(transport: impl Transport + 'static, config: Config) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport: Mutex::new(Box::new(transport)),
                config,
            }),
        }
    }

    /// Create a new cursor on this connection
    pub fn cursor(&self) -> Cursor {
        Cursor::new(self.clone())
    }

    /// The configuration cursors start from
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// The type registry used to decode rows
    pub fn registry(&self) -> &TypeRegistry {
        &self.inner.config.registry
    }

    /// Send a query and return the response block
    pub fn cmd(&self, query: &str) -> Result<String> {
        tracing::trace!(query = query, "sending query");
        self.acquire()?.cmd(query)
    }

    /// Send a transport-level command and return the response block
    pub fn command(&self, command: &str) -> Result<String> {
        tracing::trace!(command = command, "sending command");
        self.acquire()?.command(command)
    }

    fn acquire(&self) -> Result<parking_lot::MutexGuard<'_, Box<dyn Transport>>> {
        self.inner.transport.try_lock().ok_or_else(|| {
            Error::protocol("connection busy: another request is still outstanding")
        })
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("config", &self.inner.config)
            .field("cursors", &Arc::strong_count(&self.inner))
            .finish()
    }
}
