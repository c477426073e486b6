//! Cursor configuration
//!
//! A [`Config`] is handed to [`Connection::new`](crate::Connection::new) and
//! copied into every cursor the connection creates.

use crate::constants::DEFAULT_ARRAYSIZE;
use crate::types::TypeRegistry;

/// Configuration shared by the cursors of a connection.
///
/// # Examples
///
/// ## Defaults
///
/// ```rust
/// use mapi_cursor::Config;
///
/// let config = Config::new();
/// assert_eq!(config.arraysize, 100);
/// ```
///
/// ## Custom page size and type registry
///
/// ```rust
/// use mapi_cursor::types::TypeRegistry;
/// use mapi_cursor::{Config, Value};
///
/// let mut registry = TypeRegistry::default();
/// registry.register("inet", |raw| Ok(Value::String(raw.to_string())));
///
/// let config = Config::new().arraysize(500).registry(registry);
/// assert_eq!(config.arraysize, 500);
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Rows per page for `fetch_many` and `Xexport` requests
    pub arraysize: usize,
    /// Converters for wire type tags
    pub registry: TypeRegistry,
}

impl Config {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self {
            arraysize: DEFAULT_ARRAYSIZE,
            registry: TypeRegistry::default(),
        }
    }

    /// Set the page size (at least one row)
    pub fn arraysize(mut self, arraysize: usize) -> Self {
        self.arraysize = arraysize.max(1);
        self
    }

    /// Set the type registry
    pub fn registry(mut self, registry: TypeRegistry) -> Self {
        self.registry = registry;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
