//! Transport layer for MAPI connections
//!
//! The cursor does not open sockets itself. It talks to a [`Transport`] that
//! sends one request and blocks until the complete response block arrived.

mod memory;

pub use memory::{MemoryTransport, Request};

use crate::error::Result;

/// Trait for transport implementations
pub trait Transport: Send {
    /// Send a query and return the full response block
    fn cmd(&mut self, query: &str) -> Result<String>;

    /// Send a transport-level command (such as `Xexport`) and return the
    /// full response block
    fn command(&mut self, command: &str) -> Result<String>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn cmd(&mut self, query: &str) -> Result<String> {
        (**self).cmd(query)
    }

    fn command(&mut self, command: &str) -> Result<String> {
        (**self).command(command)
    }
}
