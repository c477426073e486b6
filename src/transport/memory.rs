//! In-memory transport
//!
//! Replays scripted response blocks and records every request. Replies are
//! taken from the queue first; when it is empty the handler (if any) answers.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use super::Transport;
use crate::error::{Error, Result};

/// A request received by a [`MemoryTransport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Sent through [`Transport::cmd`]
    Query(String),
    /// Sent through [`Transport::command`]
    Command(String),
}

impl Request {
    /// The request text
    pub fn text(&self) -> &str {
        match self {
            Request::Query(text) | Request::Command(text) => text,
        }
    }
}

type Handler = Box<dyn FnMut(&Request) -> Result<String> + Send>;

#[derive(Default)]
struct MemoryState {
    replies: VecDeque<String>,
    handler: Option<Handler>,
    requests: Vec<Request>,
}

/// Scripted transport for tests and demos.
///
/// Clones share the same script and request log, so a test can keep a clone
/// after handing the transport to a connection.
///
/// # Example
///
/// ```rust
/// use mapi_cursor::transport::{MemoryTransport, Request, Transport};
///
/// let mut transport = MemoryTransport::new();
/// transport.push_reply("&2 1 -1\n");
/// assert_eq!(transport.cmd("DELETE FROM t;\n").unwrap(), "&2 1 -1\n");
/// assert_eq!(transport.requests(), vec![Request::Query("DELETE FROM t;\n".into())]);
/// ```
#[derive(Clone, Default)]
pub struct MemoryTransport {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryTransport {
    /// Create a transport with an empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport answering every request with `handler`
    pub fn with_handler<F>(handler: F) -> Self
    where
        F: FnMut(&Request) -> Result<String> + Send + 'static,
    {
        let transport = Self::new();
        transport.state.lock().handler = Some(Box::new(handler));
        transport
    }

    /// Queue a reply block
    pub fn push_reply(&self, block: impl Into<String>) {
        self.state.lock().replies.push_back(block.into());
    }

    /// All requests received so far
    pub fn requests(&self) -> Vec<Request> {
        self.state.lock().requests.clone()
    }

    fn answer(&self, request: Request) -> Result<String> {
        let mut state = self.state.lock();
        state.requests.push(request.clone());
        if let Some(reply) = state.replies.pop_front() {
            return Ok(reply);
        }
        match state.handler.as_mut() {
            Some(handler) => handler(&request),
            None => Err(Error::Transport(format!(
                "no reply scripted for {:?}",
                request.text()
            ))),
        }
    }
}

impl Transport for MemoryTransport {
    fn cmd(&mut self, query: &str) -> Result<String> {
        self.answer(Request::Query(query.to_string()))
    }

    fn command(&mut self, command: &str) -> Result<String> {
        self.answer(Request::Command(command.to_string()))
    }
}

impl fmt::Debug for MemoryTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("MemoryTransport")
            .field("queued_replies", &state.replies.len())
            .field("has_handler", &state.handler.is_some())
            .field("requests", &state.requests.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_before_handler() {
        let mut transport = MemoryTransport::with_handler(|req| Ok(format!("={}\n", req.text())));
        transport.push_reply("first\n");

        assert_eq!(transport.cmd("a").unwrap(), "first\n");
        assert_eq!(transport.command("b").unwrap(), "=b\n");
        assert_eq!(
            transport.requests(),
            vec![Request::Query("a".into()), Request::Command("b".into())]
        );
    }

    #[test]
    fn test_unscripted_request_fails() {
        let mut transport = MemoryTransport::new();
        assert!(matches!(transport.cmd("x"), Err(Error::Transport(_))));
    }

    #[test]
    fn test_clones_share_state() {
        let transport = MemoryTransport::new();
        let mut other = transport.clone();
        transport.push_reply("ok\n");
        assert_eq!(other.cmd("q").unwrap(), "ok\n");
        assert_eq!(transport.requests().len(), 1);
    }
}
