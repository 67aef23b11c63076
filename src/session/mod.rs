//! Upstream chat-service session
//!
//! The session delivers two feeds: every message posted in any room, and
//! invocations of the commands this service registered. Replies go back
//! through [`ChatSession::send_message`].

pub mod websocket;

pub use websocket::{ClientFrame, ServerFrame, WsSession};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

/// Session errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("session closed")]
    Closed,
}

/// A message posted in a room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub room: String,
    pub from: String,
    pub data: String,
}

/// An invocation of a registered command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandCall {
    pub room: String,
    pub from: String,
    pub name: String,
    pub args: String,
}

/// A command to register with the chat service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: String,
    pub args_info: String,
    pub info: String,
}

/// Receiving side of a session
///
/// An `Err` on the message feed is terminal: the session is gone.
pub struct SessionFeeds {
    pub messages: mpsc::Receiver<Result<IncomingMessage, SessionError>>,
    pub commands: mpsc::Receiver<CommandCall>,
}

/// Outbound half of a chat session
#[async_trait]
pub trait ChatSession: Send + Sync {
    /// Post `text` into `room` under the display name `from`
    async fn send_message(&self, room: &str, from: &str, text: &str) -> Result<(), SessionError>;
}
