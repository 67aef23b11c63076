//! Scrollback - bounded chat history with on-demand extracts
//!
//! Listens to every room of a group-chat service, keeps the most recent
//! messages in a fixed-size ring, and serves them back either as the last
//! `n` messages or as everything posted within a time window.

pub mod config;
pub mod error;
pub mod ingest;
pub mod query;
pub mod server;
pub mod session;
pub mod storage;

pub use error::ExtractError;
pub use query::{QueryEngine, RoomFilter};
pub use storage::{Entry, RingStore};
