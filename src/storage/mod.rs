//! Message retention
//!
//! - Ring store: fixed-capacity, overwrite-on-full history of recent entries

mod ringbuf;

pub use ringbuf::{RingStore, Snapshot};

use chrono::{DateTime, Utc};

/// One received chat message together with the time the store recorded it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Originating room, e.g. `#main`
    pub room: String,
    /// Display name of the sender
    pub author: String,
    /// Message body, kept verbatim
    pub text: String,
    /// Assignment time in the store
    pub timestamp: DateTime<Utc>,
}

impl Entry {
    pub fn new(
        room: impl Into<String>,
        author: impl Into<String>,
        text: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            room: room.into(),
            author: author.into(),
            text: text.into(),
            timestamp,
        }
    }
}
