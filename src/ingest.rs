//! Message ingest: chat feed into the ring store

use crate::session::{IncomingMessage, SessionError};
use crate::storage::RingStore;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error};

/// Record every message from `feed` until the feed fails or closes
///
/// There is no retry: the returned error is the reason the session ended
/// and is meant to stop the process.
pub async fn run_ingest(
    store: Arc<RingStore>,
    mut feed: mpsc::Receiver<Result<IncomingMessage, SessionError>>,
) -> SessionError {
    while let Some(item) = feed.recv().await {
        match item {
            Ok(msg) => {
                let entry = store.record(msg.room, msg.from, msg.data);
                debug!(room = %entry.room, author = %entry.author, "Recorded message");
            }
            Err(e) => {
                error!(error = %e, "Chat feed failed");
                return e;
            }
        }
    }

    SessionError::Closed
}
