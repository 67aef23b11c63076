//! Integration tests for the `extract` chat command

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;
use scrollback::query::QueryEngine;
use scrollback::server::{CommandHandler, Reply};
use scrollback::session::{ChatSession, CommandCall, SessionError};
use scrollback::storage::{Entry, RingStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

/// Records every reply instead of sending it
#[derive(Default)]
struct RecordingSession {
    sent: Mutex<Vec<(String, String, String)>>,
}

#[async_trait]
impl ChatSession for RecordingSession {
    async fn send_message(&self, room: &str, from: &str, text: &str) -> Result<(), SessionError> {
        self.sent
            .lock()
            .push((room.to_string(), from.to_string(), text.to_string()));
        Ok(())
    }
}

fn now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

fn call(room: &str, args: &str) -> CommandCall {
    CommandCall {
        room: room.to_string(),
        from: "alice".to_string(),
        name: "extract".to_string(),
        args: args.to_string(),
    }
}

fn handler() -> (CommandHandler, Arc<RecordingSession>) {
    let store = Arc::new(RingStore::new(10));
    store.append(Entry::new("#main", "u1", "hi", now() - TimeDelta::seconds(30)));
    store.append(Entry::new("#dev", "u2", "yo", now() - TimeDelta::seconds(20)));
    store.append(Entry::new("#main", "u1", "bye", now() - TimeDelta::seconds(10)));

    let session = Arc::new(RecordingSession::default());
    let handler = CommandHandler::new(
        QueryEngine::new(store),
        session.clone(),
        "https://extract.example.com",
        "Devzat-extractor",
    );
    (handler, session)
}

#[test]
fn test_duration_builds_room_url() {
    let (handler, _) = handler();

    let reply = handler.respond(&call("#main", "10m"), now());

    let from = (now() - TimeDelta::minutes(10)).timestamp_millis();
    let to = (now() - TimeDelta::seconds(1)).timestamp_millis();
    assert_eq!(
        reply,
        Reply::Url(format!(
            "https://extract.example.com/timespan/main/{}/{}/extract.txt",
            from, to
        ))
    );
}

#[test]
fn test_signed_and_unsigned_durations_agree() {
    let (handler, _) = handler();

    assert_eq!(
        handler.respond(&call("#main", "10m"), now()),
        handler.respond(&call("#main", "-10m"), now())
    );
}

#[test]
fn test_all_scope_builds_all_rooms_url() {
    let (handler, _) = handler();

    match handler.respond(&call("#main", "1h all"), now()) {
        Reply::Url(url) => assert!(url.starts_with("https://extract.example.com/timespan-all/")),
        other => panic!("expected url, got {:?}", other),
    }
}

#[test]
fn test_count_replies_with_text() {
    let (handler, _) = handler();

    assert_eq!(
        handler.respond(&call("#main", "2"), now()),
        Reply::Text("u1: hi  \nu1: bye  \n".to_string())
    );
    assert_eq!(
        handler.respond(&call("#main", "2 all"), now()),
        Reply::Text("u2: yo  \nu1: bye  \n".to_string())
    );
}

#[test]
fn test_invalid_duration_builds_no_url() {
    let (handler, _) = handler();

    for args in ["abc", "", "10 minutes please"] {
        assert_eq!(handler.respond(&call("#main", args), now()), Reply::Invalid, "{:?}", args);
    }
}

#[tokio::test]
async fn test_handle_sends_error_into_room() {
    let (handler, session) = handler();

    handler.handle(call("#main", "abc")).await;

    let sent = session.sent.lock().clone();
    assert_eq!(
        sent,
        vec![(
            "#main".to_string(),
            "Devzat-extractor".to_string(),
            "Error, invalid duration".to_string()
        )]
    );
}

#[tokio::test]
async fn test_run_ignores_other_commands() {
    let (handler, session) = handler();
    let (tx, rx) = mpsc::channel(10);

    let mut other = call("#main", "5");
    other.name = "weather".to_string();
    tx.send(other).await.unwrap();
    tx.send(call("#dev", "5")).await.unwrap();
    drop(tx);

    Arc::new(handler).run(rx).await;

    // Replies are sent from spawned tasks
    let replied = timeout(Duration::from_secs(2), async {
        loop {
            if !session.sent.lock().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(replied.is_ok());

    tokio::time::sleep(Duration::from_millis(50)).await;
    let sent = session.sent.lock().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "#dev");
    assert_eq!(sent[0].2, "u2: yo  \n");
}
