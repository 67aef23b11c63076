//! Retrieval over the ring store
//!
//! Two modes, both walking the store backward from the newest entry:
//! - count-back: the last `n` entries of a room
//! - time window: entries strictly between two timestamps
//!
//! Both render oldest-first as `author: text` lines.

pub mod duration;

pub use duration::{just_now, resolve_cutoff, ExtractArg, JUST_NOW_EPSILON_MS};

use crate::storage::{Entry, RingStore};
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

/// Which rooms a query looks at
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RoomFilter {
    /// Every room
    All,
    /// Exactly this room
    Room(String),
}

impl RoomFilter {
    /// Build a filter from a room name; an empty name means every room
    pub fn from_room(room: &str) -> Self {
        if room.is_empty() {
            Self::All
        } else {
            Self::Room(room.to_string())
        }
    }

    pub fn matches(&self, room: &str) -> bool {
        match self {
            Self::All => true,
            Self::Room(name) => name == room,
        }
    }
}

impl fmt::Display for RoomFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "*"),
            Self::Room(name) => write!(f, "{}", name),
        }
    }
}

/// Append one entry as a text line
pub fn format_entry(entry: &Entry, out: &mut String) {
    out.push_str(&entry.author);
    out.push_str(": ");
    out.push_str(&entry.text);
    out.push_str("  \n");
}

fn render(matched: &[Arc<Entry>]) -> String {
    let mut out = String::new();
    // matched is newest-first
    for entry in matched.iter().rev() {
        format_entry(entry, &mut out);
    }
    out
}

/// Query front-end shared by the command and HTTP adapters
#[derive(Clone)]
pub struct QueryEngine {
    store: Arc<RingStore>,
}

impl QueryEngine {
    pub fn new(store: Arc<RingStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<RingStore> {
        &self.store
    }

    /// The last `count` entries matching `filter`, oldest first
    ///
    /// Entries from other rooms do not use up the count. Returns whatever
    /// was found if fewer than `count` entries match.
    pub fn count_back(&self, count: usize, filter: &RoomFilter) -> String {
        if count == 0 {
            return String::new();
        }

        let matched: Vec<Arc<Entry>> = self
            .store
            .snapshot_backward()
            .filter(|e| filter.matches(&e.room))
            .take(count)
            .collect();

        render(&matched)
    }

    /// Entries with `start < timestamp < stop` matching `filter`, oldest first
    pub fn between(
        &self,
        start: DateTime<Utc>,
        stop: DateTime<Utc>,
        filter: &RoomFilter,
    ) -> String {
        let mut matched = Vec::new();

        for entry in self.store.snapshot_backward() {
            // Timestamps only decrease from here on
            if entry.timestamp <= start {
                break;
            }
            if entry.timestamp >= stop {
                continue;
            }
            if filter.matches(&entry.room) {
                matched.push(entry);
            }
        }

        render(&matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn engine_with(capacity: usize, entries: &[(&str, &str, &str, i64)]) -> QueryEngine {
        let store = Arc::new(RingStore::new(capacity));
        for (room, author, text, ts) in entries {
            store.append(Entry::new(*room, *author, *text, at(*ts)));
        }
        QueryEngine::new(store)
    }

    #[test]
    fn test_count_back_skips_other_rooms() {
        let engine = engine_with(
            3,
            &[("a", "u1", "hi", 1), ("b", "u2", "yo", 2), ("a", "u1", "bye", 3)],
        );

        let text = engine.count_back(2, &RoomFilter::Room("a".into()));
        assert_eq!(text, "u1: hi  \nu1: bye  \n");
    }

    #[test]
    fn test_count_back_all_rooms() {
        let engine = engine_with(
            3,
            &[("a", "u1", "hi", 1), ("b", "u2", "yo", 2), ("a", "u1", "bye", 3)],
        );

        assert_eq!(engine.count_back(2, &RoomFilter::All), "u2: yo  \nu1: bye  \n");
        assert_eq!(
            engine.count_back(10, &RoomFilter::from_room("")),
            "u1: hi  \nu2: yo  \nu1: bye  \n"
        );
    }

    #[test]
    fn test_count_back_zero_and_unknown_room() {
        let engine = engine_with(2, &[("a", "u1", "hi", 1), ("a", "u1", "there", 2)]);

        assert_eq!(engine.count_back(0, &RoomFilter::All), "");
        assert_eq!(engine.count_back(5, &RoomFilter::Room("zzz".into())), "");
    }

    #[test]
    fn test_empty_store() {
        let engine = engine_with(4, &[]);

        assert_eq!(engine.count_back(3, &RoomFilter::All), "");
        assert_eq!(engine.between(at(0), at(100), &RoomFilter::All), "");
    }

    #[test]
    fn test_between_is_exclusive() {
        let engine = engine_with(
            10,
            &[
                ("a", "u", "t10", 10),
                ("a", "u", "t20", 20),
                ("a", "u", "t30", 30),
                ("a", "u", "t40", 40),
            ],
        );

        let text = engine.between(at(10), at(40), &RoomFilter::All);
        assert_eq!(text, "u: t20  \nu: t30  \n");
    }

    #[test]
    fn test_between_skips_newer_and_filters_room() {
        let engine = engine_with(
            10,
            &[
                ("a", "u", "old", 5),
                ("a", "u", "in-a", 15),
                ("b", "v", "in-b", 16),
                ("a", "u", "in-a-2", 17),
                ("a", "u", "newer", 50),
            ],
        );

        let text = engine.between(at(10), at(20), &RoomFilter::Room("a".into()));
        assert_eq!(text, "u: in-a  \nu: in-a-2  \n");
    }

    #[test]
    fn test_between_is_idempotent() {
        let engine = engine_with(3, &[("a", "u", "x", 1), ("a", "u", "y", 2), ("b", "u", "z", 3)]);

        let first = engine.between(at(0), at(10), &RoomFilter::All);
        let second = engine.between(at(0), at(10), &RoomFilter::All);
        assert_eq!(first, second);
        assert_eq!(first, "u: x  \nu: y  \nu: z  \n");
    }

    #[test]
    fn test_text_is_verbatim() {
        let engine = engine_with(2, &[("a", "u", "line one\n  line two", 1)]);
        assert_eq!(engine.count_back(1, &RoomFilter::All), "u: line one\n  line two  \n");
    }
}
