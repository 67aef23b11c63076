//! In-memory ring store for recent chat entries

use super::Entry;
use chrono::Utc;
use parking_lot::{RwLock, RwLockReadGuard};
use std::sync::Arc;

/// Fixed-capacity circular store of entries
///
/// Slots are addressed by `write_cursor % capacity`. Once `write_cursor`
/// reaches `capacity`, each append overwrites the oldest surviving entry.
pub struct RingStore {
    /// Number of slots, fixed at construction
    capacity: usize,
    /// Slots and cursor, guarded together
    inner: RwLock<RingInner>,
}

struct RingInner {
    slots: Vec<Option<Arc<Entry>>>,
    /// Total entries ever appended
    write_cursor: u64,
}

impl RingInner {
    fn retained(&self, capacity: usize) -> usize {
        self.write_cursor.min(capacity as u64) as usize
    }

    fn slot_for_age(&self, age: usize, capacity: usize) -> Option<&Arc<Entry>> {
        if age >= self.retained(capacity) {
            return None;
        }
        let pos = (self.write_cursor - 1 - age as u64) % capacity as u64;
        self.slots[pos as usize].as_ref()
    }

    fn push(&mut self, entry: Arc<Entry>, capacity: usize) {
        let pos = (self.write_cursor % capacity as u64) as usize;
        self.slots[pos] = Some(entry);
        self.write_cursor += 1;
    }
}

impl RingStore {
    /// Create a store holding at most `capacity` entries (at least one slot)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            inner: RwLock::new(RingInner {
                slots: vec![None; capacity],
                write_cursor: 0,
            }),
        }
    }

    /// Append a fully built entry
    ///
    /// The caller is responsible for keeping timestamps non-decreasing.
    pub fn append(&self, entry: Entry) {
        let entry = Arc::new(entry);
        self.inner.write().push(entry, self.capacity);
    }

    /// Stamp a message with the current time and append it
    ///
    /// The stamp never goes earlier than the newest stored entry, so the
    /// append order stays time-ordered even if the wall clock steps back.
    pub fn record(
        &self,
        room: impl Into<String>,
        author: impl Into<String>,
        text: impl Into<String>,
    ) -> Arc<Entry> {
        let (room, author, text) = (room.into(), author.into(), text.into());

        let mut inner = self.inner.write();
        let mut timestamp = Utc::now();
        if let Some(newest) = inner.slot_for_age(0, self.capacity) {
            timestamp = timestamp.max(newest.timestamp);
        }

        let entry = Arc::new(Entry {
            room,
            author,
            text,
            timestamp,
        });
        inner.push(entry.clone(), self.capacity);
        entry
    }

    /// Get the entry `age` steps back from the newest (0 = newest)
    ///
    /// Returns `None` once `age` reaches the number of retained entries.
    pub fn read_by_age(&self, age: usize) -> Option<Arc<Entry>> {
        self.inner.read().slot_for_age(age, self.capacity).cloned()
    }

    /// Iterate retained entries from newest to oldest
    ///
    /// The shared lock is held until the snapshot is dropped, so the whole
    /// scan sees one consistent state. Do not hold it across an `.await`.
    pub fn snapshot_backward(&self) -> Snapshot<'_> {
        let guard = self.inner.read();
        let remaining = guard.retained(self.capacity);
        Snapshot {
            guard,
            capacity: self.capacity,
            age: 0,
            remaining,
        }
    }

    /// Number of entries currently retrievable
    pub fn len(&self) -> usize {
        self.inner.read().retained(self.capacity)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total entries ever appended, including evicted ones
    pub fn total_written(&self) -> u64 {
        self.inner.read().write_cursor
    }
}

/// Consistent newest-to-oldest view over a [`RingStore`]
pub struct Snapshot<'a> {
    guard: RwLockReadGuard<'a, RingInner>,
    capacity: usize,
    age: usize,
    remaining: usize,
}

impl Iterator for Snapshot<'_> {
    type Item = Arc<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let entry = self.guard.slot_for_age(self.age, self.capacity).cloned();
        self.age += 1;
        self.remaining -= 1;
        entry
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}
