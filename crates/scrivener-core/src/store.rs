//! Latest-transcript store: keyed last-write-wins slots with TTL eviction.
//!
//! One slot per `meetingId`; each write overwrites the slot whole. The unkeyed
//! read contract is preserved by `latest()`, which returns the most recently
//! updated live slot across all meetings. Concurrent writers to different
//! meetings no longer clobber each other; two writers to the *same* meeting
//! remain last-write-wins, which is documented behavior rather than an error.

use crate::types::TranscriptUpdate;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use dashmap::DashMap;

/// One meeting's slot. Overwritten whole on every write.
#[derive(Debug, Clone)]
struct TranscriptSlot {
    text: String,
    updated_at: DateTime<Utc>,
}

/// Process-wide holder of the most recent transcript per meeting.
pub struct TranscriptStore {
    slots: DashMap<String, TranscriptSlot>,
    retention: ChronoDuration,
}

impl TranscriptStore {
    /// `retention_secs`: how long a slot lives without a new write before eviction.
    pub fn new(retention_secs: u64) -> Self {
        Self {
            slots: DashMap::new(),
            retention: ChronoDuration::seconds(retention_secs as i64),
        }
    }

    /// Unconditionally overwrite the slot for `meeting_id`. O(1).
    pub fn write(&self, meeting_id: &str, text: &str) -> DateTime<Utc> {
        let now = Utc::now();
        self.slots.insert(
            meeting_id.to_string(),
            TranscriptSlot {
                text: text.to_string(),
                updated_at: now,
            },
        );
        now
    }

    /// Read one meeting's slot verbatim.
    pub fn read(&self, meeting_id: &str) -> Option<TranscriptUpdate> {
        self.slots.get(meeting_id).map(|slot| TranscriptUpdate {
            meeting_id: meeting_id.to_string(),
            text: slot.text.clone(),
            timestamp: slot.updated_at,
        })
    }

    /// The most recently updated slot across all meetings, or `None` when the
    /// store has never been written (or everything has been evicted).
    pub fn latest(&self) -> Option<TranscriptUpdate> {
        self.slots
            .iter()
            .max_by_key(|entry| entry.value().updated_at)
            .map(|entry| TranscriptUpdate {
                meeting_id: entry.key().clone(),
                text: entry.value().text.clone(),
                timestamp: entry.value().updated_at,
            })
    }

    /// Drop slots whose last write is older than the retention window.
    /// Returns how many were evicted.
    pub fn evict_expired(&self) -> usize {
        let cutoff = Utc::now() - self.retention;
        let before = self.slots.len();
        self.slots.retain(|_, slot| slot.updated_at >= cutoff);
        before - self.slots.len()
    }

    /// Number of live slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_after_write_returns_exact_text_and_id() {
        let store = TranscriptStore::new(3600);
        store.write("meet-1", "we discussed the indemnification clause");
        let got = store.read("meet-1").unwrap();
        assert_eq!(got.text, "we discussed the indemnification clause");
        assert_eq!(got.meeting_id, "meet-1");
    }

    #[test]
    fn write_read_round_trip_is_byte_identical() {
        let store = TranscriptStore::new(3600);
        let text = "exact  spacing\tand \"quotes\" survive — even unicode: §12(b)";
        store.write("meet-1", text);
        assert_eq!(store.read("meet-1").unwrap().text, text);
    }

    #[test]
    fn slots_are_isolated_per_meeting() {
        let store = TranscriptStore::new(3600);
        store.write("meet-a", "alpha transcript");
        store.write("meet-b", "beta transcript");
        assert_eq!(store.read("meet-a").unwrap().text, "alpha transcript");
        assert_eq!(store.read("meet-b").unwrap().text, "beta transcript");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn latest_returns_most_recent_write() {
        let store = TranscriptStore::new(3600);
        store.write("meet-a", "first");
        store.write("meet-b", "second");
        let latest = store.latest().unwrap();
        assert_eq!(latest.meeting_id, "meet-b");
        assert_eq!(latest.text, "second");
    }

    #[test]
    fn latest_is_none_when_never_written() {
        let store = TranscriptStore::new(3600);
        assert!(store.latest().is_none());
    }

    #[test]
    fn eviction_removes_only_expired_slots() {
        let store = TranscriptStore::new(0);
        store.write("stale", "old text");
        // Zero retention: anything older than "now" at eviction time goes.
        std::thread::sleep(std::time::Duration::from_millis(10));
        let evicted = store.evict_expired();
        assert_eq!(evicted, 1);
        assert!(store.read("stale").is_none());

        let keep = TranscriptStore::new(3600);
        keep.write("fresh", "new text");
        assert_eq!(keep.evict_expired(), 0);
        assert!(keep.read("fresh").is_some());
    }

    #[test]
    fn same_meeting_is_last_write_wins() {
        let store = TranscriptStore::new(3600);
        store.write("meet-1", "first version");
        store.write("meet-1", "second version");
        assert_eq!(store.read("meet-1").unwrap().text, "second version");
        assert_eq!(store.len(), 1);
    }
}
