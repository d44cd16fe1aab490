//! Clipboard history for clipline.
//!
//! [`HistoryStore`] keeps captured snapshots newest first, with no two
//! entries payload-equal and never more than `max_items` of them. Every
//! mutation is persisted to the settings store under
//! [`HISTORY_KEY`](clipline_settings::HISTORY_KEY) and announced on the
//! event bus as `history:changed`.

mod codec;
mod error;

pub use error::{HistoryError, Result};

use chrono::{DateTime, Utc};
use clipline_clipboard::ClipboardSnapshot;
use clipline_events::{
    emit_event, event_names, EventBusRef, HistoryChange, HistoryChangedEvent,
};
use clipline_settings::{SettingsStoreRef, HISTORY_KEY};
use uuid::Uuid;

pub struct HistoryStore {
    entries: Vec<ClipboardSnapshot>,
    max_items: usize,
    store: SettingsStoreRef,
    events: EventBusRef,
}

impl HistoryStore {
    /// Restore the history from `store`.
    ///
    /// Missing or corrupt data gives an empty history.
    pub fn load(store: SettingsStoreRef, events: EventBusRef, max_items: usize) -> Self {
        let max_items = max_items.max(1);
        let entries = store
            .get_bytes(HISTORY_KEY)
            .map(|bytes| codec::decode(&bytes, max_items))
            .unwrap_or_default();

        tracing::info!(len = entries.len(), max_items, "history loaded");
        let history = Self {
            entries,
            max_items,
            store,
            events,
        };
        history.notify(HistoryChange::Loaded, None);
        history
    }

    pub fn entries(&self) -> &[ClipboardSnapshot] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    pub fn get(&self, id: Uuid) -> Option<&ClipboardSnapshot> {
        self.entries.iter().find(|e| e.id() == id)
    }

    pub fn front(&self) -> Option<&ClipboardSnapshot> {
        self.entries.first()
    }

    /// Insert `snapshot` at the front.
    ///
    /// A payload-equal entry is replaced, the oldest entries beyond
    /// `max_items` are evicted, and the capture time is clamped so it
    /// never precedes the previous front.
    pub fn capture(&mut self, snapshot: ClipboardSnapshot) {
        let snapshot = match self.front() {
            Some(front) if snapshot.captured_at() < front.captured_at() => {
                snapshot.restamped(front.captured_at())
            }
            _ => snapshot,
        };

        self.entries.retain(|e| e != &snapshot);
        let id = snapshot.id();
        tracing::debug!(%id, kind = ?snapshot.kind(), "captured clipboard entry");
        self.entries.insert(0, snapshot);
        self.entries.truncate(self.max_items);

        self.persist();
        self.notify(HistoryChange::Captured, Some(id));
    }

    /// Write entry `id` back to the clipboard, then move it to the front.
    ///
    /// `write` runs first; if it fails the history is left as it was. The
    /// entry keeps its identity and is stamped with `now`. Promoting the
    /// front entry still runs `write`.
    pub fn promote<E>(
        &mut self,
        id: Uuid,
        now: DateTime<Utc>,
        write: impl FnOnce(&ClipboardSnapshot) -> std::result::Result<(), E>,
    ) -> Result<ClipboardSnapshot>
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let index = self
            .entries
            .iter()
            .position(|e| e.id() == id)
            .ok_or(HistoryError::NotFound(id))?;

        write(&self.entries[index]).map_err(|e| HistoryError::Write(e.into()))?;

        let entry = self.entries.remove(index);
        let stamp = self
            .front()
            .map_or(now, |front| now.max(front.captured_at()))
            .max(entry.captured_at());
        let promoted = entry.restamped(stamp);
        self.entries.insert(0, promoted.clone());
        tracing::debug!(%id, from = index, "promoted clipboard entry");

        self.persist();
        self.notify(HistoryChange::Promoted, Some(id));
        Ok(promoted)
    }

    /// Remove entry `id`. Returns whether it existed.
    pub fn delete(&mut self, id: Uuid) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id() != id);
        if self.entries.len() == before {
            return false;
        }
        tracing::debug!(%id, "deleted clipboard entry");
        self.persist();
        self.notify(HistoryChange::Deleted, Some(id));
        true
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        tracing::debug!("cleared clipboard history");
        self.persist();
        self.notify(HistoryChange::Cleared, None);
    }

    /// Entries matching `query`, case-insensitively, in history order.
    ///
    /// Text matches on its content and file lists on any path. Images never
    /// match a non-empty query. An empty query returns everything.
    pub fn search(&self, query: &str) -> Vec<&ClipboardSnapshot> {
        if query.is_empty() {
            return self.entries.iter().collect();
        }
        let needle = query.to_lowercase();
        self.entries
            .iter()
            .filter(|e| e.matches_lowercase(&needle))
            .collect()
    }

    /// Change the bound (at least 1), evicting the oldest overflow now.
    pub fn set_max_items(&mut self, max_items: usize) {
        let max_items = max_items.max(1);
        self.max_items = max_items;
        let evicted = self.entries.len().saturating_sub(max_items);
        if evicted > 0 {
            self.entries.truncate(max_items);
            self.persist();
        }
        tracing::debug!(max_items, evicted, "history bound changed");
        self.notify(HistoryChange::Resized, None);
    }

    /// Write the current history to the settings store.
    pub fn save(&self) -> Result<()> {
        let bytes = codec::encode(&self.entries)?;
        self.store.set_bytes(HISTORY_KEY, &bytes)?;
        Ok(())
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            tracing::warn!(error = %e, len = self.entries.len(), "failed to persist history");
        }
    }

    fn notify(&self, change: HistoryChange, id: Option<Uuid>) {
        emit_event(
            self.events.as_ref(),
            event_names::HISTORY_CHANGED,
            &HistoryChangedEvent {
                change,
                len: self.entries.len(),
                entry_id: id.map(|id| id.to_string()),
            },
        );
    }
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore")
            .field("len", &self.entries.len())
            .field("max_items", &self.max_items)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use clipline_clipboard::SnapshotKind;
    use clipline_events::InMemoryEventBus;
    use clipline_settings::{InMemorySettingsStore, SettingsStore};
    use std::cell::Cell;
    use std::path::PathBuf;
    use std::sync::Arc;

    struct Fixture {
        store: Arc<InMemorySettingsStore>,
        events: Arc<InMemoryEventBus>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                store: Arc::new(InMemorySettingsStore::new()),
                events: Arc::new(InMemoryEventBus::new()),
            }
        }

        fn history(&self, max_items: usize) -> HistoryStore {
            HistoryStore::load(self.store.clone(), self.events.clone(), max_items)
        }
    }

    fn text(s: &str) -> ClipboardSnapshot {
        ClipboardSnapshot::text(s, Utc::now())
    }

    fn previews(history: &HistoryStore) -> Vec<String> {
        history.entries().iter().map(|e| e.preview()).collect()
    }

    fn ok_write(_: &ClipboardSnapshot) -> std::result::Result<(), std::io::Error> {
        Ok(())
    }

    #[test]
    fn test_capture_dedupes_to_front() {
        let fx = Fixture::new();
        let mut history = fx.history(50);

        history.capture(text("a"));
        history.capture(text("b"));
        let again = ClipboardSnapshot::text("a", Utc::now() + Duration::seconds(10));
        let latest = again.captured_at();
        history.capture(again);

        assert_eq!(previews(&history), vec!["a", "b"]);
        assert_eq!(history.front().unwrap().captured_at(), latest);
    }

    #[test]
    fn test_capture_twice_keeps_one() {
        let fx = Fixture::new();
        let mut history = fx.history(50);

        history.capture(text("same"));
        history.capture(text("same"));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_capture_bounded_keeps_most_recent() {
        let fx = Fixture::new();
        let mut history = fx.history(3);

        for i in 0..10 {
            history.capture(text(&i.to_string()));
            assert_eq!(history.len(), (i + 1).min(3));
        }
        assert_eq!(previews(&history), vec!["9", "8", "7"]);
    }

    #[test]
    fn test_capture_evicts_oldest_mixed_kinds() {
        let fx = Fixture::new();
        let mut history = fx.history(3);
        let now = Utc::now();

        // Built oldest first so the final order is [A, B, C].
        history.capture(ClipboardSnapshot::files(vec![PathBuf::from("/tmp/f")], now).unwrap());
        history.capture(ClipboardSnapshot::image(vec![1, 2, 3], now));
        history.capture(ClipboardSnapshot::text("x", now));
        history.set_max_items(2);
        assert_eq!(
            history.entries().iter().map(|e| e.kind()).collect::<Vec<_>>(),
            vec![SnapshotKind::Text, SnapshotKind::Image]
        );

        history.capture(ClipboardSnapshot::text("y", now));
        assert_eq!(previews(&history), vec!["y", "x"]);
    }

    #[test]
    fn test_capture_timestamps_never_go_backwards() {
        let fx = Fixture::new();
        let mut history = fx.history(50);
        let now = Utc::now();

        history.capture(ClipboardSnapshot::text("later", now));
        history.capture(ClipboardSnapshot::text("earlier", now - Duration::seconds(30)));

        let stamps: Vec<_> = history.entries().iter().map(|e| e.captured_at()).collect();
        assert!(stamps[0] >= stamps[1]);
    }

    #[test]
    fn test_capture_persists_and_emits() {
        let fx = Fixture::new();
        let mut history = fx.history(50);
        fx.events.clear();

        history.capture(text("persist me"));

        assert_eq!(fx.store.write_count(HISTORY_KEY), 1);
        let event = fx.events.last_for(event_names::HISTORY_CHANGED).unwrap();
        assert_eq!(event["change"], "captured");
        assert_eq!(event["len"], 1);
        assert_eq!(
            event["entry_id"],
            history.front().unwrap().id().to_string()
        );
    }

    #[test]
    fn test_promote_moves_to_front() {
        let fx = Fixture::new();
        let mut history = fx.history(50);
        history.capture(text("a"));
        history.capture(text("b"));
        history.capture(text("c"));
        let a = history.entries()[2].id();

        let later = Utc::now() + Duration::seconds(60);
        let promoted = history.promote(a, later, ok_write).unwrap();

        assert_eq!(promoted.id(), a);
        assert_eq!(previews(&history), vec!["a", "c", "b"]);
        assert_eq!(history.front().unwrap().id(), a);
        assert_eq!(history.front().unwrap().captured_at(), later);
    }

    #[test]
    fn test_promote_front_still_writes() {
        let fx = Fixture::new();
        let mut history = fx.history(50);
        history.capture(text("a"));
        history.capture(text("b"));
        let front = history.front().unwrap().id();
        let writes = Cell::new(0);

        history
            .promote(front, Utc::now(), |_| {
                writes.set(writes.get() + 1);
                Ok::<(), std::io::Error>(())
            })
            .unwrap();

        assert_eq!(writes.get(), 1);
        assert_eq!(previews(&history), vec!["b", "a"]);
    }

    #[test]
    fn test_promote_failed_write_leaves_order() {
        let fx = Fixture::new();
        let mut history = fx.history(50);
        history.capture(text("a"));
        history.capture(text("b"));
        let a = history.entries()[1].id();
        let writes_before = fx.store.write_count(HISTORY_KEY);

        let err = history
            .promote(a, Utc::now(), |_| {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "pasteboard busy"))
            })
            .unwrap_err();

        assert!(matches!(err, HistoryError::Write(_)));
        assert_eq!(previews(&history), vec!["b", "a"]);
        assert_eq!(fx.store.write_count(HISTORY_KEY), writes_before);
    }

    #[test]
    fn test_promote_unknown_id() {
        let fx = Fixture::new();
        let mut history = fx.history(50);
        let missing = Uuid::new_v4();
        let err = history.promote(missing, Utc::now(), ok_write).unwrap_err();
        assert!(matches!(err, HistoryError::NotFound(id) if id == missing));
    }

    #[test]
    fn test_delete_and_clear() {
        let fx = Fixture::new();
        let mut history = fx.history(50);
        history.capture(text("a"));
        history.capture(text("b"));
        let b = history.front().unwrap().id();

        assert!(history.delete(b));
        assert!(!history.delete(b));
        assert_eq!(previews(&history), vec!["a"]);

        history.clear();
        assert!(history.is_empty());
        assert_eq!(fx.store.get_bytes(HISTORY_KEY), Some(b"[]".to_vec()));
    }

    #[test]
    fn test_search() {
        let fx = Fixture::new();
        let mut history = fx.history(50);
        let now = Utc::now();
        history.capture(ClipboardSnapshot::image(vec![9, 9], now));
        history.capture(ClipboardSnapshot::files(vec![PathBuf::from("/Users/me/Notes.md")], now).unwrap());
        history.capture(ClipboardSnapshot::text("Meeting NOTES", now));
        history.capture(ClipboardSnapshot::text("groceries", now));

        let hits: Vec<_> = history.search("notes").iter().map(|e| e.preview()).collect();
        assert_eq!(hits, vec!["Meeting NOTES", "Notes.md"]);

        let all: Vec<_> = history.search("").iter().map(|e| e.id()).collect();
        let expected: Vec<_> = history.entries().iter().map(|e| e.id()).collect();
        assert_eq!(all, expected);
    }

    #[test]
    fn test_search_image_only_history() {
        let fx = Fixture::new();
        let mut history = fx.history(50);
        history.capture(ClipboardSnapshot::image(vec![1], Utc::now()));
        history.capture(ClipboardSnapshot::image(vec![2], Utc::now()));

        assert!(history.search("image").is_empty());
        assert!(history.search("a").is_empty());
        assert_eq!(history.search("").len(), 2);
    }

    #[test]
    fn test_set_max_items_truncates_now() {
        let fx = Fixture::new();
        let mut history = fx.history(50);
        for s in ["a", "b", "c", "d"] {
            history.capture(text(s));
        }

        history.set_max_items(2);
        assert_eq!(previews(&history), vec!["d", "c"]);

        history.set_max_items(0);
        assert_eq!(history.max_items(), 1);
        assert_eq!(previews(&history), vec!["d"]);
    }

    #[test]
    fn test_reload_restores_order() {
        let fx = Fixture::new();
        {
            let mut history = fx.history(50);
            history.capture(text("first"));
            history.capture(ClipboardSnapshot::image(vec![7, 7, 7], Utc::now()));
            history.capture(
                ClipboardSnapshot::files(vec![PathBuf::from("/tmp/x")], Utc::now()).unwrap(),
            );
        }

        let reloaded = fx.history(50);
        assert_eq!(
            reloaded.entries().iter().map(|e| e.kind()).collect::<Vec<_>>(),
            vec![SnapshotKind::FileList, SnapshotKind::Image, SnapshotKind::Text]
        );
    }

    #[test]
    fn test_corrupt_store_loads_empty() {
        let fx = Fixture::new();
        fx.store.set_bytes(HISTORY_KEY, b"{{{{").unwrap();

        let history = fx.history(50);
        assert!(history.is_empty());
        let event = fx.events.last_for(event_names::HISTORY_CHANGED).unwrap();
        assert_eq!(event["change"], "loaded");
        assert_eq!(event["len"], 0);
    }
}
