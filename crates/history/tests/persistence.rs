//! History persistence through the SQLite settings store.

use chrono::Utc;
use clipline_clipboard::{encode_png, ClipboardSnapshot, RawImage};
use clipline_events::NullEventBus;
use clipline_history::HistoryStore;
use clipline_settings::{SettingsStore, HISTORY_KEY};
use clipline_storage::Database;
use std::path::PathBuf;
use std::sync::Arc;

fn png() -> Vec<u8> {
    let raw = RawImage {
        width: 3,
        height: 2,
        rgba: (0..24).collect(),
    };
    encode_png(&raw).expect("encode test image")
}

#[test]
fn test_history_survives_reopen() {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let bus = Arc::new(NullEventBus);

    let expected = {
        let mut history = HistoryStore::load(db.clone(), bus.clone(), 10);
        history.capture(ClipboardSnapshot::text("alpha", Utc::now()));
        history.capture(ClipboardSnapshot::image(png(), Utc::now()));
        history.capture(
            ClipboardSnapshot::files(
                vec![PathBuf::from("/tmp/one"), PathBuf::from("/tmp/two")],
                Utc::now(),
            )
            .unwrap(),
        );
        history.entries().to_vec()
    };

    let reloaded = HistoryStore::load(db, bus, 10);
    assert_eq!(reloaded.entries(), expected.as_slice());
    for (a, b) in reloaded.entries().iter().zip(&expected) {
        assert_eq!(a.id(), b.id());
        assert_eq!(a.captured_at(), b.captured_at());
    }
}

#[test]
fn test_corrupt_row_loads_empty() {
    let db = Arc::new(Database::open_in_memory().unwrap());
    db.set_bytes(HISTORY_KEY, &[0xff, 0xfe, 0x00]).unwrap();

    let history = HistoryStore::load(db, Arc::new(NullEventBus), 10);
    assert!(history.is_empty());
}

#[test]
fn test_smaller_bound_on_reload() {
    let db = Arc::new(Database::open_in_memory().unwrap());
    {
        let mut history = HistoryStore::load(db.clone(), Arc::new(NullEventBus), 10);
        for s in ["a", "b", "c", "d"] {
            history.capture(ClipboardSnapshot::text(s, Utc::now()));
        }
    }

    let history = HistoryStore::load(db, Arc::new(NullEventBus), 2);
    let previews: Vec<_> = history.entries().iter().map(|e| e.preview()).collect();
    assert_eq!(previews, vec!["d", "c"]);
}
