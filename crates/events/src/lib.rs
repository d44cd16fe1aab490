//! Change-event contracts for the clipline core.
//!
//! The core has no process-boundary protocol of its own. Everything the
//! surrounding UI layer needs to know (history mutations, hotkey status,
//! paste outcomes) is published as a typed event through an [`EventBus`].
//! Using shared DTOs keeps producers and consumers in agreement on field
//! names.

mod bus;

pub use bus::{
    emit_event, EmittedEvent, EventBus, EventBusRef, InMemoryEventBus, LogEventBus, NullEventBus,
};

use serde::{Deserialize, Serialize};

/// What kind of mutation produced a [`HistoryChangedEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryChange {
    /// History was restored from the settings store at startup.
    Loaded,
    /// A new clipboard snapshot was captured.
    Captured,
    /// An existing entry was written back to the clipboard and moved to the front.
    Promoted,
    /// An entry was deleted by identity.
    Deleted,
    /// The whole history was cleared.
    Cleared,
    /// The capacity bound changed (entries may have been evicted).
    Resized,
}

/// Event emitted after every history mutation.
///
/// Producers: history store (via the engine)
/// Consumers: history list UI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryChangedEvent {
    pub change: HistoryChange,
    /// Number of entries after the mutation.
    pub len: usize,
    /// Identity of the entry the mutation concerned, if any.
    #[serde(default)]
    pub entry_id: Option<String>,
}

/// Event emitted when the open-history shortcut fires.
///
/// Producers: engine
/// Consumers: panel/window layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenHistoryRequestedEvent {
    /// Application that will receive the paste, if known.
    #[serde(default)]
    pub target_app: Option<String>,
}

/// Event describing the registration state of one shortcut slot.
///
/// `binding` is `None` when no hotkey is active for the slot, in which
/// case `error` carries the reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotkeyStatusEvent {
    pub slot: String,
    #[serde(default)]
    pub binding: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Event emitted once the paste keystroke has been posted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasteCompletedEvent {
    /// `"entry"` for a history selection, `"clipboard"` for the paste hotkey.
    pub source: String,
    /// Whether a focus witness was available and re-activated.
    pub refocused: bool,
}

/// Event emitted when a paste stops before posting its keystroke.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasteFailedEvent {
    pub source: String,
    pub error: String,
}

/// Event names as constants to prevent typos.
pub mod event_names {
    /// History mutated.
    pub const HISTORY_CHANGED: &str = "history:changed";
    /// Open-history shortcut pressed.
    pub const HISTORY_OPEN_REQUESTED: &str = "history:open_requested";
    /// Shortcut slot registered, re-registered or left inactive.
    pub const HOTKEY_STATUS: &str = "hotkey:status";
    /// Paste keystroke posted.
    pub const PASTE_COMPLETED: &str = "paste:completed";
    /// Paste aborted.
    pub const PASTE_FAILED: &str = "paste:failed";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_changed_serialize() {
        let event = HistoryChangedEvent {
            change: HistoryChange::Captured,
            len: 3,
            entry_id: Some("abc".to_string()),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["change"], "captured");
        assert_eq!(json["len"], 3);
        assert_eq!(json["entry_id"], "abc");
    }

    #[test]
    fn test_hotkey_status_deserialize_minimal() {
        let json = r#"{"slot": "paste"}"#;
        let event: HotkeyStatusEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.slot, "paste");
        assert!(event.binding.is_none());
        assert!(event.error.is_none());
    }
}
