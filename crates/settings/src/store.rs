//! The settings-store contract.
//!
//! The core persists everything through two calls: read a byte blob by key,
//! write a byte blob by key. What sits behind them (SQLite, a plist, memory)
//! is not the core's concern.

use crate::error::Result;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Key of the serialized history list.
pub const HISTORY_KEY: &str = "history";
/// Key of the open-history shortcut blob.
pub const OPEN_SHORTCUT_KEY: &str = "shortcut.open";
/// Key of the paste shortcut blob.
pub const PASTE_SHORTCUT_KEY: &str = "shortcut.paste";
/// Key of the history capacity bound.
pub const MAX_ITEMS_KEY: &str = "history.max_items";
/// Key of the launch-at-login flag.
pub const LAUNCH_AT_LOGIN_KEY: &str = "launch_at_login";

/// Byte-oriented key-value store.
pub trait SettingsStore: Send + Sync {
    /// Read the blob stored under `key`, if any.
    fn get_bytes(&self, key: &str) -> Option<Vec<u8>>;

    /// Replace the blob stored under `key`.
    fn set_bytes(&self, key: &str, bytes: &[u8]) -> Result<()>;
}

/// Type alias for a shared settings store.
pub type SettingsStoreRef = Arc<dyn SettingsStore>;

/// Settings store backed by a `HashMap`, for tests and ephemeral runs.
#[derive(Default)]
pub struct InMemorySettingsStore {
    values: Mutex<HashMap<String, Vec<u8>>>,
    writes: Mutex<Vec<String>>,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys written so far, in write order (repeats included).
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().expect("settings mutex poisoned").clone()
    }

    /// Number of writes made to `key`.
    pub fn write_count(&self, key: &str) -> usize {
        self.writes
            .lock()
            .expect("settings mutex poisoned")
            .iter()
            .filter(|k| k.as_str() == key)
            .count()
    }
}

impl SettingsStore for InMemorySettingsStore {
    fn get_bytes(&self, key: &str) -> Option<Vec<u8>> {
        self.values
            .lock()
            .expect("settings mutex poisoned")
            .get(key)
            .cloned()
    }

    fn set_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        self.values
            .lock()
            .expect("settings mutex poisoned")
            .insert(key.to_string(), bytes.to_vec());
        self.writes
            .lock()
            .expect("settings mutex poisoned")
            .push(key.to_string());
        Ok(())
    }
}
