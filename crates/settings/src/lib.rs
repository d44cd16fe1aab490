//! Settings for clipline.
//!
//! Everything user-adjustable (history bound, shortcuts, launch at login)
//! lives in an opaque [`SettingsStore`] behind a get/set-bytes contract.
//! [`Settings`] layers typed accessors on top with one rule: a corrupt or
//! missing value falls back to its default and is never fatal.

mod error;
mod shortcut;
mod store;

pub use error::{Result, SettingsError};
pub use shortcut::{key_char, key_label, Modifiers, ShortcutBinding, ShortcutSlot, KEY_V};
pub use store::{
    InMemorySettingsStore, SettingsStore, SettingsStoreRef, HISTORY_KEY, LAUNCH_AT_LOGIN_KEY,
    MAX_ITEMS_KEY, OPEN_SHORTCUT_KEY, PASTE_SHORTCUT_KEY,
};

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Default history capacity.
pub const DEFAULT_MAX_ITEMS: usize = 50;

/// Typed view over a [`SettingsStore`].
#[derive(Clone)]
pub struct Settings {
    store: SettingsStoreRef,
}

impl Settings {
    pub fn new(store: SettingsStoreRef) -> Self {
        Self { store }
    }

    /// The underlying byte store.
    pub fn store(&self) -> &SettingsStoreRef {
        &self.store
    }

    /// Binding for `slot`, or the slot default when unset or unreadable.
    pub fn shortcut(&self, slot: ShortcutSlot) -> ShortcutBinding {
        self.read_json(slot.settings_key())
            .unwrap_or_else(|| slot.default_binding())
    }

    /// Validate and persist a binding given as raw key code and modifier bits.
    ///
    /// An empty modifier mask is rejected here, before anything reaches
    /// the hotkey layer.
    pub fn set_shortcut_keys(
        &self,
        slot: ShortcutSlot,
        key_code: u32,
        modifiers: u32,
    ) -> Result<ShortcutBinding> {
        let binding = ShortcutBinding::new(key_code, Modifiers::from_bits_truncate(modifiers))?;
        self.set_shortcut(slot, binding)?;
        Ok(binding)
    }

    /// Persist an already-validated binding.
    pub fn set_shortcut(&self, slot: ShortcutSlot, binding: ShortcutBinding) -> Result<()> {
        self.write_json(slot.settings_key(), &binding)
    }

    /// Restore both slots to their defaults.
    pub fn reset_shortcuts(&self) -> Result<()> {
        for slot in ShortcutSlot::ALL {
            self.set_shortcut(slot, slot.default_binding())?;
        }
        Ok(())
    }

    /// History capacity; at least 1.
    pub fn max_items(&self) -> usize {
        self.read_json::<usize>(MAX_ITEMS_KEY)
            .map(|n| n.max(1))
            .unwrap_or(DEFAULT_MAX_ITEMS)
    }

    /// Persist a new history capacity, returning the clamped value.
    pub fn set_max_items(&self, max_items: usize) -> Result<usize> {
        let max_items = max_items.max(1);
        self.write_json(MAX_ITEMS_KEY, &max_items)?;
        Ok(max_items)
    }

    pub fn launch_at_login(&self) -> bool {
        self.read_json(LAUNCH_AT_LOGIN_KEY).unwrap_or(false)
    }

    pub fn set_launch_at_login(&self, enabled: bool) -> Result<()> {
        self.write_json(LAUNCH_AT_LOGIN_KEY, &enabled)
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let bytes = self.store.get_bytes(key)?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "ignoring unreadable setting");
                None
            }
        }
    }

    fn write_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value).map_err(|source| SettingsError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.store.set_bytes(key, &bytes)
    }
}
