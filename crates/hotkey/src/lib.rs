//! Global shortcuts for clipline.
//!
//! [`HotkeyRegistrar`] owns one registration per [`ShortcutSlot`] on top
//! of a [`HotkeyBackend`]. [`GlobalHotkeyBackend`] talks to the OS through
//! `global-hotkey`; [`RecordingHotkeyBackend`] is the test double.
//!
//! Bindings arrive already validated: a modifier-less binding cannot be
//! constructed, so it never reaches the OS.
//!
//! [`ShortcutSlot`]: clipline_settings::ShortcutSlot

mod backend;
mod error;
mod keymap;
mod registrar;

pub use backend::{
    to_hotkey, GlobalHotkeyBackend, HotkeyBackend, HotkeyBackendRef, HotkeyCall, HotkeyId,
    RecordingHotkeyBackend,
};
pub use error::{HotkeyError, Result};
pub use keymap::code_for;
pub use registrar::HotkeyRegistrar;
