//! Error types for hotkey registration.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HotkeyError {
    /// The key code has no global-shortcut equivalent.
    #[error("key code {0} cannot be used in a global shortcut")]
    UnsupportedKey(u32),

    /// The OS refused the combination, typically because it is taken.
    #[error("shortcut {binding} was rejected: {reason}")]
    Rejected { binding: String, reason: String },

    /// The hotkey backend could not be created or failed to unregister.
    #[error("hotkey backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, HotkeyError>;
