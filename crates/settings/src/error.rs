//! Error types for the settings layer.

use thiserror::Error;

/// Errors that can occur while reading or writing settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A shortcut was given without any modifier key.
    #[error("shortcut needs at least one modifier key (key code {key_code})")]
    MissingModifier { key_code: u32 },

    /// The backing store rejected a write.
    #[error("settings store write failed for '{key}': {reason}")]
    Store { key: String, reason: String },

    /// A value could not be encoded for storage.
    #[error("failed to encode setting '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, SettingsError>;
