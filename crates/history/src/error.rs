//! Error types for the history store.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum HistoryError {
    /// No entry with this identity.
    #[error("history entry {0} not found")]
    NotFound(Uuid),

    /// Writing the entry back to the clipboard failed.
    #[error("clipboard write failed: {0}")]
    Write(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The history could not be encoded for storage.
    #[error("failed to encode history: {0}")]
    Encode(#[from] serde_json::Error),

    /// The settings store rejected the history blob.
    #[error("failed to persist history: {0}")]
    Persist(#[from] clipline_settings::SettingsError),
}

pub type Result<T> = std::result::Result<T, HistoryError>;
