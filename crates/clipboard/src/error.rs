//! Error types for clipboard access.

use thiserror::Error;

/// Errors that can occur while talking to the OS clipboard.
#[derive(Debug, Error)]
pub enum ClipboardError {
    /// The clipboard could not be opened.
    #[error("failed to open clipboard: {0}")]
    Unavailable(String),

    /// The OS rejected a write.
    #[error("clipboard write rejected: {0}")]
    WriteRejected(String),

    /// Raw pixels did not match the declared dimensions.
    #[error("image buffer does not match {width}x{height}")]
    InvalidImage { width: usize, height: usize },

    /// PNG encoding or decoding failed.
    #[error("image codec error: {0}")]
    Codec(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, ClipboardError>;
