//! Error types for input synthesis.

use thiserror::Error;

/// Errors that can occur while posting synthetic input.
#[derive(Debug, Error)]
pub enum InputError {
    /// Accessibility permission not granted (macOS).
    #[error("accessibility permission not granted - open System Settings > Privacy & Security > Accessibility")]
    AccessibilityNotGranted,

    /// Failed to initialize the input backend.
    #[error("failed to initialize input backend: {0}")]
    InitFailed(String),

    /// The key code has no equivalent on this platform.
    #[error("key code {0} cannot be synthesized on this platform")]
    UnmappedKey(u32),

    /// Failed to simulate a key press.
    #[error("failed to simulate key: {0}")]
    KeyFailed(String),
}
