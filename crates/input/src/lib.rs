//! Input synthesis for clipline.
//!
//! The paste pipeline ends with a synthetic paste keystroke posted to
//! whatever application has focus. [`KeystrokeSynthesizer`] is the seam:
//! [`EnigoSynthesizer`] posts real events, [`RecordingKeystrokes`] records
//! them for tests.
//!
//! On macOS, posting input requires the Accessibility permission; see
//! [`has_accessibility_access`] and [`ensure_accessibility_access`].

mod error;
mod recording;
mod synthesizer;

#[cfg(target_os = "macos")]
mod macos;

use clipline_settings::Modifiers;
use std::sync::Arc;

pub use error::InputError;
pub use recording::{PostedKeystroke, RecordingKeystrokes};
pub use synthesizer::EnigoSynthesizer;

/// Posts a single key combination.
pub trait KeystrokeSynthesizer {
    /// Press `modifiers`, press and release `key_code`, release `modifiers`.
    ///
    /// `key_code` is a macOS virtual key code.
    fn post_keystroke(&self, key_code: u32, modifiers: Modifiers) -> Result<(), InputError>;
}

/// Type alias for a shared synthesizer.
pub type KeystrokeSynthesizerRef = Arc<dyn KeystrokeSynthesizer>;

/// Check if the application has accessibility permissions.
///
/// On other platforms, always returns `true`.
pub fn has_accessibility_access() -> bool {
    #[cfg(target_os = "macos")]
    {
        macos::has_accessibility_access()
    }
    #[cfg(not(target_os = "macos"))]
    {
        true
    }
}

/// Check if accessibility is granted, showing the system prompt if not.
///
/// Returns `true` if access is granted. Even after prompting this stays
/// `false` until the user grants permission.
///
/// On non-macOS platforms, always returns `true`.
pub fn ensure_accessibility_access() -> bool {
    #[cfg(target_os = "macos")]
    {
        macos::ensure_accessibility_access()
    }
    #[cfg(not(target_os = "macos"))]
    {
        true
    }
}
