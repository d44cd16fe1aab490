//! Keystroke synthesis backed by enigo.

use crate::error::InputError;
use crate::KeystrokeSynthesizer;
use clipline_settings::Modifiers;
use enigo::{Direction, Enigo, Key, Keyboard, Settings};
use std::cell::RefCell;

/// Modifier keys in press order; released in reverse.
const MODIFIER_KEYS: [(Modifiers, Key); 4] = [
    (Modifiers::COMMAND, Key::Meta),
    (Modifiers::SHIFT, Key::Shift),
    (Modifiers::OPTION, Key::Alt),
    (Modifiers::CONTROL, Key::Control),
];

/// Posts keystrokes through the OS input system.
///
/// The enigo connection is opened on first use when built with
/// [`deferred`](Self::deferred), so a permission granted after startup
/// takes effect without a restart.
pub struct EnigoSynthesizer {
    enigo: RefCell<Option<Enigo>>,
}

impl EnigoSynthesizer {
    /// Create a synthesizer with the input connection open.
    ///
    /// # Errors
    ///
    /// Returns an error if accessibility permissions are not granted (macOS)
    /// or if the input system fails to initialize.
    pub fn new() -> Result<Self, InputError> {
        Ok(Self {
            enigo: RefCell::new(Some(Self::connect()?)),
        })
    }

    /// Create a synthesizer that connects on the first keystroke.
    pub fn deferred() -> Self {
        Self {
            enigo: RefCell::new(None),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.enigo.borrow().is_some()
    }

    fn connect() -> Result<Enigo, InputError> {
        if !crate::has_accessibility_access() {
            return Err(InputError::AccessibilityNotGranted);
        }
        Enigo::new(&Settings::default()).map_err(|e| InputError::InitFailed(e.to_string()))
    }
}

/// The enigo key for a virtual key code.
#[cfg(target_os = "macos")]
fn key_for(key_code: u32) -> Result<Key, InputError> {
    Ok(Key::Other(key_code))
}

/// The enigo key for a virtual key code.
///
/// Off macOS the code is translated through its ANSI character.
#[cfg(not(target_os = "macos"))]
fn key_for(key_code: u32) -> Result<Key, InputError> {
    clipline_settings::key_char(key_code)
        .map(Key::Unicode)
        .ok_or(InputError::UnmappedKey(key_code))
}

impl KeystrokeSynthesizer for EnigoSynthesizer {
    fn post_keystroke(&self, key_code: u32, modifiers: Modifiers) -> Result<(), InputError> {
        let key = key_for(key_code)?;
        let held: Vec<Key> = MODIFIER_KEYS
            .iter()
            .filter(|(m, _)| modifiers.contains(*m))
            .map(|(_, k)| *k)
            .collect();

        let mut slot = self.enigo.borrow_mut();
        if slot.is_none() {
            *slot = Some(Self::connect()?);
            tracing::info!("input connection opened");
        }
        let Some(enigo) = slot.as_mut() else {
            return Err(InputError::InitFailed("input connection missing".into()));
        };
        let mut pressed = Vec::with_capacity(held.len());
        let result = (|| {
            for modifier in &held {
                enigo
                    .key(*modifier, Direction::Press)
                    .map_err(|e| InputError::KeyFailed(e.to_string()))?;
                pressed.push(*modifier);
            }
            enigo
                .key(key, Direction::Press)
                .map_err(|e| InputError::KeyFailed(e.to_string()))?;
            enigo
                .key(key, Direction::Release)
                .map_err(|e| InputError::KeyFailed(e.to_string()))
        })();

        // Never leave a modifier stuck down, even after a failure.
        for modifier in pressed.iter().rev() {
            if let Err(e) = enigo.key(*modifier, Direction::Release) {
                tracing::warn!(error = %e, "failed to release modifier");
            }
        }

        if result.is_ok() {
            tracing::debug!(key_code, modifiers = modifiers.bits(), "posted keystroke");
        }
        result
    }
}

impl std::fmt::Debug for EnigoSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnigoSynthesizer").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_order() {
        let mods = Modifiers::CONTROL | Modifiers::COMMAND;
        let held: Vec<Key> = MODIFIER_KEYS
            .iter()
            .filter(|(m, _)| mods.contains(*m))
            .map(|(_, k)| *k)
            .collect();
        assert_eq!(held, vec![Key::Meta, Key::Control]);
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn test_key_for_translates_ansi_codes() {
        assert!(matches!(key_for(9), Ok(Key::Unicode('v'))));
        assert!(matches!(key_for(36), Err(InputError::UnmappedKey(36))));
    }

    #[test]
    fn test_deferred_starts_disconnected() {
        assert!(!EnigoSynthesizer::deferred().is_connected());
    }

    #[test]
    fn test_new_without_access() {
        // Skip if accessibility is granted or no display is available.
        match EnigoSynthesizer::new() {
            Ok(_) => {}
            Err(InputError::AccessibilityNotGranted) | Err(InputError::InitFailed(_)) => {}
            Err(e) => panic!("Unexpected error: {}", e),
        }
    }
}
