//! Recording synthesizer for tests and headless runs.

use crate::error::InputError;
use crate::KeystrokeSynthesizer;
use clipline_settings::Modifiers;
use std::sync::Mutex;

/// A keystroke as it was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostedKeystroke {
    pub key_code: u32,
    pub modifiers: Modifiers,
}

/// Records keystrokes instead of posting them.
#[derive(Debug, Default)]
pub struct RecordingKeystrokes {
    posted: Mutex<Vec<PostedKeystroke>>,
    fail: Mutex<bool>,
}

impl RecordingKeystrokes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn posted(&self) -> Vec<PostedKeystroke> {
        self.posted.lock().expect("keystroke mutex poisoned").clone()
    }

    pub fn count(&self) -> usize {
        self.posted.lock().expect("keystroke mutex poisoned").len()
    }

    /// Make subsequent keystrokes fail.
    pub fn fail(&self, fail: bool) {
        *self.fail.lock().expect("keystroke mutex poisoned") = fail;
    }
}

impl KeystrokeSynthesizer for RecordingKeystrokes {
    fn post_keystroke(&self, key_code: u32, modifiers: Modifiers) -> Result<(), InputError> {
        if *self.fail.lock().expect("keystroke mutex poisoned") {
            return Err(InputError::KeyFailed("synthetic input disabled".into()));
        }
        self.posted
            .lock()
            .expect("keystroke mutex poisoned")
            .push(PostedKeystroke {
                key_code,
                modifiers,
            });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order() {
        let keys = RecordingKeystrokes::new();
        keys.post_keystroke(9, Modifiers::COMMAND).unwrap();
        keys.post_keystroke(8, Modifiers::CONTROL).unwrap();

        let posted = keys.posted();
        assert_eq!(posted.len(), 2);
        assert_eq!(posted[0].key_code, 9);
        assert_eq!(posted[1].modifiers, Modifiers::CONTROL);
    }

    #[test]
    fn test_failure_records_nothing() {
        let keys = RecordingKeystrokes::new();
        keys.fail(true);
        assert!(keys.post_keystroke(9, Modifiers::COMMAND).is_err());
        assert_eq!(keys.count(), 0);
    }
}
