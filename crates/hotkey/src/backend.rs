//! Global hotkey backends.

use crate::error::{HotkeyError, Result};
use crate::keymap::code_for;
use clipline_settings::{Modifiers as Carbon, ShortcutBinding};
use global_hotkey::hotkey::{HotKey, Modifiers};
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Identity of a registered hotkey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HotkeyId(pub u32);

/// Process-wide global shortcut registration.
pub trait HotkeyBackend {
    fn register(&self, binding: &ShortcutBinding) -> Result<HotkeyId>;

    fn unregister(&self, id: HotkeyId) -> Result<()>;

    /// Hotkeys pressed since the last call, oldest first.
    fn poll_pressed(&self) -> Vec<HotkeyId>;
}

pub type HotkeyBackendRef = Arc<dyn HotkeyBackend>;

/// Convert a binding to a `global-hotkey` combination.
pub fn to_hotkey(binding: &ShortcutBinding) -> Result<HotKey> {
    let code = code_for(binding.key_code()).ok_or(HotkeyError::UnsupportedKey(binding.key_code()))?;
    let carbon = binding.modifiers();
    let mut mods = Modifiers::empty();
    if carbon.contains(Carbon::COMMAND) {
        mods |= Modifiers::META;
    }
    if carbon.contains(Carbon::SHIFT) {
        mods |= Modifiers::SHIFT;
    }
    if carbon.contains(Carbon::OPTION) {
        mods |= Modifiers::ALT;
    }
    if carbon.contains(Carbon::CONTROL) {
        mods |= Modifiers::CONTROL;
    }
    Ok(HotKey::new(Some(mods), code))
}

/// Backend using the `global-hotkey` crate.
///
/// Events are read from the crate's global receiver, so the owning thread
/// must run the platform event loop.
pub struct GlobalHotkeyBackend {
    manager: GlobalHotKeyManager,
    registered: RefCell<HashMap<HotkeyId, HotKey>>,
}

impl GlobalHotkeyBackend {
    pub fn new() -> Result<Self> {
        tracing::info!("Initializing global hotkey manager");
        let manager = GlobalHotKeyManager::new()
            .map_err(|e| HotkeyError::Backend(format!("failed to create hotkey manager: {e}")))?;
        Ok(Self {
            manager,
            registered: RefCell::new(HashMap::new()),
        })
    }
}

impl HotkeyBackend for GlobalHotkeyBackend {
    fn register(&self, binding: &ShortcutBinding) -> Result<HotkeyId> {
        let hotkey = to_hotkey(binding)?;
        self.manager
            .register(hotkey)
            .map_err(|e| HotkeyError::Rejected {
                binding: binding.display(),
                reason: e.to_string(),
            })?;
        let id = HotkeyId(hotkey.id());
        self.registered.borrow_mut().insert(id, hotkey);
        Ok(id)
    }

    fn unregister(&self, id: HotkeyId) -> Result<()> {
        let Some(hotkey) = self.registered.borrow_mut().remove(&id) else {
            return Ok(());
        };
        self.manager
            .unregister(hotkey)
            .map_err(|e| HotkeyError::Backend(format!("failed to unregister hotkey: {e}")))
    }

    fn poll_pressed(&self) -> Vec<HotkeyId> {
        let registered = self.registered.borrow();
        GlobalHotKeyEvent::receiver()
            .try_iter()
            .filter(|event| event.state == HotKeyState::Pressed)
            .map(|event| HotkeyId(event.id))
            .filter(|id| registered.contains_key(id))
            .collect()
    }
}

impl Drop for GlobalHotkeyBackend {
    fn drop(&mut self) {
        for (_, hotkey) in self.registered.get_mut().drain() {
            let _ = self.manager.unregister(hotkey);
        }
    }
}

/// One call made against a [`RecordingHotkeyBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HotkeyCall {
    Register(ShortcutBinding),
    Unregister(HotkeyId),
}

#[derive(Default)]
struct Recording {
    next_id: u32,
    active: HashMap<HotkeyId, ShortcutBinding>,
    claimed: Vec<ShortcutBinding>,
    pressed: Vec<HotkeyId>,
    calls: Vec<HotkeyCall>,
}

/// In-memory backend for tests.
///
/// Bindings marked with [`claim`](Self::claim) are rejected as if another
/// application owned them, and so is registering the same combination twice.
#[derive(Default)]
pub struct RecordingHotkeyBackend {
    state: Mutex<Recording>,
}

impl RecordingHotkeyBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Recording> {
        self.state.lock().expect("hotkey mutex poisoned")
    }

    /// Pretend another application owns `binding`.
    pub fn claim(&self, binding: ShortcutBinding) {
        self.lock().claimed.push(binding);
    }

    /// Simulate the user pressing `binding`. Returns false if not registered.
    pub fn press(&self, binding: ShortcutBinding) -> bool {
        let mut state = self.lock();
        let id = state
            .active
            .iter()
            .find(|(_, b)| **b == binding)
            .map(|(id, _)| *id);
        match id {
            Some(id) => {
                state.pressed.push(id);
                true
            }
            None => false,
        }
    }

    pub fn is_registered(&self, binding: ShortcutBinding) -> bool {
        self.lock().active.values().any(|b| *b == binding)
    }

    pub fn active_count(&self) -> usize {
        self.lock().active.len()
    }

    pub fn calls(&self) -> Vec<HotkeyCall> {
        self.lock().calls.clone()
    }
}

impl HotkeyBackend for RecordingHotkeyBackend {
    fn register(&self, binding: &ShortcutBinding) -> Result<HotkeyId> {
        let mut state = self.lock();
        state.calls.push(HotkeyCall::Register(*binding));
        if state.claimed.contains(binding) || state.active.values().any(|b| b == binding) {
            return Err(HotkeyError::Rejected {
                binding: binding.display(),
                reason: "already registered".into(),
            });
        }
        state.next_id += 1;
        let id = HotkeyId(state.next_id);
        state.active.insert(id, *binding);
        Ok(id)
    }

    fn unregister(&self, id: HotkeyId) -> Result<()> {
        let mut state = self.lock();
        state.calls.push(HotkeyCall::Unregister(id));
        state.active.remove(&id);
        state.pressed.retain(|p| *p != id);
        Ok(())
    }

    fn poll_pressed(&self) -> Vec<HotkeyId> {
        std::mem::take(&mut self.lock().pressed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use global_hotkey::hotkey::Code;

    #[test]
    fn test_to_hotkey_maps_modifiers() {
        let hotkey = to_hotkey(&ShortcutBinding::default_open()).unwrap();
        let expected = HotKey::new(Some(Modifiers::META | Modifiers::SHIFT), Code::KeyV);
        assert_eq!(hotkey.id(), expected.id());
    }

    #[test]
    fn test_to_hotkey_unsupported_key() {
        let binding = ShortcutBinding::new(200, Carbon::COMMAND).unwrap();
        assert!(matches!(
            to_hotkey(&binding),
            Err(HotkeyError::UnsupportedKey(200))
        ));
    }

    #[test]
    fn test_recording_rejects_duplicates() {
        let backend = RecordingHotkeyBackend::new();
        let binding = ShortcutBinding::default_paste();
        let id = backend.register(&binding).unwrap();
        assert!(backend.register(&binding).is_err());

        backend.unregister(id).unwrap();
        assert!(backend.register(&binding).is_ok());
    }

    #[test]
    fn test_recording_press_queue() {
        let backend = RecordingHotkeyBackend::new();
        let binding = ShortcutBinding::default_open();
        assert!(!backend.press(binding));

        let id = backend.register(&binding).unwrap();
        assert!(backend.press(binding));
        assert_eq!(backend.poll_pressed(), vec![id]);
        assert!(backend.poll_pressed().is_empty());
    }
}
