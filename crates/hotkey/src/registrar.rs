//! One global hotkey per shortcut slot.

use crate::backend::{HotkeyBackendRef, HotkeyId};
use crate::error::Result;
use clipline_settings::{ShortcutBinding, ShortcutSlot};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
struct ActiveHotkey {
    id: HotkeyId,
    binding: ShortcutBinding,
}

/// Keeps at most one registration per [`ShortcutSlot`].
///
/// Registering a slot first releases whatever it held. If the new binding
/// is refused the slot stays empty; the old binding is not restored.
pub struct HotkeyRegistrar {
    backend: HotkeyBackendRef,
    slots: HashMap<ShortcutSlot, ActiveHotkey>,
}

impl HotkeyRegistrar {
    pub fn new(backend: HotkeyBackendRef) -> Self {
        Self {
            backend,
            slots: HashMap::new(),
        }
    }

    pub fn register(&mut self, slot: ShortcutSlot, binding: ShortcutBinding) -> Result<()> {
        self.unregister(slot);

        match self.backend.register(&binding) {
            Ok(id) => {
                tracing::info!(%slot, %binding, "hotkey registered");
                self.slots.insert(slot, ActiveHotkey { id, binding });
                Ok(())
            }
            Err(e) => {
                tracing::warn!(%slot, %binding, error = %e, "hotkey registration failed, slot inactive");
                Err(e)
            }
        }
    }

    /// Release the slot's hotkey. Returns whether one was active.
    pub fn unregister(&mut self, slot: ShortcutSlot) -> bool {
        let Some(active) = self.slots.remove(&slot) else {
            return false;
        };
        if let Err(e) = self.backend.unregister(active.id) {
            tracing::warn!(%slot, error = %e, "failed to unregister hotkey");
        } else {
            tracing::debug!(%slot, binding = %active.binding, "hotkey unregistered");
        }
        true
    }

    pub fn unregister_all(&mut self) {
        for slot in ShortcutSlot::ALL {
            self.unregister(slot);
        }
    }

    /// The binding active for `slot`, if any.
    pub fn binding(&self, slot: ShortcutSlot) -> Option<ShortcutBinding> {
        self.slots.get(&slot).map(|a| a.binding)
    }

    pub fn is_active(&self, slot: ShortcutSlot) -> bool {
        self.slots.contains_key(&slot)
    }

    /// Slots whose hotkey was pressed since the last poll, oldest first.
    pub fn poll_pressed(&self) -> Vec<ShortcutSlot> {
        self.backend
            .poll_pressed()
            .into_iter()
            .filter_map(|id| {
                self.slots
                    .iter()
                    .find(|(_, active)| active.id == id)
                    .map(|(slot, _)| *slot)
            })
            .collect()
    }
}

impl Drop for HotkeyRegistrar {
    fn drop(&mut self) {
        self.unregister_all();
    }
}

impl std::fmt::Debug for HotkeyRegistrar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HotkeyRegistrar")
            .field("slots", &self.slots)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{HotkeyCall, RecordingHotkeyBackend};
    use crate::error::HotkeyError;
    use clipline_settings::Modifiers;
    use std::sync::Arc;

    fn setup() -> (HotkeyRegistrar, Arc<RecordingHotkeyBackend>) {
        let backend = Arc::new(RecordingHotkeyBackend::new());
        (HotkeyRegistrar::new(backend.clone()), backend)
    }

    #[test]
    fn test_register_defaults() {
        let (mut registrar, backend) = setup();
        for slot in ShortcutSlot::ALL {
            registrar.register(slot, slot.default_binding()).unwrap();
        }
        assert_eq!(backend.active_count(), 2);
        assert_eq!(
            registrar.binding(ShortcutSlot::Paste),
            Some(ShortcutBinding::default_paste())
        );
    }

    #[test]
    fn test_reregister_releases_previous() {
        let (mut registrar, backend) = setup();
        registrar
            .register(ShortcutSlot::OpenHistory, ShortcutBinding::default_open())
            .unwrap();
        let replacement = ShortcutBinding::new(0, Modifiers::CONTROL).unwrap();
        registrar
            .register(ShortcutSlot::OpenHistory, replacement)
            .unwrap();

        assert_eq!(backend.active_count(), 1);
        assert!(backend.is_registered(replacement));
        assert!(!backend.is_registered(ShortcutBinding::default_open()));
        assert!(matches!(backend.calls()[1], HotkeyCall::Unregister(_)));
    }

    #[test]
    fn test_rejected_binding_leaves_slot_inactive() {
        let (mut registrar, backend) = setup();
        registrar
            .register(ShortcutSlot::Paste, ShortcutBinding::default_paste())
            .unwrap();

        let taken = ShortcutBinding::new(8, Modifiers::COMMAND).unwrap();
        backend.claim(taken);
        let err = registrar.register(ShortcutSlot::Paste, taken).unwrap_err();

        assert!(matches!(err, HotkeyError::Rejected { .. }));
        assert!(!registrar.is_active(ShortcutSlot::Paste));
        assert_eq!(backend.active_count(), 0);
    }

    #[test]
    fn test_poll_maps_to_slots() {
        let (mut registrar, backend) = setup();
        registrar
            .register(ShortcutSlot::OpenHistory, ShortcutBinding::default_open())
            .unwrap();
        registrar
            .register(ShortcutSlot::Paste, ShortcutBinding::default_paste())
            .unwrap();

        backend.press(ShortcutBinding::default_paste());
        backend.press(ShortcutBinding::default_open());
        assert_eq!(
            registrar.poll_pressed(),
            vec![ShortcutSlot::Paste, ShortcutSlot::OpenHistory]
        );
    }

    #[test]
    fn test_drop_unregisters_everything() {
        let (mut registrar, backend) = setup();
        registrar
            .register(ShortcutSlot::OpenHistory, ShortcutBinding::default_open())
            .unwrap();
        registrar
            .register(ShortcutSlot::Paste, ShortcutBinding::default_paste())
            .unwrap();

        drop(registrar);
        assert_eq!(backend.active_count(), 0);
    }
}
