//! Focus-restoring paste.
//!
//! A paste runs in five steps:
//!
//! 1. write the chosen snapshot to the clipboard
//! 2. record the resulting change count so the poller skips our own write
//! 3. hide clipline's own surfaces
//! 4. re-activate the focus witness, if there is one
//! 5. after the settle delay, post the paste keystroke
//!
//! [`PastePipeline`] owns the capabilities for each step. The engine decides
//! which steps run (the paste hotkey skips 1 and 2) and schedules step 5.

use clipline_clipboard::{write_snapshot, ChangePoller, ClipboardError, ClipboardRef, ClipboardSnapshot};
use clipline_focus::{AppInfo, FocusProviderRef, SurfaceHiderRef};
use clipline_history::HistoryError;
use clipline_input::{InputError, KeystrokeSynthesizerRef};
use clipline_settings::ShortcutBinding;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum PasteError {
    #[error("Clipboard write failed: {0}")]
    Clipboard(#[from] ClipboardError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error("Paste keystroke failed: {0}")]
    Keystroke(#[from] InputError),
}

/// What a paste puts in front of the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasteSource {
    /// A history entry chosen by identity.
    Entry(Uuid),
    /// Whatever the clipboard already holds (the paste hotkey).
    Clipboard,
}

impl PasteSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PasteSource::Entry(_) => "entry",
            PasteSource::Clipboard => "clipboard",
        }
    }
}

impl std::fmt::Display for PasteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct PastePipeline {
    clipboard: ClipboardRef,
    focus: FocusProviderRef,
    hider: SurfaceHiderRef,
    keystrokes: KeystrokeSynthesizerRef,
    settle_delay: Duration,
}

impl PastePipeline {
    pub fn new(
        clipboard: ClipboardRef,
        focus: FocusProviderRef,
        hider: SurfaceHiderRef,
        keystrokes: KeystrokeSynthesizerRef,
        settle_delay: Duration,
    ) -> Self {
        Self {
            clipboard,
            focus,
            hider,
            keystrokes,
            settle_delay,
        }
    }

    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    /// Steps 1 and 2: put `snapshot` on the clipboard and tell the poller
    /// the resulting change is ours.
    pub fn write(
        &self,
        snapshot: &ClipboardSnapshot,
        poller: &mut ChangePoller,
    ) -> Result<(), PasteError> {
        write_snapshot(self.clipboard.as_ref(), snapshot)?;
        poller.record_own_write(self.clipboard.change_count());
        tracing::debug!(id = %snapshot.id(), kind = ?snapshot.kind(), "wrote snapshot to clipboard");
        Ok(())
    }

    /// Steps 3 and 4. Returns whether a witness was re-activated.
    ///
    /// A failed activation is logged and the paste continues; the keystroke
    /// then lands wherever focus happens to be.
    pub fn restore_focus(&self, witness: Option<&AppInfo>) -> bool {
        self.hider.hide_own_surfaces();

        let Some(app) = witness else {
            tracing::debug!("no focus witness, pasting into current focus");
            return false;
        };
        match self.focus.activate(app) {
            Ok(()) => {
                tracing::debug!(app = %app, "re-activated focus witness");
                true
            }
            Err(e) => {
                tracing::warn!(app = %app, error = %e, "failed to re-activate focus witness");
                false
            }
        }
    }

    /// Step 5: post the paste keystroke described by `binding`.
    pub fn post_keystroke(&self, binding: ShortcutBinding) -> Result<(), PasteError> {
        self.keystrokes
            .post_keystroke(binding.key_code(), binding.modifiers())?;
        tracing::debug!(%binding, "posted paste keystroke");
        Ok(())
    }
}

impl std::fmt::Debug for PastePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PastePipeline")
            .field("settle_delay", &self.settle_delay)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipline_clipboard::{ClipboardAccess, MemoryClipboard, PollOutcome};
    use clipline_focus::ScriptedFocus;
    use clipline_input::RecordingKeystrokes;
    use clipline_settings::{Modifiers, KEY_V};
    use std::sync::Arc;

    struct Fixture {
        clipboard: Arc<MemoryClipboard>,
        focus: ScriptedFocus,
        keystrokes: Arc<RecordingKeystrokes>,
        pipeline: PastePipeline,
    }

    fn fixture() -> Fixture {
        let clipboard = Arc::new(MemoryClipboard::new());
        let focus = ScriptedFocus::new();
        let keystrokes = Arc::new(RecordingKeystrokes::new());
        let pipeline = PastePipeline::new(
            clipboard.clone(),
            Arc::new(focus.clone()),
            Arc::new(focus.clone()),
            keystrokes.clone(),
            Duration::from_millis(250),
        );
        Fixture {
            clipboard,
            focus,
            keystrokes,
            pipeline,
        }
    }

    #[test]
    fn test_write_suppresses_own_change() {
        let f = fixture();
        let mut poller = ChangePoller::default();
        poller.start(f.clipboard.as_ref());

        let snapshot = ClipboardSnapshot::text("hello", chrono::Utc::now());
        f.pipeline.write(&snapshot, &mut poller).unwrap();

        assert_eq!(f.clipboard.content().text.as_deref(), Some("hello"));
        assert_eq!(poller.baseline(), f.clipboard.change_count());
        assert!(matches!(
            poller.tick(f.clipboard.as_ref(), chrono::Utc::now()),
            PollOutcome::Unchanged
        ));
    }

    #[test]
    fn test_write_failure_leaves_baseline() {
        let f = fixture();
        let mut poller = ChangePoller::default();
        poller.start(f.clipboard.as_ref());
        let before = poller.baseline();

        f.clipboard.fail_writes(true);
        let snapshot = ClipboardSnapshot::text("hello", chrono::Utc::now());
        let err = f.pipeline.write(&snapshot, &mut poller).unwrap_err();

        assert!(matches!(err, PasteError::Clipboard(_)));
        assert_eq!(poller.baseline(), before);
    }

    #[test]
    fn test_restore_focus_without_witness() {
        let f = fixture();
        assert!(!f.pipeline.restore_focus(None));
        assert_eq!(f.focus.hide_count(), 1);
        assert!(f.focus.activations().is_empty());
    }

    #[test]
    fn test_restore_focus_activates_witness() {
        let f = fixture();
        let editor = AppInfo::new(42).with_name("Editor");
        assert!(f.pipeline.restore_focus(Some(&editor)));
        assert_eq!(f.focus.activations(), vec![editor]);
    }

    #[test]
    fn test_restore_focus_activation_failure_is_soft() {
        let f = fixture();
        f.focus.fail_activation(true);
        assert!(!f.pipeline.restore_focus(Some(&AppInfo::new(42))));
        assert_eq!(f.focus.hide_count(), 1);
    }

    #[test]
    fn test_post_keystroke_uses_binding() {
        let f = fixture();
        f.pipeline
            .post_keystroke(ShortcutBinding::default_paste())
            .unwrap();
        let posted = f.keystrokes.posted();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].key_code, KEY_V);
        assert_eq!(posted[0].modifiers, Modifiers::COMMAND);
    }
}
