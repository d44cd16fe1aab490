//! The single coordination context.
//!
//! [`Engine`] owns every component and is driven from one thread: the
//! owner feeds it [`EngineEvent`]s as they arrive and calls
//! [`Engine::run_due`] whenever [`Engine::next_deadline`] passes. Nothing
//! inside blocks or sleeps, so a handler's steps never interleave with
//! another handler's.

use crate::constants::{DEFAULT_SETTLE_DELAY, PASTE_HOTKEY_REARM_DELAY};
use crate::error::{EngineError, Result};
use crate::paste::{PasteError, PastePipeline, PasteSource};
use crate::scheduler::{ClockRef, Scheduler, TaskId};
use clipline_clipboard::{
    ChangePoller, ClipboardRef, ClipboardSnapshot, PollOutcome, SnapshotReader,
    DEFAULT_POLL_INTERVAL, MAX_IMAGE_BYTES,
};
use clipline_events::{
    emit_event, event_names, EventBusRef, HotkeyStatusEvent, OpenHistoryRequestedEvent,
    PasteCompletedEvent, PasteFailedEvent,
};
use clipline_focus::{
    AppInfo, DeactivationSink, FocusProviderRef, FocusSubscription, FocusTracker, SurfaceHiderRef,
};
use clipline_history::HistoryStore;
use clipline_hotkey::{HotkeyBackendRef, HotkeyError, HotkeyRegistrar};
use clipline_input::KeystrokeSynthesizerRef;
use clipline_settings::{Settings, SettingsStoreRef, ShortcutBinding, ShortcutSlot};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Timing and limits.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub poll_interval: Duration,
    pub settle_delay: Duration,
    pub max_image_bytes: usize,
    /// Process treated as "self" by the focus tracker.
    pub self_pid: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            settle_delay: DEFAULT_SETTLE_DELAY,
            max_image_bytes: MAX_IMAGE_BYTES,
            self_pid: std::process::id() as i32,
        }
    }
}

/// The capabilities an engine is assembled from.
pub struct EngineParts {
    pub clipboard: ClipboardRef,
    pub focus: FocusProviderRef,
    pub hider: SurfaceHiderRef,
    pub keystrokes: KeystrokeSynthesizerRef,
    pub hotkeys: HotkeyBackendRef,
    pub settings: SettingsStoreRef,
    pub events: EventBusRef,
    pub clock: ClockRef,
}

/// External input to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Another application lost foreground focus.
    AppDeactivated(AppInfo),
    /// A registered global shortcut was pressed.
    HotkeyPressed(ShortcutSlot),
}

/// Deferred work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    PollClipboard,
    PasteKeystroke { source: PasteSource, refocused: bool },
    /// Give the paste slot its global hotkey back after our own keystroke.
    RearmPasteHotkey,
}

pub struct Engine {
    config: EngineConfig,
    settings: Settings,
    history: HistoryStore,
    poller: ChangePoller,
    tracker: FocusTracker,
    pipeline: PastePipeline,
    registrar: HotkeyRegistrar,
    scheduler: Scheduler<Task>,
    clipboard: ClipboardRef,
    focus: FocusProviderRef,
    events: EventBusRef,
    clock: ClockRef,
    subscription: Option<FocusSubscription>,
    poll_task: Option<TaskId>,
    /// The paste slot is unregistered while our own keystroke is in flight.
    paste_hotkey_suspended: bool,
    rearm_task: Option<TaskId>,
    running: bool,
}

impl Engine {
    /// Assemble the engine and load persisted history.
    pub fn new(parts: EngineParts, config: EngineConfig) -> Self {
        let settings = Settings::new(parts.settings.clone());
        let history = HistoryStore::load(parts.settings, parts.events.clone(), settings.max_items());
        let poller = ChangePoller::new(SnapshotReader::new(config.max_image_bytes));
        let pipeline = PastePipeline::new(
            parts.clipboard.clone(),
            parts.focus.clone(),
            parts.hider,
            parts.keystrokes,
            config.settle_delay,
        );

        Self {
            tracker: FocusTracker::new(config.self_pid),
            registrar: HotkeyRegistrar::new(parts.hotkeys),
            scheduler: Scheduler::new(),
            clipboard: parts.clipboard,
            focus: parts.focus,
            events: parts.events,
            clock: parts.clock,
            subscription: None,
            poll_task: None,
            paste_hotkey_suspended: false,
            rearm_task: None,
            running: false,
            config,
            settings,
            history,
            poller,
            pipeline,
        }
    }

    /// Seed the focus witness, subscribe to deactivations, register both
    /// shortcuts and arm the poller.
    ///
    /// `deactivations` receives every "application lost focus" notification;
    /// the owner is expected to turn each into
    /// [`EngineEvent::AppDeactivated`].
    pub fn start(&mut self, deactivations: DeactivationSink) {
        if self.running {
            tracing::warn!("engine already running");
            return;
        }

        self.tracker.initialize(self.focus.as_ref());
        match self.focus.subscribe_deactivations(deactivations) {
            Ok(subscription) => self.subscription = Some(subscription),
            Err(e) => {
                tracing::warn!(error = %e, "focus notifications unavailable, witness updates only on open")
            }
        }

        if let Err(e) = self.register_hotkeys() {
            tracing::warn!(error = %e, "not every shortcut could be registered");
        }

        self.poller.start(self.clipboard.as_ref());
        self.schedule_poll();
        self.running = true;

        tracing::info!(
            entries = self.history.len(),
            max_items = self.history.max_items(),
            poll_interval_ms = self.config.poll_interval.as_millis() as u64,
            "engine started"
        );
    }

    /// Stop polling, release the focus observer and every hotkey, drop
    /// pending keystrokes and flush history.
    pub fn shutdown(&mut self) {
        if !self.running {
            return;
        }
        self.poller.stop();
        if let Some(id) = self.poll_task.take() {
            self.scheduler.cancel(id);
        }
        if !self.scheduler.is_empty() {
            tracing::debug!(pending = self.scheduler.len(), "dropping pending tasks");
            self.scheduler.clear();
        }
        self.rearm_task = None;
        self.paste_hotkey_suspended = false;
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
        }
        self.registrar.unregister_all();
        if let Err(e) = self.history.save() {
            tracing::warn!(error = %e, "failed to flush history on shutdown");
        }
        self.running = false;
        tracing::info!("engine stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn handle(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::AppDeactivated(app) => {
                self.tracker.on_deactivated(app);
            }
            EngineEvent::HotkeyPressed(ShortcutSlot::OpenHistory) => self.open_history(),
            EngineEvent::HotkeyPressed(ShortcutSlot::Paste) => {
                if self.paste_hotkey_suspended {
                    tracing::debug!("ignoring paste hotkey raised by our own keystroke");
                    return;
                }
                self.paste_clipboard();
            }
        }
    }

    /// Dispatch every hotkey pressed since the last call.
    pub fn poll_hotkeys(&mut self) -> usize {
        let pressed = self.registrar.poll_pressed();
        let count = pressed.len();
        for slot in pressed {
            self.handle(EngineEvent::HotkeyPressed(slot));
        }
        count
    }

    /// Run every task whose deadline has passed. Returns how many ran.
    pub fn run_due(&mut self) -> usize {
        let mut ran = 0;
        while let Some((id, task)) = self.scheduler.pop_due(self.clock.now()) {
            ran += 1;
            match task {
                Task::PollClipboard => {
                    if self.poll_task == Some(id) {
                        self.poll_task = None;
                    }
                    self.poll_clipboard();
                    self.schedule_poll();
                }
                Task::PasteKeystroke { source, refocused } => {
                    self.finish_paste(source, refocused);
                }
                Task::RearmPasteHotkey => {
                    if self.rearm_task == Some(id) {
                        self.rearm_task = None;
                    }
                    self.rearm_paste_hotkey();
                }
            }
        }
        ran
    }

    /// When the next scheduled task is due, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    pub fn pending_tasks(&self) -> usize {
        self.scheduler.len()
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn entries(&self) -> &[ClipboardSnapshot] {
        self.history.entries()
    }

    pub fn search(&self, query: &str) -> Vec<&ClipboardSnapshot> {
        self.history.search(query)
    }

    pub fn delete(&mut self, id: Uuid) -> bool {
        self.history.delete(id)
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Write entry `id` to the clipboard and move it to the front, without
    /// pasting.
    pub fn promote(&mut self, id: Uuid) -> Result<ClipboardSnapshot> {
        self.flush_keystrokes_before_write(id);
        let now = self.clock.wall();
        let pipeline = &self.pipeline;
        let poller = &mut self.poller;
        self.history
            .promote(id, now, |snapshot| pipeline.write(snapshot, poller))
            .map_err(|e| {
                tracing::warn!(%id, error = %e, "promote failed");
                EngineError::Paste(PasteError::History(e))
            })
    }

    // ------------------------------------------------------------------
    // Paste
    // ------------------------------------------------------------------

    /// Paste entry `id` into the focus witness.
    ///
    /// Writes and promotes the entry, hides our surfaces and re-activates
    /// the witness now; the keystroke follows after the settle delay. If
    /// the write fails nothing else happens.
    ///
    /// Keystrokes still waiting from earlier pastes are posted first, so
    /// each one pastes the content its own paste wrote.
    pub fn paste_entry(&mut self, id: Uuid) -> Result<TaskId> {
        let source = PasteSource::Entry(id);
        self.flush_keystrokes_before_write(id);
        let now = self.clock.wall();
        let pipeline = &self.pipeline;
        let poller = &mut self.poller;
        if let Err(e) = self
            .history
            .promote(id, now, |snapshot| pipeline.write(snapshot, poller))
        {
            return Err(self.paste_failed(source, PasteError::History(e)));
        }
        Ok(self.schedule_keystroke(source))
    }

    /// Paste whatever the clipboard holds into the focus witness.
    pub fn paste_clipboard(&mut self) -> TaskId {
        self.schedule_keystroke(PasteSource::Clipboard)
    }

    pub fn witness(&self) -> Option<&AppInfo> {
        self.tracker.witness()
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Persist a new history bound and apply it. Returns the clamped value.
    pub fn set_max_items(&mut self, max_items: usize) -> Result<usize> {
        let max_items = self.settings.set_max_items(max_items)?;
        self.history.set_max_items(max_items);
        Ok(max_items)
    }

    /// Validate, persist and register a new binding for `slot`.
    ///
    /// A binding without modifiers is rejected before it reaches the
    /// hotkey backend. If the backend refuses a valid binding it stays
    /// persisted but the slot is left inactive.
    pub fn set_shortcut(
        &mut self,
        slot: ShortcutSlot,
        key_code: u32,
        modifiers: u32,
    ) -> Result<ShortcutBinding> {
        let binding = self.settings.set_shortcut_keys(slot, key_code, modifiers)?;
        if slot == ShortcutSlot::Paste {
            self.end_paste_hotkey_suspension();
        }
        self.register_hotkey(slot, binding)?;
        Ok(binding)
    }

    pub fn reset_shortcuts(&mut self) -> Result<()> {
        self.settings.reset_shortcuts()?;
        self.end_paste_hotkey_suspension();
        self.register_hotkeys()?;
        Ok(())
    }

    /// The binding currently registered for `slot`.
    pub fn active_binding(&self, slot: ShortcutSlot) -> Option<ShortcutBinding> {
        self.registrar.binding(slot)
    }

    pub fn launch_at_login(&self) -> bool {
        self.settings.launch_at_login()
    }

    pub fn set_launch_at_login(&mut self, enabled: bool) -> Result<()> {
        self.settings.set_launch_at_login(enabled)?;
        tracing::info!(enabled, "launch at login updated");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn open_history(&mut self) {
        self.tracker.record_frontmost(self.focus.as_ref());
        let target_app = self.tracker.witness().map(AppInfo::label);
        tracing::debug!(target_app = ?target_app, "open history requested");
        emit_event(
            self.events.as_ref(),
            event_names::HISTORY_OPEN_REQUESTED,
            &OpenHistoryRequestedEvent { target_app },
        );
    }

    fn schedule_poll(&mut self) {
        if !self.poller.is_armed() || self.poll_task.is_some() {
            return;
        }
        let id = self.scheduler.schedule_after(
            self.clock.now(),
            self.config.poll_interval,
            Task::PollClipboard,
        );
        self.poll_task = Some(id);
    }

    fn poll_clipboard(&mut self) {
        match self.poller.tick(self.clipboard.as_ref(), self.clock.wall()) {
            PollOutcome::Changed(snapshot) => self.history.capture(snapshot),
            PollOutcome::Unreadable => {
                tracing::trace!("clipboard changed to nothing we keep");
            }
            PollOutcome::Idle | PollOutcome::Unchanged => {}
        }
    }

    /// Steps 3 and 4 now, step 5 after the settle delay.
    fn schedule_keystroke(&mut self, source: PasteSource) -> TaskId {
        let refocused = self.pipeline.restore_focus(self.tracker.witness());
        let id = self.scheduler.schedule_after(
            self.clock.now(),
            self.pipeline.settle_delay(),
            Task::PasteKeystroke { source, refocused },
        );
        tracing::debug!(%source, refocused, "paste keystroke scheduled");
        id
    }

    /// Post every keystroke still waiting in the settle delay before the
    /// clipboard is overwritten for `id`. Nothing is posted if `id` is
    /// unknown, since no write follows.
    fn flush_keystrokes_before_write(&mut self, id: Uuid) {
        if self.history.get(id).is_none() {
            return;
        }
        let pending = self
            .scheduler
            .take_where(|task| matches!(task, Task::PasteKeystroke { .. }));
        for (_, task) in pending {
            if let Task::PasteKeystroke { source, refocused } = task {
                tracing::debug!(%source, "posting pending keystroke ahead of a new clipboard write");
                self.finish_paste(source, refocused);
            }
        }
    }

    fn finish_paste(&mut self, source: PasteSource, refocused: bool) {
        let binding = self.settings.shortcut(ShortcutSlot::Paste);
        self.suspend_paste_hotkey(binding);
        match self.pipeline.post_keystroke(binding) {
            Ok(()) => emit_event(
                self.events.as_ref(),
                event_names::PASTE_COMPLETED,
                &PasteCompletedEvent {
                    source: source.as_str().to_string(),
                    refocused,
                },
            ),
            Err(e) => {
                self.paste_failed(source, e);
            }
        }
    }

    fn paste_failed(&self, source: PasteSource, error: PasteError) -> EngineError {
        tracing::warn!(%source, error = %error, "paste aborted");
        emit_event(
            self.events.as_ref(),
            event_names::PASTE_FAILED,
            &PasteFailedEvent {
                source: source.as_str().to_string(),
                error: error.to_string(),
            },
        );
        EngineError::Paste(error)
    }

    /// Release the paste slot's hotkey while `posted` is in flight, so the
    /// synthetic keystroke reaches the target instead of our own hook.
    /// Repeated keystrokes push the re-arm deadline back.
    fn suspend_paste_hotkey(&mut self, posted: ShortcutBinding) {
        if self.registrar.binding(ShortcutSlot::Paste) == Some(posted) {
            self.registrar.unregister(ShortcutSlot::Paste);
            self.paste_hotkey_suspended = true;
        }
        if !self.paste_hotkey_suspended {
            return;
        }
        if let Some(id) = self.rearm_task.take() {
            self.scheduler.cancel(id);
        }
        self.rearm_task = Some(self.scheduler.schedule_after(
            self.clock.now(),
            PASTE_HOTKEY_REARM_DELAY,
            Task::RearmPasteHotkey,
        ));
    }

    fn rearm_paste_hotkey(&mut self) {
        if !std::mem::take(&mut self.paste_hotkey_suspended) {
            return;
        }
        let binding = self.settings.shortcut(ShortcutSlot::Paste);
        let result = self.registrar.register(ShortcutSlot::Paste, binding);
        match &result {
            Ok(()) => tracing::debug!(%binding, "paste hotkey re-armed"),
            Err(_) => self.emit_hotkey_status(ShortcutSlot::Paste, binding, &result),
        }
    }

    fn end_paste_hotkey_suspension(&mut self) {
        self.paste_hotkey_suspended = false;
        if let Some(id) = self.rearm_task.take() {
            self.scheduler.cancel(id);
        }
    }

    /// Register both slots from settings. Every slot is attempted; the
    /// first failure is returned.
    fn register_hotkeys(&mut self) -> std::result::Result<(), HotkeyError> {
        let mut first_error = None;
        for slot in ShortcutSlot::ALL {
            let binding = self.settings.shortcut(slot);
            if let Err(e) = self.register_hotkey(slot, binding) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn register_hotkey(
        &mut self,
        slot: ShortcutSlot,
        binding: ShortcutBinding,
    ) -> std::result::Result<(), HotkeyError> {
        let result = self.registrar.register(slot, binding);
        self.emit_hotkey_status(slot, binding, &result);
        result
    }

    fn emit_hotkey_status(
        &self,
        slot: ShortcutSlot,
        binding: ShortcutBinding,
        result: &std::result::Result<(), HotkeyError>,
    ) {
        let status = match result {
            Ok(()) => HotkeyStatusEvent {
                slot: slot.as_str().to_string(),
                binding: Some(binding.display()),
                error: None,
            },
            Err(e) => HotkeyStatusEvent {
                slot: slot.as_str().to_string(),
                binding: None,
                error: Some(e.to_string()),
            },
        };
        emit_event(self.events.as_ref(), event_names::HOTKEY_STATUS, &status);
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("history", &self.history)
            .field("witness", &self.tracker.witness())
            .field("running", &self.running)
            .field("pending_tasks", &self.scheduler.len())
            .finish_non_exhaustive()
    }
}
