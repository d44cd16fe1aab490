//! Scripted focus provider for tests and headless runs.

use crate::app::AppInfo;
use crate::error::{FocusError, Result};
use crate::provider::{DeactivationSink, FocusProvider, FocusSubscription, SurfaceHider};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct State {
    frontmost: Option<AppInfo>,
    activations: Vec<AppInfo>,
    hides: usize,
    fail_activation: bool,
    next_sink: u64,
    sinks: Vec<(u64, Arc<DeactivationSink>)>,
}

/// Focus provider whose foreground app is set by the test.
///
/// [`switch_to`](Self::switch_to) mimics the user clicking another app:
/// the old frontmost app is reported as deactivated to every subscriber.
#[derive(Default, Clone)]
pub struct ScriptedFocus {
    state: Arc<Mutex<State>>,
}

impl ScriptedFocus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_frontmost(app: AppInfo) -> Self {
        let focus = Self::new();
        focus.lock().frontmost = Some(app);
        focus
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("focus mutex poisoned")
    }

    /// Set the frontmost app without notifying anyone.
    pub fn set_frontmost(&self, app: Option<AppInfo>) {
        self.lock().frontmost = app;
    }

    /// Make `app` frontmost and report the previous one as deactivated.
    pub fn switch_to(&self, app: AppInfo) {
        let previous = self.lock().frontmost.replace(app);
        if let Some(previous) = previous {
            self.deactivate(previous);
        }
    }

    /// Deliver a deactivation notification for `app`.
    pub fn deactivate(&self, app: AppInfo) {
        // Sinks run without the lock so they may call back into the provider.
        let sinks: Vec<_> = self.lock().sinks.iter().map(|(_, s)| s.clone()).collect();
        for sink in sinks {
            sink(app.clone());
        }
    }

    pub fn fail_activation(&self, fail: bool) {
        self.lock().fail_activation = fail;
    }

    /// Apps passed to [`FocusProvider::activate`], oldest first.
    pub fn activations(&self) -> Vec<AppInfo> {
        self.lock().activations.clone()
    }

    pub fn hide_count(&self) -> usize {
        self.lock().hides
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().sinks.len()
    }
}

impl FocusProvider for ScriptedFocus {
    fn frontmost_app(&self) -> Option<AppInfo> {
        self.lock().frontmost.clone()
    }

    fn activate(&self, app: &AppInfo) -> Result<()> {
        let mut state = self.lock();
        if state.fail_activation {
            return Err(FocusError::ActivationFailed { app: app.label() });
        }
        state.activations.push(app.clone());
        state.frontmost = Some(app.clone());
        Ok(())
    }

    fn subscribe_deactivations(&self, sink: DeactivationSink) -> Result<FocusSubscription> {
        let id = {
            let mut state = self.lock();
            let id = state.next_sink;
            state.next_sink += 1;
            state.sinks.push((id, Arc::new(sink)));
            id
        };

        let state = Arc::clone(&self.state);
        Ok(FocusSubscription::new(move || {
            if let Ok(mut state) = state.lock() {
                state.sinks.retain(|(sink_id, _)| *sink_id != id);
            }
        }))
    }
}

impl SurfaceHider for ScriptedFocus {
    fn hide_own_surfaces(&self) {
        self.lock().hides += 1;
    }
}
