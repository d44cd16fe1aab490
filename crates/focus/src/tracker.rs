//! Focus witness tracking.

use crate::app::AppInfo;
use crate::provider::FocusProvider;

/// Remembers the last external application that held foreground focus.
///
/// Our own process gaining and losing focus never changes the witness, so
/// it keeps pointing at the app the user was working in before opening
/// the history.
#[derive(Debug, Clone)]
pub struct FocusTracker {
    self_pid: i32,
    witness: Option<AppInfo>,
}

impl FocusTracker {
    pub fn new(self_pid: i32) -> Self {
        Self {
            self_pid,
            witness: None,
        }
    }

    /// Tracker that treats the current process as "self".
    pub fn for_current_process() -> Self {
        Self::new(std::process::id() as i32)
    }

    pub fn self_pid(&self) -> i32 {
        self.self_pid
    }

    pub fn is_self(&self, app: &AppInfo) -> bool {
        app.pid == self.self_pid
    }

    pub fn witness(&self) -> Option<&AppInfo> {
        self.witness.as_ref()
    }

    /// Seed the witness from the current frontmost app.
    pub fn initialize(&mut self, provider: &dyn FocusProvider) {
        self.record_frontmost(provider);
        tracing::info!(witness = ?self.witness.as_ref().map(AppInfo::label), "focus tracker initialized");
    }

    /// Adopt the current frontmost app as witness unless it is us.
    pub fn record_frontmost(&mut self, provider: &dyn FocusProvider) -> bool {
        match provider.frontmost_app() {
            Some(app) => self.observe(app),
            None => false,
        }
    }

    /// Handle an "application lost focus" notification.
    ///
    /// Returns whether the witness changed.
    pub fn on_deactivated(&mut self, app: AppInfo) -> bool {
        self.observe(app)
    }

    fn observe(&mut self, app: AppInfo) -> bool {
        if self.is_self(&app) {
            tracing::trace!("ignoring own focus change");
            return false;
        }
        if self.witness.as_ref() == Some(&app) {
            return false;
        }
        tracing::debug!(pid = app.pid, app = %app, "focus witness updated");
        self.witness = Some(app);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::ScriptedFocus;

    const SELF_PID: i32 = 999;

    #[test]
    fn test_initialize_from_frontmost() {
        let focus = ScriptedFocus::with_frontmost(AppInfo::new(1).with_name("Mail"));
        let mut tracker = FocusTracker::new(SELF_PID);
        tracker.initialize(&focus);
        assert_eq!(tracker.witness().unwrap().pid, 1);
    }

    #[test]
    fn test_initialize_ignores_self() {
        let focus = ScriptedFocus::with_frontmost(AppInfo::new(SELF_PID));
        let mut tracker = FocusTracker::new(SELF_PID);
        tracker.initialize(&focus);
        assert!(tracker.witness().is_none());
    }

    #[test]
    fn test_deactivation_of_self_keeps_witness() {
        let mut tracker = FocusTracker::new(SELF_PID);
        assert!(tracker.on_deactivated(AppInfo::new(1)));
        assert!(!tracker.on_deactivated(AppInfo::new(SELF_PID)));
        assert_eq!(tracker.witness().unwrap().pid, 1);

        assert!(tracker.on_deactivated(AppInfo::new(2)));
        assert_eq!(tracker.witness().unwrap().pid, 2);
    }

    #[test]
    fn test_repeat_notification_is_not_a_change() {
        let mut tracker = FocusTracker::new(SELF_PID);
        assert!(tracker.on_deactivated(AppInfo::new(3)));
        assert!(!tracker.on_deactivated(AppInfo::new(3)));
    }

    #[test]
    fn test_for_current_process() {
        let tracker = FocusTracker::for_current_process();
        assert_eq!(tracker.self_pid(), std::process::id() as i32);
    }
}
