//! Provider traits for focus observation and control.
//!
//! These abstract the window server so the tracker and the paste pipeline
//! can be driven by a scripted fake in tests.

use crate::app::AppInfo;
use crate::error::Result;
use std::sync::Arc;

/// Callback invoked with the application that just lost foreground focus.
pub type DeactivationSink = Box<dyn Fn(AppInfo) + Send + Sync + 'static>;

/// Access to the foreground application.
pub trait FocusProvider {
    /// The application currently holding foreground focus.
    fn frontmost_app(&self) -> Option<AppInfo>;

    /// Bring `app` to the foreground.
    fn activate(&self, app: &AppInfo) -> Result<()>;

    /// Call `sink` every time an application loses foreground focus.
    ///
    /// Notifications stop when the returned subscription is dropped.
    fn subscribe_deactivations(&self, sink: DeactivationSink) -> Result<FocusSubscription>;
}

pub type FocusProviderRef = Arc<dyn FocusProvider>;

/// Hides this process's own windows and panels.
pub trait SurfaceHider {
    fn hide_own_surfaces(&self);
}

pub type SurfaceHiderRef = Arc<dyn SurfaceHider>;

/// Handle to a deactivation observer. Dropping it releases the observer.
#[must_use = "dropping a FocusSubscription stops notifications"]
pub struct FocusSubscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl FocusSubscription {
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A subscription with nothing to release.
    pub fn inert() -> Self {
        Self { release: None }
    }

    /// Release now rather than on drop.
    pub fn cancel(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for FocusSubscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl std::fmt::Debug for FocusSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FocusSubscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

/// Null implementation for testing or unsupported platforms.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProvider;

impl FocusProvider for NullProvider {
    fn frontmost_app(&self) -> Option<AppInfo> {
        None
    }

    fn activate(&self, _app: &AppInfo) -> Result<()> {
        Ok(())
    }

    fn subscribe_deactivations(&self, _sink: DeactivationSink) -> Result<FocusSubscription> {
        Ok(FocusSubscription::inert())
    }
}

impl SurfaceHider for NullProvider {
    fn hide_own_surfaces(&self) {}
}
