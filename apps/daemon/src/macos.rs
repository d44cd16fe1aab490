//! Process setup and run loop pumping on macOS.
//!
//! Global hotkeys and workspace notifications are delivered through the
//! main thread's run loop, so the daemon loop must keep it turning.

use core_foundation::runloop::{kCFRunLoopDefaultMode, CFRunLoop};
use objc::runtime::{Class, Object, BOOL};
use objc::{msg_send, sel, sel_impl};
use std::time::Duration;

/// `NSApplicationActivationPolicyAccessory`: no Dock icon, no menu bar.
const ACTIVATION_POLICY_ACCESSORY: isize = 1;

/// Create the shared NSApplication as an accessory process.
pub fn init_application() {
    unsafe {
        let Some(class) = Class::get("NSApplication") else {
            tracing::warn!("NSApplication unavailable");
            return;
        };
        let app: *mut Object = msg_send![class, sharedApplication];
        if app.is_null() {
            tracing::warn!("failed to create NSApplication");
            return;
        }
        let _: BOOL = msg_send![app, setActivationPolicy: ACTIVATION_POLICY_ACCESSORY];
    }
}

/// Run the main run loop for at most `timeout`, returning early once a
/// source has been handled.
pub fn pump_run_loop(timeout: Duration) {
    let mode = unsafe { kCFRunLoopDefaultMode };
    CFRunLoop::run_in_mode(mode, timeout, true);
}
