//! macOS focus provider built on NSWorkspace.

use crate::app::AppInfo;
use crate::error::{FocusError, Result};
use crate::provider::{DeactivationSink, FocusProvider, FocusSubscription, SurfaceHider};
use objc::declare::ClassDecl;
use objc::runtime::{Class, Object, Sel, BOOL, NO};
use objc::{msg_send, sel, sel_impl};
use std::sync::Mutex;

const DEACTIVATE_NOTIFICATION: &str = "NSWorkspaceDidDeactivateApplicationNotification";
const APPLICATION_KEY: &str = "NSWorkspaceApplicationKey";
const OBSERVER_CLASS: &str = "CliplineDeactivationObserver";
const NS_UTF8_STRING_ENCODING: usize = 4;
/// `NSApplicationActivateIgnoringOtherApps`.
const ACTIVATE_IGNORING_OTHER_APPS: usize = 1 << 1;

/// Sink of the installed observer. NSWorkspace delivers on the main thread,
/// and there is at most one observer per process.
static SINK: Mutex<Option<DeactivationSink>> = Mutex::new(None);

/// Focus provider using native Cocoa APIs.
#[derive(Debug, Default)]
pub struct MacFocusProvider;

impl MacFocusProvider {
    pub fn new() -> Self {
        Self
    }
}

impl FocusProvider for MacFocusProvider {
    fn frontmost_app(&self) -> Option<AppInfo> {
        unsafe {
            let workspace = shared_workspace()?;
            let app: *mut Object = msg_send![workspace, frontmostApplication];
            running_app_info(app)
        }
    }

    fn activate(&self, app: &AppInfo) -> Result<()> {
        unsafe {
            let class = Class::get("NSRunningApplication")
                .ok_or_else(|| FocusError::ActivationFailed { app: app.label() })?;
            let running: *mut Object =
                msg_send![class, runningApplicationWithProcessIdentifier: app.pid];
            if running.is_null() {
                return Err(FocusError::NotRunning { pid: app.pid });
            }
            let ok: BOOL = msg_send![running, activateWithOptions: ACTIVATE_IGNORING_OTHER_APPS];
            if ok == NO {
                return Err(FocusError::ActivationFailed { app: app.label() });
            }
        }
        Ok(())
    }

    fn subscribe_deactivations(&self, sink: DeactivationSink) -> Result<FocusSubscription> {
        {
            let mut slot = SINK.lock().expect("focus sink mutex poisoned");
            if slot.is_some() {
                return Err(FocusError::ObserverFailed(
                    "deactivation observer already installed".into(),
                ));
            }
            *slot = Some(sink);
        }

        let observer = match unsafe { install_observer() } {
            Ok(observer) => observer,
            Err(e) => {
                SINK.lock().expect("focus sink mutex poisoned").take();
                return Err(e);
            }
        };
        tracing::info!("focus deactivation observer installed");

        let observer = observer as usize;
        Ok(FocusSubscription::new(move || {
            unsafe { remove_observer(observer as *mut Object) };
            SINK.lock().expect("focus sink mutex poisoned").take();
            tracing::info!("focus deactivation observer removed");
        }))
    }
}

/// Hides every window of this application (`[NSApp hide:nil]`).
#[derive(Debug, Default)]
pub struct MacSurfaceHider;

impl SurfaceHider for MacSurfaceHider {
    fn hide_own_surfaces(&self) {
        unsafe {
            let Some(class) = Class::get("NSApplication") else {
                return;
            };
            let app: *mut Object = msg_send![class, sharedApplication];
            if app.is_null() {
                return;
            }
            let nil: *mut Object = std::ptr::null_mut();
            let _: () = msg_send![app, hide: nil];
        }
    }
}

unsafe fn shared_workspace() -> Option<*mut Object> {
    let class = Class::get("NSWorkspace")?;
    let workspace: *mut Object = msg_send![class, sharedWorkspace];
    if workspace.is_null() {
        None
    } else {
        Some(workspace)
    }
}

unsafe fn running_app_info(app: *mut Object) -> Option<AppInfo> {
    if app.is_null() {
        return None;
    }
    let pid: i32 = msg_send![app, processIdentifier];
    let bundle_id: *mut Object = msg_send![app, bundleIdentifier];
    let name: *mut Object = msg_send![app, localizedName];
    Some(AppInfo {
        pid,
        bundle_id: nsstring_to_string(bundle_id).filter(|s| !s.is_empty()),
        name: nsstring_to_string(name),
    })
}

fn observer_class() -> Result<&'static Class> {
    if let Some(class) = Class::get(OBSERVER_CLASS) {
        return Ok(class);
    }
    let superclass =
        Class::get("NSObject").ok_or_else(|| FocusError::ObserverFailed("NSObject".into()))?;
    let mut decl = ClassDecl::new(OBSERVER_CLASS, superclass)
        .ok_or_else(|| FocusError::ObserverFailed(OBSERVER_CLASS.into()))?;
    unsafe {
        decl.add_method(
            sel!(applicationDidDeactivate:),
            application_did_deactivate as extern "C" fn(&Object, Sel, *mut Object),
        );
    }
    Ok(decl.register())
}

extern "C" fn application_did_deactivate(_this: &Object, _cmd: Sel, notification: *mut Object) {
    let app = unsafe {
        if notification.is_null() {
            return;
        }
        let user_info: *mut Object = msg_send![notification, userInfo];
        if user_info.is_null() {
            return;
        }
        let Some(key) = nsstring(APPLICATION_KEY) else {
            return;
        };
        let app: *mut Object = msg_send![user_info, objectForKey: key];
        let _: () = msg_send![key, release];
        running_app_info(app)
    };

    if let Some(app) = app {
        if let Ok(slot) = SINK.lock() {
            if let Some(sink) = slot.as_ref() {
                sink(app);
            }
        }
    }
}

unsafe fn install_observer() -> Result<*mut Object> {
    let class = observer_class()?;
    let workspace =
        shared_workspace().ok_or_else(|| FocusError::ObserverFailed("NSWorkspace".into()))?;
    let center: *mut Object = msg_send![workspace, notificationCenter];
    if center.is_null() {
        return Err(FocusError::ObserverFailed("notification center".into()));
    }

    let observer: *mut Object = msg_send![class, new];
    let name = nsstring(DEACTIVATE_NOTIFICATION)
        .ok_or_else(|| FocusError::ObserverFailed(DEACTIVATE_NOTIFICATION.into()))?;
    let nil: *mut Object = std::ptr::null_mut();
    let _: () = msg_send![center,
        addObserver: observer
        selector: sel!(applicationDidDeactivate:)
        name: name
        object: nil];
    let _: () = msg_send![name, release];
    Ok(observer)
}

unsafe fn remove_observer(observer: *mut Object) {
    if let Some(workspace) = shared_workspace() {
        let center: *mut Object = msg_send![workspace, notificationCenter];
        if !center.is_null() {
            let _: () = msg_send![center, removeObserver: observer];
        }
    }
    let _: () = msg_send![observer, release];
}

/// Owned (+1) NSString. Caller releases.
unsafe fn nsstring(s: &str) -> Option<*mut Object> {
    let class = Class::get("NSString")?;
    let alloc: *mut Object = msg_send![class, alloc];
    let string: *mut Object = msg_send![alloc,
        initWithBytes: s.as_ptr()
        length: s.len()
        encoding: NS_UTF8_STRING_ENCODING];
    if string.is_null() {
        None
    } else {
        Some(string)
    }
}

/// Convert NSString to Rust String.
unsafe fn nsstring_to_string(nsstring: *mut Object) -> Option<String> {
    if nsstring.is_null() {
        return None;
    }
    let c_str: *const std::os::raw::c_char = msg_send![nsstring, UTF8String];
    if c_str.is_null() {
        return None;
    }
    Some(std::ffi::CStr::from_ptr(c_str).to_string_lossy().into_owned())
}
