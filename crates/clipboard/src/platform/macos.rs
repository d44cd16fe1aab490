//! NSPasteboard access for what arboard does not expose.

use crate::error::{ClipboardError, Result};
use objc::runtime::{Class, Object, BOOL, NO};
use objc::{msg_send, sel, sel_impl};
use std::os::unix::ffi::OsStrExt;
use std::path::PathBuf;

const NS_UTF8_STRING_ENCODING: usize = 4;

unsafe fn general_pasteboard() -> Option<*mut Object> {
    let class = Class::get("NSPasteboard")?;
    let pasteboard: *mut Object = msg_send![class, generalPasteboard];
    if pasteboard.is_null() {
        None
    } else {
        Some(pasteboard)
    }
}

/// `[[NSPasteboard generalPasteboard] changeCount]`, or 0 when unavailable.
pub fn change_count() -> i64 {
    unsafe {
        match general_pasteboard() {
            Some(pasteboard) => {
                let count: isize = msg_send![pasteboard, changeCount];
                count as i64
            }
            None => 0,
        }
    }
}

/// Paths of all file URLs on the pasteboard.
pub fn read_file_paths() -> Option<Vec<PathBuf>> {
    unsafe {
        let pasteboard = general_pasteboard()?;
        let url_class = Class::get("NSURL")?;
        let array_class = Class::get("NSArray")?;

        let classes: *mut Object = msg_send![array_class, arrayWithObject: url_class];
        if classes.is_null() {
            return None;
        }
        let nil: *mut Object = std::ptr::null_mut();
        let urls: *mut Object = msg_send![pasteboard, readObjectsForClasses: classes options: nil];
        if urls.is_null() {
            return None;
        }

        let count: usize = msg_send![urls, count];
        let mut paths = Vec::with_capacity(count);
        for i in 0..count {
            let url: *mut Object = msg_send![urls, objectAtIndex: i];
            if url.is_null() {
                continue;
            }
            let is_file: BOOL = msg_send![url, isFileURL];
            if is_file == NO {
                continue;
            }
            let path: *mut Object = msg_send![url, path];
            if let Some(path) = nsstring_to_string(path) {
                paths.push(PathBuf::from(path));
            }
        }

        if paths.is_empty() {
            None
        } else {
            Some(paths)
        }
    }
}

/// Put `paths` on the pasteboard as file URLs.
pub fn write_file_paths(paths: &[PathBuf]) -> Result<()> {
    unsafe {
        let pasteboard = general_pasteboard()
            .ok_or_else(|| ClipboardError::Unavailable("no general pasteboard".into()))?;
        let url_class = Class::get("NSURL")
            .ok_or_else(|| ClipboardError::Unavailable("NSURL missing".into()))?;
        let array_class = Class::get("NSMutableArray")
            .ok_or_else(|| ClipboardError::Unavailable("NSMutableArray missing".into()))?;

        let urls: *mut Object = msg_send![array_class, arrayWithCapacity: paths.len()];
        for path in paths {
            let ns_path = nsstring_from_bytes(path.as_os_str().as_bytes())
                .ok_or_else(|| ClipboardError::WriteRejected(path.display().to_string()))?;
            let url: *mut Object = msg_send![url_class, fileURLWithPath: ns_path];
            let _: () = msg_send![ns_path, release];
            if url.is_null() {
                return Err(ClipboardError::WriteRejected(path.display().to_string()));
            }
            let _: () = msg_send![urls, addObject: url];
        }

        let ok: BOOL = msg_send![pasteboard, writeObjects: urls];
        if ok == NO {
            return Err(ClipboardError::WriteRejected(format!(
                "{} file url(s)",
                paths.len()
            )));
        }
        Ok(())
    }
}

/// Owned (+1) NSString from UTF-8 bytes. Caller releases.
unsafe fn nsstring_from_bytes(bytes: &[u8]) -> Option<*mut Object> {
    let class = Class::get("NSString")?;
    let alloc: *mut Object = msg_send![class, alloc];
    let string: *mut Object = msg_send![alloc,
        initWithBytes: bytes.as_ptr()
        length: bytes.len()
        encoding: NS_UTF8_STRING_ENCODING];
    if string.is_null() {
        None
    } else {
        Some(string)
    }
}

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
