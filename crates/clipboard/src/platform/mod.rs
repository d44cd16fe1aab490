//! OS clipboard backed by arboard.
//!
//! Text and images go through arboard everywhere. On macOS the change
//! counter and file URLs come straight from `NSPasteboard`; elsewhere the
//! counter is derived from a content fingerprint taken on each query and
//! file lists are not available.

#[cfg(target_os = "macos")]
mod macos;

use crate::access::{ChangeCount, ClipboardAccess, RawImage};
use crate::error::{ClipboardError, Result};
use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::Mutex;

/// The system clipboard.
pub struct SystemClipboard {
    inner: Mutex<arboard::Clipboard>,
    #[cfg(not(target_os = "macos"))]
    counter: Mutex<fingerprint::Counter>,
}

impl SystemClipboard {
    pub fn new() -> Result<Self> {
        let inner =
            arboard::Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
        let clipboard = Self {
            inner: Mutex::new(inner),
            #[cfg(not(target_os = "macos"))]
            counter: Mutex::new(fingerprint::Counter::default()),
        };
        tracing::debug!("system clipboard opened");
        Ok(clipboard)
    }

    fn with<T>(&self, f: impl FnOnce(&mut arboard::Clipboard) -> T) -> T {
        let mut inner = self.inner.lock().expect("clipboard mutex poisoned");
        f(&mut inner)
    }

    /// Our own write changed the content; make the counter see it now.
    fn after_write(&self) {
        #[cfg(not(target_os = "macos"))]
        {
            let print = self.fingerprint();
            self.counter
                .lock()
                .expect("clipboard counter mutex poisoned")
                .observe(print);
        }
    }

    #[cfg(not(target_os = "macos"))]
    fn fingerprint(&self) -> u64 {
        self.with(|cb| {
            let text = cb.get_text().ok();
            let image = cb.get_image().ok();
            fingerprint::of(text.as_deref(), image.as_ref().map(|i| i.bytes.as_ref()))
        })
    }
}

impl ClipboardAccess for SystemClipboard {
    fn change_count(&self) -> ChangeCount {
        #[cfg(target_os = "macos")]
        {
            ChangeCount(macos::change_count())
        }
        #[cfg(not(target_os = "macos"))]
        {
            let print = self.fingerprint();
            let mut counter = self
                .counter
                .lock()
                .expect("clipboard counter mutex poisoned");
            ChangeCount(counter.observe(print))
        }
    }

    fn read_file_paths(&self) -> Option<Vec<PathBuf>> {
        #[cfg(target_os = "macos")]
        {
            macos::read_file_paths()
        }
        #[cfg(not(target_os = "macos"))]
        {
            None
        }
    }

    fn read_image(&self) -> Option<RawImage> {
        let image = self.with(|cb| cb.get_image().ok())?;
        Some(RawImage {
            width: image.width,
            height: image.height,
            rgba: image.bytes.into_owned(),
        })
    }

    fn read_text(&self) -> Option<String> {
        self.with(|cb| cb.get_text().ok())
    }

    fn clear(&self) -> Result<()> {
        self.with(|cb| cb.clear())
            .map_err(|e| ClipboardError::WriteRejected(e.to_string()))?;
        self.after_write();
        Ok(())
    }

    fn write_text(&self, text: &str) -> Result<()> {
        self.with(|cb| cb.set_text(text))
            .map_err(|e| ClipboardError::WriteRejected(e.to_string()))?;
        self.after_write();
        Ok(())
    }

    fn write_image(&self, image: &RawImage) -> Result<()> {
        let data = arboard::ImageData {
            width: image.width,
            height: image.height,
            bytes: Cow::Borrowed(&image.rgba),
        };
        self.with(|cb| cb.set_image(data))
            .map_err(|e| ClipboardError::WriteRejected(e.to_string()))?;
        self.after_write();
        Ok(())
    }

    fn write_file_paths(&self, paths: &[PathBuf]) -> Result<()> {
        #[cfg(target_os = "macos")]
        {
            macos::write_file_paths(paths)
        }
        #[cfg(not(target_os = "macos"))]
        {
            // No portable file-URL flavor; fall back to one path per line.
            let joined = paths
                .iter()
                .map(|p| p.to_string_lossy())
                .collect::<Vec<_>>()
                .join("\n");
            tracing::debug!(count = paths.len(), "writing file list as text");
            self.write_text(&joined)
        }
    }
}

impl std::fmt::Debug for SystemClipboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemClipboard").finish_non_exhaustive()
    }
}

#[cfg(not(target_os = "macos"))]
mod fingerprint {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    pub fn of(text: Option<&str>, image: Option<&[u8]>) -> u64 {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        image.hash(&mut hasher);
        hasher.finish()
    }

    /// Turns content fingerprints into a counter that bumps on every change.
    #[derive(Debug, Default)]
    pub struct Counter {
        last: Option<u64>,
        count: i64,
    }

    impl Counter {
        pub fn observe(&mut self, print: u64) -> i64 {
            if let Some(last) = self.last {
                if last != print {
                    self.count += 1;
                }
            }
            self.last = Some(print);
            self.count
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_counter_bumps_on_change_only() {
            let mut counter = Counter::default();
            assert_eq!(counter.observe(of(Some("a"), None)), 0);
            assert_eq!(counter.observe(of(Some("a"), None)), 0);
            assert_eq!(counter.observe(of(Some("b"), None)), 1);
            assert_eq!(counter.observe(of(Some("b"), Some(&[1, 2]))), 2);
        }
    }
}
