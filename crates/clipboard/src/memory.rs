//! In-memory clipboard for tests and headless runs.

use crate::access::{ChangeCount, ClipboardAccess, RawImage};
use crate::error::{ClipboardError, Result};
use std::path::PathBuf;
use std::sync::Mutex;

/// Representations currently held.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipboardContent {
    pub text: Option<String>,
    pub image: Option<RawImage>,
    pub files: Option<Vec<PathBuf>>,
}

/// One mutation performed through [`ClipboardAccess`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardWrite {
    Clear,
    Text(String),
    Image { width: usize, height: usize },
    Files(Vec<PathBuf>),
}

#[derive(Default)]
struct State {
    content: ClipboardContent,
    count: i64,
    writes: Vec<ClipboardWrite>,
    fail_writes: bool,
}

/// A clipboard that lives in memory.
///
/// Every mutation bumps the change counter, like a real pasteboard.
/// [`set_external`](Self::set_external) simulates another application
/// copying something.
#[derive(Default)]
pub struct MemoryClipboard {
    state: Mutex<State>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("clipboard mutex poisoned")
    }

    /// Replace the content as another process would, bumping the counter.
    pub fn set_external(&self, f: impl FnOnce(&mut ClipboardContent)) {
        let mut state = self.lock();
        let mut content = ClipboardContent::default();
        f(&mut content);
        state.content = content;
        state.count += 1;
    }

    /// Bump the counter without changing content.
    pub fn touch(&self) {
        self.lock().count += 1;
    }

    /// Make every subsequent write fail.
    pub fn fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    pub fn content(&self) -> ClipboardContent {
        self.lock().content.clone()
    }

    /// Writes made through the trait, oldest first.
    pub fn writes(&self) -> Vec<ClipboardWrite> {
        self.lock().writes.clone()
    }

    fn mutate(&self, write: ClipboardWrite, f: impl FnOnce(&mut ClipboardContent)) -> Result<()> {
        let mut state = self.lock();
        if state.fail_writes {
            return Err(ClipboardError::WriteRejected(format!("{write:?}")));
        }
        f(&mut state.content);
        state.count += 1;
        state.writes.push(write);
        Ok(())
    }
}

impl ClipboardAccess for MemoryClipboard {
    fn change_count(&self) -> ChangeCount {
        ChangeCount(self.lock().count)
    }

    fn read_file_paths(&self) -> Option<Vec<PathBuf>> {
        self.lock().content.files.clone()
    }

    fn read_image(&self) -> Option<RawImage> {
        self.lock().content.image.clone()
    }

    fn read_text(&self) -> Option<String> {
        self.lock().content.text.clone()
    }

    fn clear(&self) -> Result<()> {
        self.mutate(ClipboardWrite::Clear, |c| *c = ClipboardContent::default())
    }

    fn write_text(&self, text: &str) -> Result<()> {
        self.mutate(ClipboardWrite::Text(text.to_string()), |c| {
            c.text = Some(text.to_string())
        })
    }

    fn write_image(&self, image: &RawImage) -> Result<()> {
        let write = ClipboardWrite::Image {
            width: image.width,
            height: image.height,
        };
        self.mutate(write, |c| c.image = Some(image.clone()))
    }

    fn write_file_paths(&self, paths: &[PathBuf]) -> Result<()> {
        self.mutate(ClipboardWrite::Files(paths.to_vec()), |c| {
            c.files = Some(paths.to_vec())
        })
    }
}
