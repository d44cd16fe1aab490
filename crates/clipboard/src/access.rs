//! The clipboard capability contract.

use crate::codec::decode_png;
use crate::error::Result;
use crate::snapshot::{ClipboardSnapshot, SnapshotPayload};
use std::path::PathBuf;
use std::sync::Arc;

/// Monotonic counter that changes every time clipboard content changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ChangeCount(pub i64);

/// Uncompressed RGBA8 pixels as handed out by the OS clipboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
}

/// Access to the OS clipboard.
///
/// Reads return `None` when the clipboard holds nothing of that kind.
/// Writes replace the whole clipboard only after [`clear`](Self::clear);
/// callers that want a single representation clear first.
pub trait ClipboardAccess {
    fn change_count(&self) -> ChangeCount;

    /// File URLs on the clipboard, as absolute paths.
    fn read_file_paths(&self) -> Option<Vec<PathBuf>>;

    fn read_image(&self) -> Option<RawImage>;

    fn read_text(&self) -> Option<String>;

    fn clear(&self) -> Result<()>;

    fn write_text(&self, text: &str) -> Result<()>;

    fn write_image(&self, image: &RawImage) -> Result<()>;

    fn write_file_paths(&self, paths: &[PathBuf]) -> Result<()>;
}

pub type ClipboardRef = Arc<dyn ClipboardAccess>;

/// Replace the clipboard with exactly the representation in `snapshot`.
pub fn write_snapshot(clipboard: &dyn ClipboardAccess, snapshot: &ClipboardSnapshot) -> Result<()> {
    // Decode before clearing so a bad PNG leaves the clipboard untouched.
    let image = match snapshot.payload() {
        SnapshotPayload::Image { png } => Some(decode_png(png)?),
        _ => None,
    };

    clipboard.clear()?;
    match snapshot.payload() {
        SnapshotPayload::Text { text } => clipboard.write_text(text),
        SnapshotPayload::FileList { paths } => clipboard.write_file_paths(paths),
        SnapshotPayload::Image { .. } => match image {
            Some(image) => clipboard.write_image(&image),
            None => Ok(()),
        },
    }
}
