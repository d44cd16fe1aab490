//! Classifies whatever is on the clipboard into a single snapshot.

use crate::access::ClipboardAccess;
use crate::codec::encode_png;
use crate::snapshot::ClipboardSnapshot;
use chrono::{DateTime, Utc};

/// Largest encoded image accepted for capture (2 MiB).
pub const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

/// Reads the current clipboard content.
///
/// Priority when several representations are present: file paths, then
/// image, then text. An image whose PNG exceeds the size limit is skipped
/// and the reader falls through to text. Reading never touches any change
/// counter.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotReader {
    max_image_bytes: usize,
}

impl Default for SnapshotReader {
    fn default() -> Self {
        Self::new(MAX_IMAGE_BYTES)
    }
}

impl SnapshotReader {
    pub fn new(max_image_bytes: usize) -> Self {
        Self { max_image_bytes }
    }

    pub fn max_image_bytes(&self) -> usize {
        self.max_image_bytes
    }

    pub fn read(
        &self,
        clipboard: &dyn ClipboardAccess,
        now: DateTime<Utc>,
    ) -> Option<ClipboardSnapshot> {
        if let Some(paths) = clipboard.read_file_paths() {
            let paths: Vec<_> = paths.into_iter().filter(|p| p.is_absolute()).collect();
            if let Some(snapshot) = ClipboardSnapshot::files(paths, now) {
                return Some(snapshot);
            }
        }

        if let Some(raw) = clipboard.read_image() {
            match encode_png(&raw) {
                Ok(png) if png.len() > self.max_image_bytes => {
                    tracing::debug!(
                        bytes = png.len(),
                        limit = self.max_image_bytes,
                        "skipping oversized clipboard image"
                    );
                }
                Ok(png) => return Some(ClipboardSnapshot::image(png, now)),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to encode clipboard image");
                }
            }
        }

        clipboard
            .read_text()
            .filter(|text| !text.is_empty())
            .map(|text| ClipboardSnapshot::text(text, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::RawImage;
    use crate::memory::MemoryClipboard;
    use crate::snapshot::{SnapshotKind, SnapshotPayload};
    use std::path::PathBuf;

    fn solid(width: usize, height: usize) -> RawImage {
        RawImage {
            width,
            height,
            rgba: vec![200; width * height * 4],
        }
    }

    /// Pixels that PNG cannot compress much.
    fn noisy(width: usize, height: usize) -> RawImage {
        let mut state: u32 = 0x1234_5678;
        let rgba = (0..width * height * 4)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                (state & 0xff) as u8
            })
            .collect();
        RawImage {
            width,
            height,
            rgba,
        }
    }

    #[test]
    fn test_empty_clipboard_reads_none() {
        let clipboard = MemoryClipboard::new();
        assert!(SnapshotReader::default().read(&clipboard, Utc::now()).is_none());
    }

    #[test]
    fn test_files_win_over_text() {
        let clipboard = MemoryClipboard::new();
        clipboard.set_external(|c| {
            c.text = Some("/tmp/a".into());
            c.files = Some(vec![PathBuf::from("/tmp/a")]);
        });

        let snap = SnapshotReader::default().read(&clipboard, Utc::now()).unwrap();
        assert_eq!(snap.kind(), SnapshotKind::FileList);
    }

    #[test]
    fn test_image_wins_over_text() {
        let clipboard = MemoryClipboard::new();
        clipboard.set_external(|c| {
            c.text = Some("caption".into());
            c.image = Some(solid(8, 8));
        });

        let snap = SnapshotReader::default().read(&clipboard, Utc::now()).unwrap();
        assert_eq!(snap.kind(), SnapshotKind::Image);
    }

    #[test]
    fn test_oversized_image_falls_through_to_text() {
        let clipboard = MemoryClipboard::new();
        clipboard.set_external(|c| {
            c.text = Some("caption".into());
            c.image = Some(noisy(64, 64));
        });

        let snap = SnapshotReader::new(1024).read(&clipboard, Utc::now()).unwrap();
        assert_eq!(
            snap.payload(),
            &SnapshotPayload::Text {
                text: "caption".into()
            }
        );
    }

    #[test]
    fn test_oversized_image_alone_reads_none() {
        let clipboard = MemoryClipboard::new();
        clipboard.set_external(|c| c.image = Some(noisy(64, 64)));
        assert!(SnapshotReader::new(1024).read(&clipboard, Utc::now()).is_none());
    }

    #[test]
    fn test_empty_text_reads_none() {
        let clipboard = MemoryClipboard::new();
        clipboard.set_external(|c| c.text = Some(String::new()));
        assert!(SnapshotReader::default().read(&clipboard, Utc::now()).is_none());
    }

    #[test]
    fn test_empty_file_list_falls_through() {
        let clipboard = MemoryClipboard::new();
        clipboard.set_external(|c| {
            c.files = Some(Vec::new());
            c.text = Some("hi".into());
        });

        let snap = SnapshotReader::default().read(&clipboard, Utc::now()).unwrap();
        assert_eq!(snap.kind(), SnapshotKind::Text);
    }

    #[test]
    fn test_read_leaves_counter_alone() {
        let clipboard = MemoryClipboard::new();
        clipboard.set_external(|c| c.text = Some("hi".into()));
        let before = clipboard.change_count();
        SnapshotReader::default().read(&clipboard, Utc::now());
        assert_eq!(clipboard.change_count(), before);
    }
}
