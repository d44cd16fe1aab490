//! Clipboard capture for clipline.
//!
//! - [`ClipboardAccess`] is the seam to the OS clipboard; [`SystemClipboard`]
//!   implements it for real and [`MemoryClipboard`] for tests.
//! - [`SnapshotReader`] classifies the current content into a
//!   [`ClipboardSnapshot`] (file list, then image, then text).
//! - [`ChangePoller`] notices new content by comparing change counters.

mod access;
mod codec;
mod error;
mod memory;
mod platform;
mod poller;
mod reader;
mod snapshot;

pub use access::{write_snapshot, ChangeCount, ClipboardAccess, ClipboardRef, RawImage};
pub use codec::{decode_png, encode_png};
pub use error::{ClipboardError, Result};
pub use memory::{ClipboardContent, ClipboardWrite, MemoryClipboard};
pub use platform::SystemClipboard;
pub use poller::{ChangePoller, PollOutcome, PollerState, DEFAULT_POLL_INTERVAL};
pub use reader::{SnapshotReader, MAX_IMAGE_BYTES};
pub use snapshot::{ClipboardSnapshot, SnapshotKind, SnapshotPayload, PREVIEW_TEXT_LEN};
