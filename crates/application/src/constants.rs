use std::time::Duration;

pub use clipline_clipboard::{DEFAULT_POLL_INTERVAL, MAX_IMAGE_BYTES};

/// Pause between restoring focus and posting the paste keystroke, so the
/// target application is frontmost when the keystroke lands
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(250);

/// How long the paste hotkey stays released after clipline posts its own
/// paste keystroke.
pub const PASTE_HOTKEY_REARM_DELAY: Duration = Duration::from_millis(300);
