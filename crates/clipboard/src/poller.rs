//! Change poller - detects new clipboard content by counter comparison.
//!
//! The OS clipboard has no change notification, so the poller compares the
//! live change counter against a baseline on every tick. Timing is owned by
//! the caller: something has to call [`ChangePoller::tick`] every
//! [`DEFAULT_POLL_INTERVAL`].

use crate::access::{ChangeCount, ClipboardAccess};
use crate::reader::SnapshotReader;
use crate::snapshot::ClipboardSnapshot;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Default polling interval for clipboard changes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    Armed,
}

/// Result of one tick.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The poller is stopped.
    Idle,
    /// Counter matches the baseline.
    Unchanged,
    /// Counter moved but nothing capturable was found.
    Unreadable,
    /// New content, ready for the history store.
    Changed(ClipboardSnapshot),
}

#[derive(Debug)]
pub struct ChangePoller {
    state: PollerState,
    baseline: ChangeCount,
    reader: SnapshotReader,
}

impl ChangePoller {
    pub fn new(reader: SnapshotReader) -> Self {
        Self {
            state: PollerState::Idle,
            baseline: ChangeCount::default(),
            reader,
        }
    }

    pub fn state(&self) -> PollerState {
        self.state
    }

    pub fn is_armed(&self) -> bool {
        self.state == PollerState::Armed
    }

    pub fn baseline(&self) -> ChangeCount {
        self.baseline
    }

    /// Take the current counter as baseline and start watching.
    ///
    /// Content already on the clipboard at this point is not captured.
    pub fn start(&mut self, clipboard: &dyn ClipboardAccess) {
        if self.is_armed() {
            tracing::warn!("clipboard poller already armed");
            return;
        }
        self.baseline = clipboard.change_count();
        self.state = PollerState::Armed;
        tracing::info!(baseline = self.baseline.0, "clipboard poller armed");
    }

    pub fn stop(&mut self) {
        if self.is_armed() {
            self.state = PollerState::Idle;
            tracing::info!("clipboard poller stopped");
        }
    }

    /// Compare the live counter with the baseline and read on change.
    ///
    /// The baseline advances before reading, so an unreadable change is
    /// not retried on the next tick.
    pub fn tick(&mut self, clipboard: &dyn ClipboardAccess, now: DateTime<Utc>) -> PollOutcome {
        if !self.is_armed() {
            return PollOutcome::Idle;
        }

        let live = clipboard.change_count();
        if live == self.baseline {
            return PollOutcome::Unchanged;
        }
        self.baseline = live;

        match self.reader.read(clipboard, now) {
            Some(snapshot) => {
                tracing::debug!(count = live.0, kind = ?snapshot.kind(), "clipboard changed");
                PollOutcome::Changed(snapshot)
            }
            None => {
                tracing::debug!(count = live.0, "clipboard changed to unsupported content");
                PollOutcome::Unreadable
            }
        }
    }

    /// Adopt the counter produced by our own clipboard write.
    ///
    /// Must be called after the write completes. If another process writes
    /// between our write and this call, that change is swallowed too.
    pub fn record_own_write(&mut self, count: ChangeCount) {
        tracing::trace!(count = count.0, "recording own clipboard write");
        self.baseline = count;
    }
}

impl Default for ChangePoller {
    fn default() -> Self {
        Self::new(SnapshotReader::default())
    }
}
