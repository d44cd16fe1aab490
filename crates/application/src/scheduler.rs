//! Deferred actions on a pluggable clock.
//!
//! The engine never sleeps. Work that must happen later (the next
//! clipboard poll, a paste keystroke after the settle delay) is queued in a
//! [`Scheduler`] and fired by whoever drives the engine once the
//! [`Clock`] says it is due. Tests drive a [`ManualClock`] instead of
//! waiting on the wall clock.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Source of monotonic and wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    /// Wall-clock time, used to stamp captured snapshots.
    fn wall(&self) -> DateTime<Utc>;
}

pub type ClockRef = Arc<dyn Clock>;

/// The real clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn wall(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    start: Instant,
    start_wall: DateTime<Utc>,
    elapsed: Arc<Mutex<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            start_wall: Utc::now(),
            elapsed: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.elapsed.lock().expect("clock mutex poisoned") += by;
    }

    pub fn elapsed(&self) -> Duration {
        *self.elapsed.lock().expect("clock mutex poisoned")
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + self.elapsed()
    }

    fn wall(&self) -> DateTime<Utc> {
        let elapsed = chrono::Duration::from_std(self.elapsed()).unwrap_or(chrono::Duration::MAX);
        self.start_wall + elapsed
    }
}

/// Handle for cancelling a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

/// Cancellable queue of deferred tasks.
///
/// Tasks come out earliest deadline first; tasks with equal deadlines come
/// out in the order they were scheduled.
#[derive(Debug)]
pub struct Scheduler<T> {
    queue: BTreeMap<(Instant, u64), T>,
    deadlines: HashMap<u64, Instant>,
    next_seq: u64,
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            queue: BTreeMap::new(),
            deadlines: HashMap::new(),
            next_seq: 0,
        }
    }

    pub fn schedule_at(&mut self, deadline: Instant, task: T) -> TaskId {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.insert((deadline, seq), task);
        self.deadlines.insert(seq, deadline);
        TaskId(seq)
    }

    pub fn schedule_after(&mut self, now: Instant, delay: Duration, task: T) -> TaskId {
        self.schedule_at(now + delay, task)
    }

    /// Drop a pending task. Returns false if it already ran or was cancelled.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        match self.deadlines.remove(&id.0) {
            Some(deadline) => self.queue.remove(&(deadline, id.0)).is_some(),
            None => false,
        }
    }

    /// Remove and return the earliest task due at `now`.
    pub fn pop_due(&mut self, now: Instant) -> Option<(TaskId, T)> {
        let (&(deadline, seq), _) = self.queue.first_key_value()?;
        if deadline > now {
            return None;
        }
        let task = self.queue.remove(&(deadline, seq))?;
        self.deadlines.remove(&seq);
        Some((TaskId(seq), task))
    }

    /// Remove every pending task matching `pred`, due or not, in the order
    /// they would have run.
    pub fn take_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> Vec<(TaskId, T)> {
        let keys: Vec<(Instant, u64)> = self
            .queue
            .iter()
            .filter(|(_, task)| pred(task))
            .map(|(key, _)| *key)
            .collect();
        keys.into_iter()
            .filter_map(|key| {
                self.deadlines.remove(&key.1);
                self.queue.remove(&key).map(|task| (TaskId(key.1), task))
            })
            .collect()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.queue.keys().next().map(|(deadline, _)| *deadline)
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.deadlines.contains_key(&id.0)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.deadlines.clear();
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_due_order_and_fifo_ties() {
        let clock = ManualClock::new();
        let mut scheduler = Scheduler::new();
        let t0 = clock.now();

        scheduler.schedule_after(t0, Duration::from_millis(500), "poll");
        scheduler.schedule_after(t0, Duration::from_millis(250), "first");
        scheduler.schedule_after(t0, Duration::from_millis(250), "second");

        assert!(scheduler.pop_due(clock.now()).is_none());

        clock.advance(Duration::from_millis(250));
        assert_eq!(scheduler.pop_due(clock.now()).map(|(_, t)| t), Some("first"));
        assert_eq!(scheduler.pop_due(clock.now()).map(|(_, t)| t), Some("second"));
        assert!(scheduler.pop_due(clock.now()).is_none());

        clock.advance(Duration::from_millis(250));
        assert_eq!(scheduler.pop_due(clock.now()).map(|(_, t)| t), Some("poll"));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_cancel() {
        let clock = ManualClock::new();
        let mut scheduler = Scheduler::new();
        let id = scheduler.schedule_after(clock.now(), Duration::from_millis(10), 1);
        scheduler.schedule_after(clock.now(), Duration::from_millis(20), 2);

        assert!(scheduler.is_pending(id));
        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));
        assert!(!scheduler.is_pending(id));

        clock.advance(Duration::from_secs(1));
        assert_eq!(scheduler.pop_due(clock.now()).map(|(_, t)| t), Some(2));
        assert!(scheduler.pop_due(clock.now()).is_none());
    }

    #[test]
    fn test_take_where_ignores_deadlines() {
        let clock = ManualClock::new();
        let mut scheduler = Scheduler::new();
        scheduler.schedule_after(clock.now(), Duration::from_millis(500), "poll");
        let a = scheduler.schedule_after(clock.now(), Duration::from_millis(200), "key-a");
        let b = scheduler.schedule_after(clock.now(), Duration::from_millis(300), "key-b");

        let taken = scheduler.take_where(|t| t.starts_with("key"));
        assert_eq!(taken, vec![(a, "key-a"), (b, "key-b")]);
        assert!(!scheduler.is_pending(a));
        assert_eq!(scheduler.len(), 1);

        clock.advance(Duration::from_secs(1));
        assert_eq!(scheduler.pop_due(clock.now()).map(|(_, t)| t), Some("poll"));
    }

    #[test]
    fn test_next_deadline() {
        let clock = ManualClock::new();
        let mut scheduler = Scheduler::new();
        assert!(scheduler.next_deadline().is_none());

        scheduler.schedule_after(clock.now(), Duration::from_millis(300), ());
        scheduler.schedule_after(clock.now(), Duration::from_millis(100), ());
        assert_eq!(
            scheduler.next_deadline(),
            Some(clock.now() + Duration::from_millis(100))
        );
    }

    #[test]
    fn test_manual_clock_wall_follows_elapsed() {
        let clock = ManualClock::new();
        let before = clock.wall();
        clock.advance(Duration::from_secs(3));
        assert_eq!(clock.wall() - before, chrono::Duration::seconds(3));
        assert_eq!(clock.elapsed(), Duration::from_secs(3));
    }
}
