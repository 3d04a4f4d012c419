//! Deferred tasks on the single UI context.
//!
//! Nothing here spawns threads. A task is queued with a monotonic fire time and
//! handed back by `pop_due` once the owning context polls past that time, so
//! every continuation re-enters the same context that scheduled it.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Source of monotonic time.
pub trait Clock: fmt::Debug + Send + Sync {
    /// Current instant.
    fn now(&self) -> Instant;
}

/// Wall-clock monotonic time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    elapsed: Mutex<Duration>,
}

impl ManualClock {
    /// Start a manual clock at the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Mutex::new(Duration::ZERO),
        }
    }

    /// Move time forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut elapsed = self.elapsed.lock().unwrap_or_else(PoisonError::into_inner);
        *elapsed += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.elapsed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug)]
struct Scheduled<T> {
    fires_at: Instant,
    seq: u64,
    task: T,
}

impl<T> PartialEq for Scheduled<T> {
    fn eq(&self, other: &Self) -> bool {
        self.fires_at == other.fires_at && self.seq == other.seq
    }
}

impl<T> Eq for Scheduled<T> {}

impl<T> PartialOrd for Scheduled<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Scheduled<T> {
    // Reversed: BinaryHeap is a max-heap and the earliest task must pop first.
    // Ties run in scheduling order.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .fires_at
            .cmp(&self.fires_at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Queue of tasks ordered by fire time.
#[derive(Debug)]
pub struct Scheduler<T> {
    queue: BinaryHeap<Scheduled<T>>,
    next_seq: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            queue: BinaryHeap::new(),
            next_seq: 0,
        }
    }
}

impl<T> Scheduler<T> {
    /// Create an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `task` to run at `fires_at`.
    pub fn schedule_at(&mut self, fires_at: Instant, task: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Scheduled { fires_at, seq, task });
    }

    /// Queue `task` to run `delay` after `now`. Returns the fire time.
    pub fn schedule_after(&mut self, now: Instant, delay: Duration, task: T) -> Instant {
        let fires_at = now + delay;
        self.schedule_at(fires_at, task);
        fires_at
    }

    /// Remove and return the earliest task whose fire time is at or before `now`.
    pub fn pop_due(&mut self, now: Instant) -> Option<T> {
        if self.queue.peek()?.fires_at > now {
            return None;
        }
        self.queue.pop().map(|s| s.task)
    }

    /// Remove every pending task regardless of fire time, earliest first.
    pub fn drain(&mut self) -> Vec<T> {
        std::iter::from_fn(|| self.queue.pop().map(|s| s.task)).collect()
    }

    /// Fire time of the earliest pending task.
    #[must_use]
    pub fn next_fire_time(&self) -> Option<Instant> {
        self.queue.peek().map(|s| s.fires_at)
    }

    /// Number of pending tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// True if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
