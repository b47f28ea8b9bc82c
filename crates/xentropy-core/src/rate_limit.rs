//! Retry policy and the shared request gate.
//!
//! The search API allows roughly 50 requests per minute. Every collection
//! attempt is followed by a fixed sleep, which keeps a single caller under the
//! ceiling. [`RateGate`] keeps the aggregate rate under it when several calls
//! run against the same facade at once.

use std::sync::Mutex;
use std::time::Duration;

use crate::clock::Clock;

/// 1.2 s between requests, i.e. 50 requests per minute.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(1200);
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(120);

/// How long the collector keeps retrying, and how it spaces attempts.
///
/// With both bounds set to `None` the collector retries forever, which only
/// terminates if the feed eventually returns events or fails (fallback
/// entropy always makes progress).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Sleep after every attempt, whatever its outcome.
    pub delay: Duration,
    pub max_attempts: Option<u32>,
    /// Measured from the start of the collection on the injected clock.
    pub deadline: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay: DEFAULT_DELAY,
            max_attempts: None,
            deadline: Some(DEFAULT_DEADLINE),
        }
    }
}

impl RetryPolicy {
    /// The reference behaviour: fixed delay, no bound at all.
    pub fn unbounded(delay: Duration) -> Self {
        Self {
            delay,
            max_attempts: None,
            deadline: None,
        }
    }

    /// Whether another attempt may start, given what has happened so far.
    pub fn allows(&self, attempts: u32, elapsed: Duration) -> bool {
        if self.max_attempts.is_some_and(|max| attempts >= max) {
            return false;
        }
        if self.deadline.is_some_and(|deadline| elapsed >= deadline) {
            return false;
        }
        true
    }
}

/// Hands out request slots spaced `spacing` apart across all callers.
#[derive(Debug)]
pub struct RateGate {
    spacing: Duration,
    /// Earliest time (since epoch) the next request may start.
    next_slot: Mutex<Option<Duration>>,
}

impl RateGate {
    pub fn new(spacing: Duration) -> Self {
        Self {
            spacing,
            next_slot: Mutex::new(None),
        }
    }

    /// Reserve the next slot and sleep until it opens. Returns how long the
    /// caller waited; zero when the slot is already open.
    pub fn acquire(&self, clock: &dyn Clock) -> Duration {
        let now = clock.unix_now();
        let wait = {
            let mut next = self.next_slot.lock().unwrap();
            let slot = next.map_or(now, |n| n.max(now));
            *next = Some(slot + self.spacing);
            slot - now
        };
        if !wait.is_zero() {
            clock.sleep(wait);
        }
        wait
    }
}
