//! Time source used by the collector for windows, fallback entropy, and
//! rate-limit sleeps.

use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Wall-clock reads and blocking waits.
pub trait Clock: Send + Sync {
    /// Time since the Unix epoch.
    fn unix_now(&self) -> Duration;

    /// Block the calling thread for `duration`.
    fn sleep(&self, duration: Duration);
}

/// The real clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_now(&self) -> Duration {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Virtual clock. `sleep` returns immediately, advances virtual time, and
/// records the requested duration.
#[derive(Debug)]
pub struct ManualClock {
    inner: Mutex<ManualState>,
}

#[derive(Debug)]
struct ManualState {
    now: Duration,
    sleeps: Vec<Duration>,
}

impl ManualClock {
    /// Start at `start` past the epoch.
    pub fn new(start: Duration) -> Self {
        Self {
            inner: Mutex::new(ManualState {
                now: start,
                sleeps: Vec::new(),
            }),
        }
    }

    /// Move time forward without recording a sleep.
    pub fn advance(&self, by: Duration) {
        self.inner.lock().unwrap().now += by;
    }

    /// Every duration passed to [`Clock::sleep`], in order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.inner.lock().unwrap().sleeps.clone()
    }

    /// Sum of all recorded sleeps.
    pub fn total_slept(&self) -> Duration {
        self.inner.lock().unwrap().sleeps.iter().sum()
    }
}

impl Clock for ManualClock {
    fn unix_now(&self) -> Duration {
        self.inner.lock().unwrap().now
    }

    fn sleep(&self, duration: Duration) {
        let mut state = self.inner.lock().unwrap();
        state.now += duration;
        state.sleeps.push(duration);
    }
}
