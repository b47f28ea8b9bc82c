//! Windowed entropy collection from the post feed.
//!
//! Each attempt searches the minute ending "now", turns every parsable post
//! timestamp into a 4-byte big-endian word, and sleeps the rate-limit delay.
//! Transport failures never reach the caller: the attempt contributes one word
//! taken from the local microsecond clock instead. That fallback keeps
//! collection live at the cost of entropy quality, and is counted in
//! [`Collection::fallback_chunks`] so callers can tell.

use std::time::Duration;

use log::{info, warn};

use crate::clock::Clock;
use crate::error::{Result, XEntropyError};
use crate::feed::{PostFeed, TimeWindow};
use crate::rate_limit::{RateGate, RetryPolicy};

/// Append-only sequence of big-endian `u32` words. Length is always a
/// multiple of 4.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntropyBuffer {
    bytes: Vec<u8>,
}

impl RawEntropyBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, word: u32) {
        self.bytes.extend_from_slice(&word.to_be_bytes());
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Stored words in insertion order.
    pub fn words(&self) -> impl Iterator<Item = u32> + '_ {
        self.bytes
            .chunks_exact(4)
            .map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]]))
    }
}

/// Result of one collection run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    pub buffer: RawEntropyBuffer,
    /// Feed requests issued.
    pub attempts: u32,
    /// Posts whose timestamps made it into the buffer.
    pub events: usize,
    /// Words taken from the local clock after a failed request.
    pub fallback_chunks: usize,
    /// Successful requests that produced no usable timestamp.
    pub empty_batches: u32,
}

impl Collection {
    /// True when any part of the buffer came from the clock fallback.
    pub fn degraded(&self) -> bool {
        self.fallback_chunks > 0
    }
}

/// Collector for a single generation call. Borrows the facade's shared
/// pieces; owns nothing that outlives [`EntropySource::collect`].
pub struct EntropySource<'a> {
    feed: &'a dyn PostFeed,
    clock: &'a dyn Clock,
    gate: &'a RateGate,
    policy: RetryPolicy,
}

impl<'a> EntropySource<'a> {
    pub fn new(
        feed: &'a dyn PostFeed,
        clock: &'a dyn Clock,
        gate: &'a RateGate,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            feed,
            clock,
            gate,
            policy,
        }
    }

    /// Collect at least `target_bytes` of raw entropy.
    ///
    /// The buffer may overshoot the target by up to one batch. Fails only
    /// with [`XEntropyError::CollectionTimeout`] when the retry policy runs
    /// out first.
    pub fn collect(&self, target_bytes: usize) -> Result<Collection> {
        let started = self.clock.unix_now();
        let mut out = Collection::default();

        while out.buffer.len() < target_bytes {
            if !self.within_policy(&out, started) {
                return Err(Self::timed_out(&out, target_bytes));
            }

            // Concurrent callers can hold the gate past our deadline.
            if !self.gate.acquire(self.clock).is_zero() && !self.within_policy(&out, started) {
                return Err(Self::timed_out(&out, target_bytes));
            }
            out.attempts += 1;
            self.attempt(&mut out);
            self.clock.sleep(self.policy.delay);
        }

        Ok(out)
    }

    fn within_policy(&self, out: &Collection, started: Duration) -> bool {
        let elapsed = self.clock.unix_now().saturating_sub(started);
        self.policy.allows(out.attempts, elapsed)
    }

    fn timed_out(out: &Collection, target_bytes: usize) -> XEntropyError {
        warn!(
            "Entropy collection stopped after {} attempts ({}/{} bytes)",
            out.attempts,
            out.buffer.len(),
            target_bytes
        );
        XEntropyError::CollectionTimeout {
            attempts: out.attempts,
            collected: out.buffer.len(),
            target: target_bytes,
        }
    }

    fn attempt(&self, out: &mut Collection) {
        let window = TimeWindow::ending_at(self.clock.unix_now().as_secs() as i64);
        match self.feed.fetch(window) {
            Ok(posts) => {
                let words: Vec<u32> = posts.iter().filter_map(|p| p.entropy()).collect();
                info!("Retrieved {} timestamps", words.len());
                if words.is_empty() {
                    info!("No timestamps received, retrying");
                    out.empty_batches += 1;
                    return;
                }
                out.events += words.len();
                for word in words {
                    out.buffer.push(word);
                }
            }
            Err(e) => {
                warn!("Error collecting entropy: {e}");
                let micros = self.clock.unix_now().as_micros();
                out.buffer.push(micros as u32);
                out.fallback_chunks += 1;
                info!("Using clock fallback entropy");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::FetchError;
    use crate::feed::Post;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Replays scripted responses, then repeats the last one forever.
    struct Scripted {
        script: Mutex<VecDeque<std::result::Result<Vec<Post>, u16>>>,
        windows: Mutex<Vec<TimeWindow>>,
    }

    impl Scripted {
        fn new(script: Vec<std::result::Result<Vec<Post>, u16>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                windows: Mutex::new(Vec::new()),
            }
        }
    }

    impl PostFeed for Scripted {
        fn fetch(&self, window: TimeWindow) -> std::result::Result<Vec<Post>, FetchError> {
            self.windows.lock().unwrap().push(window);
            let mut script = self.script.lock().unwrap();
            let next = if script.len() > 1 {
                script.pop_front().unwrap()
            } else {
                script.front().cloned().unwrap()
            };
            next.map_err(|status| FetchError::Status {
                status,
                body: String::new(),
            })
        }
    }

    fn posts(stamps: &[&str]) -> Vec<Post> {
        stamps.iter().map(|s| Post::created_at(*s)).collect()
    }

    const DELAY: Duration = Duration::from_millis(1200);

    #[test]
    fn buffer_words_round_trip_big_endian() {
        let mut buf = RawEntropyBuffer::new();
        buf.push(0x0102_0304);
        buf.push(0xdead_beef);
        assert_eq!(buf.as_bytes(), &[1, 2, 3, 4, 0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(buf.words().collect::<Vec<_>>(), vec![0x0102_0304, 0xdead_beef]);
        assert_eq!(buf.len() % 4, 0);
    }

    #[test]
    fn collects_until_target_and_may_overshoot() {
        let feed = Scripted::new(vec![Ok(posts(&[
            "2025-03-14T15:09:26.535897Z",
            "2025-03-14T15:09:27.932384Z",
            "2025-03-14T15:09:28.000001Z",
        ]))]);
        let clock = ManualClock::new(Duration::from_secs(1_741_965_000));
        let gate = RateGate::new(DELAY);
        let source = EntropySource::new(&feed, &clock, &gate, RetryPolicy::unbounded(DELAY));

        let out = source.collect(16).unwrap();
        assert_eq!(out.attempts, 2);
        assert_eq!(out.buffer.len(), 24);
        assert_eq!(out.events, 6);
        assert!(!out.degraded());
        // One sleep per batch, not per event.
        assert_eq!(clock.sleeps(), vec![DELAY, DELAY]);
    }

    #[test]
    fn unparsable_timestamps_are_skipped() {
        let feed = Scripted::new(vec![Ok(vec![
            Post::default(),
            Post::created_at("garbage"),
            Post::created_at("2025-03-14T15:09:26.535897Z"),
        ])]);
        let clock = ManualClock::new(Duration::from_secs(1_741_965_000));
        let gate = RateGate::new(DELAY);
        let source = EntropySource::new(&feed, &clock, &gate, RetryPolicy::unbounded(DELAY));

        let out = source.collect(4).unwrap();
        assert_eq!(out.buffer.words().collect::<Vec<_>>(), vec![0x618c_1fa8]);
        assert_eq!(out.events, 1);
    }

    #[test]
    fn failures_fall_back_to_clock_micros() {
        let feed = Scripted::new(vec![Err(503)]);
        let start = Duration::from_micros(0x0000_0001_0000_0010);
        let clock = ManualClock::new(start);
        let gate = RateGate::new(DELAY);
        let source = EntropySource::new(&feed, &clock, &gate, RetryPolicy::unbounded(DELAY));

        let out = source.collect(8).unwrap();
        assert_eq!(out.attempts, 2);
        assert_eq!(out.fallback_chunks, 2);
        assert!(out.degraded());
        let words: Vec<u32> = out.buffer.words().collect();
        assert_eq!(words[0], 0x10);
        assert_eq!(words[1], 0x10 + 1_200_000);
    }

    #[test]
    fn empty_batches_append_nothing_but_still_sleep() {
        let feed = Scripted::new(vec![
            Ok(vec![]),
            Ok(posts(&["garbage"])),
            Ok(posts(&["2025-03-14T15:09:26.535897Z"])),
        ]);
        let clock = ManualClock::new(Duration::from_secs(1_741_965_000));
        let gate = RateGate::new(DELAY);
        let source = EntropySource::new(&feed, &clock, &gate, RetryPolicy::unbounded(DELAY));

        let out = source.collect(4).unwrap();
        assert_eq!(out.empty_batches, 2);
        assert_eq!(out.attempts, 3);
        assert_eq!(clock.total_slept(), DELAY * 3);
    }

    #[test]
    fn window_is_recomputed_every_attempt() {
        let feed = Scripted::new(vec![Ok(vec![]), Ok(posts(&["2025-03-14T15:09:26.535897Z"]))]);
        let clock = ManualClock::new(Duration::from_secs(1_000));
        let gate = RateGate::new(DELAY);
        let source = EntropySource::new(&feed, &clock, &gate, RetryPolicy::unbounded(DELAY));

        source.collect(4).unwrap();
        let windows = feed.windows.lock().unwrap().clone();
        assert_eq!(
            windows,
            vec![TimeWindow::ending_at(1_000), TimeWindow::ending_at(1_001)]
        );
    }

    #[test]
    fn attempt_cap_surfaces_timeout() {
        let feed = Scripted::new(vec![Ok(vec![])]);
        let clock = ManualClock::new(Duration::from_secs(1_000));
        let gate = RateGate::new(DELAY);
        let policy = RetryPolicy {
            delay: DELAY,
            max_attempts: Some(5),
            deadline: None,
        };
        let source = EntropySource::new(&feed, &clock, &gate, policy);

        match source.collect(16) {
            Err(XEntropyError::CollectionTimeout {
                attempts,
                collected,
                target,
            }) => {
                assert_eq!(attempts, 5);
                assert_eq!(collected, 0);
                assert_eq!(target, 16);
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[test]
    fn deadline_surfaces_timeout() {
        let feed = Scripted::new(vec![Ok(vec![])]);
        let clock = ManualClock::new(Duration::from_secs(1_000));
        let gate = RateGate::new(DELAY);
        let policy = RetryPolicy {
            delay: DELAY,
            max_attempts: None,
            deadline: Some(Duration::from_secs(6)),
        };
        let source = EntropySource::new(&feed, &clock, &gate, policy);

        let err = source.collect(16).unwrap_err();
        // 1.2 s per attempt: attempts start at 0, 1.2, 2.4, 3.6, 4.8; 6.0 is out.
        assert!(matches!(
            err,
            XEntropyError::CollectionTimeout { attempts: 5, .. }
        ));
    }

    #[test]
    fn gate_wait_past_deadline_skips_the_request() {
        let feed = Scripted::new(vec![Ok(posts(&["2025-03-14T15:09:26.535897Z"]))]);
        let clock = ManualClock::new(Duration::from_secs(1_000));
        let gate = RateGate::new(Duration::from_secs(10));
        // Another caller already holds the slot until t = 1010.
        gate.acquire(&clock);
        let policy = RetryPolicy {
            delay: DELAY,
            max_attempts: None,
            deadline: Some(Duration::from_secs(5)),
        };
        let source = EntropySource::new(&feed, &clock, &gate, policy);

        let err = source.collect(4).unwrap_err();
        assert!(matches!(
            err,
            XEntropyError::CollectionTimeout {
                attempts: 0,
                collected: 0,
                target: 4
            }
        ));
        assert!(feed.windows.lock().unwrap().is_empty());
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(10)]);
    }
}
