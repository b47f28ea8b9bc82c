//! The public entry point: [`XEntropy::generate`].
//!
//! One call runs the whole pipeline with fresh state:
//!
//! ```text
//! validate → collect (feed, retry, fallback) → SHA-256 seed → LCG → min + v % width
//! ```
//!
//! The facade itself only holds static configuration plus the shared pieces
//! that must be shared: the feed client, the clock and the [`RateGate`]. It is
//! `Send + Sync`, so one instance can serve concurrent callers; each call gets
//! its own buffer and generator.

use std::sync::Arc;

use log::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::conditioning::{SEED_BYTES, condition_seed};
use crate::config::XEntropyConfig;
use crate::error::{Result, XEntropyError};
use crate::feed::{PostFeed, SearchClient};
use crate::generator::BoundedGenerator;
use crate::rate_limit::RateGate;
use crate::source::EntropySource;

/// Outcome of one generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draw {
    pub value: i64,
    pub min: i64,
    pub max: i64,
    /// Feed requests issued while collecting.
    pub attempts: u32,
    /// Post timestamps that went into the seed.
    pub events: usize,
    /// Words taken from the local clock because a request failed.
    pub fallback_chunks: usize,
}

impl Draw {
    /// True when the seed includes clock fallback entropy.
    pub fn degraded(&self) -> bool {
        self.fallback_chunks > 0
    }
}

/// Random integers in a caller-chosen range, seeded from recent posts.
pub struct XEntropy {
    config: XEntropyConfig,
    feed: Arc<dyn PostFeed>,
    clock: Arc<dyn Clock>,
    gate: RateGate,
}

impl std::fmt::Debug for XEntropy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XEntropy")
            .field("config", &self.config)
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}

impl XEntropy {
    /// Validate `config` and connect to the configured search endpoint.
    pub fn new(config: XEntropyConfig) -> Result<Self> {
        config.validate()?;
        let feed = SearchClient::new(&config)?;
        Self::with_feed(config, Arc::new(feed), Arc::new(SystemClock))
    }

    /// Build with an explicit feed and clock.
    pub fn with_feed(
        config: XEntropyConfig,
        feed: Arc<dyn PostFeed>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        let gate = RateGate::new(config.retry.delay);
        info!("XEntropy initialized");
        Ok(Self {
            config,
            feed,
            clock,
            gate,
        })
    }

    pub fn config(&self) -> &XEntropyConfig {
        &self.config
    }

    /// A random integer in `min..=max`.
    pub fn generate(&self, min: i64, max: i64) -> Result<i64> {
        self.generate_detailed(min, max).map(|draw| draw.value)
    }

    /// Like [`generate`](Self::generate), but also reports how the seed was
    /// collected.
    pub fn generate_detailed(&self, min: i64, max: i64) -> Result<Draw> {
        if min > max {
            return Err(XEntropyError::InvalidRange { min, max });
        }

        let source = EntropySource::new(
            self.feed.as_ref(),
            self.clock.as_ref(),
            &self.gate,
            self.config.retry,
        );
        let collection = source.collect(self.config.target_bytes())?;

        let seed = condition_seed(collection.buffer.as_bytes());
        info!("Generated {}-bit entropy seed", SEED_BYTES * 8);

        let mut generator = BoundedGenerator::from_seed(&seed);
        debug!("LCG initialized with state: {}", generator.state());

        let value = generator.draw_in_range(min, max)?;
        info!("Generated random number: {value} (range: {min}-{max})");

        Ok(Draw {
            value,
            min,
            max,
            attempts: collection.attempts,
            events: collection.events,
            fallback_chunks: collection.fallback_chunks,
        })
    }
}
