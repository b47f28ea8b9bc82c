//! # xentropy-core
//!
//! **Random numbers from the timestamps of what people just posted.**
//!
//! `xentropy-core` draws a random integer in a caller-chosen inclusive range,
//! seeding it from the creation times of recent public posts instead of a
//! local RNG. It is a novelty entropy source. It is **not** a cryptographically
//! secure generator: anyone who can see or influence the feed can predict it.
//!
//! ## Quick Start
//!
//! ```no_run
//! use xentropy_core::{XEntropy, XEntropyConfig};
//!
//! // Reads XAI_API_KEY and the optional XENTROPY_* overrides.
//! let config = XEntropyConfig::from_env()?;
//! let xentropy = XEntropy::new(config)?;
//!
//! let roll = xentropy.generate(1, 6)?;
//! assert!((1..=6).contains(&roll));
//! # Ok::<(), xentropy_core::XEntropyError>(())
//! ```
//!
//! ## Architecture
//!
//! Feed → EntropySource (windowed, rate limited) → SHA-256 conditioning →
//! seeded LCG → `min + value % width`
//!
//! - [`EntropySource`] searches the last 60 seconds of posts, keeps the low 32
//!   bits of each nanosecond timestamp, and retries until it has enough
//!   bytes. Failed requests contribute clock entropy instead of failing.
//! - [`conditioning`] hashes the raw buffer down to a 128-bit seed.
//! - [`BoundedGenerator`] is a 32-bit LCG seeded once and drawn from once.
//! - [`XEntropy`] runs the pipeline per call and owns only static config.

pub mod clock;
pub mod conditioning;
pub mod config;
pub mod error;
pub mod facade;
pub mod feed;
pub mod generator;
pub mod logging;
pub mod rate_limit;
pub mod source;

pub use clock::{Clock, ManualClock, SystemClock};
pub use conditioning::{ConditionedSeed, SEED_BYTES, condition, condition_seed};
pub use config::{ApiKey, XEntropyConfig};
pub use error::{FetchError, Result, XEntropyError};
pub use facade::{Draw, XEntropy};
pub use feed::{Post, PostFeed, SearchClient, TimeWindow, timestamp_entropy};
pub use generator::{BoundedGenerator, lcg_step, map_to_range, modulo_bias, range_width};
pub use rate_limit::{RateGate, RetryPolicy};
pub use source::{Collection, EntropySource, RawEntropyBuffer};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
