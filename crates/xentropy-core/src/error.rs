//! Error types for the xentropy pipeline.
//!
//! Only [`XEntropyError`] ever reaches a caller of [`crate::XEntropy`].
//! [`FetchError`] describes a single failed search request and is absorbed by
//! the entropy collector, which falls back to clock entropy instead.

use thiserror::Error;

/// Errors surfaced to callers of the public API.
#[derive(Debug, Error)]
pub enum XEntropyError {
    /// Missing or placeholder credential, or otherwise unusable configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// `min` is greater than `max`.
    #[error("minimum value {min} cannot be greater than maximum {max}")]
    InvalidRange { min: i64, max: i64 },

    /// `max - min + 1` does not fit the generator's working width.
    #[error("range {min}..={max} is too large for random number generation")]
    RangeOverflow { min: i64, max: i64 },

    /// The retry bound (attempt cap or deadline) ran out before enough
    /// entropy was collected.
    #[error(
        "entropy collection gave up after {attempts} attempts with {collected}/{target} bytes"
    )]
    CollectionTimeout {
        attempts: u32,
        collected: usize,
        target: usize,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, XEntropyError>;

/// Failure of one outbound search request.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API request failed with code {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}
