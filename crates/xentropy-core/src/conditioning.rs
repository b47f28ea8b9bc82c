//! Conditioning of raw post-timestamp entropy into a generator seed.
//!
//! Timestamps collected in the same minute share most of their high-order
//! bits, so the raw buffer is far from uniform. SHA-256 over the whole buffer
//! acts as the extractor; the seed is the first 16 bytes of the digest.
//!
//! ```text
//! RawEntropyBuffer → SHA-256 → truncate(16) → ConditionedSeed
//! ```

use sha2::{Digest, Sha256};

/// Seed width in bytes (128 bits).
pub const SEED_BYTES: usize = 16;

/// A 128-bit seed derived from one collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConditionedSeed([u8; SEED_BYTES]);

impl ConditionedSeed {
    pub fn from_bytes(bytes: [u8; SEED_BYTES]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SEED_BYTES] {
        &self.0
    }

    /// Lowercase hex, for logs and diagnostics.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

/// Digest `raw` and keep the first `n_output` bytes (at most 32).
pub fn condition(raw: &[u8], n_output: usize) -> Vec<u8> {
    let digest = Sha256::digest(raw);
    digest[..n_output.min(digest.len())].to_vec()
}

/// Condition a raw buffer into a [`ConditionedSeed`].
pub fn condition_seed(raw: &[u8]) -> ConditionedSeed {
    let digest: [u8; 32] = Sha256::digest(raw).into();
    let mut seed = [0u8; SEED_BYTES];
    seed.copy_from_slice(&digest[..SEED_BYTES]);
    ConditionedSeed(seed)
}
