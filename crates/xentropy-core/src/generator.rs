//! Seeded linear congruential generator and range mapping.
//!
//! `state' = (1664525 * state + 1013904223) mod 2^32`. The seed is the first
//! eight bytes of the [`ConditionedSeed`], big-endian, top bit cleared. Only
//! the low 32 bits of the seed survive the first step, so the output space is
//! 32 bits. This is a short-period, statistically weak generator and is meant
//! to be drawn from once per seed.
//!
//! Range mapping is `min + value % width`. Whenever `width` does not divide
//! 2^32 the low residues are slightly favoured; [`modulo_bias`] gives the
//! exact bound. That bias is part of the design and is not corrected here.

use crate::conditioning::ConditionedSeed;
use crate::error::{Result, XEntropyError};

pub const LCG_MULTIPLIER: u64 = 1_664_525;
pub const LCG_INCREMENT: u64 = 1_013_904_223;
/// `m = 2^32`.
pub const LCG_MODULUS: u64 = 1 << 32;

/// Generator state derived from a seed: first 8 bytes big-endian, top bit
/// cleared.
pub fn seed_state(seed: &ConditionedSeed) -> u64 {
    let bytes = seed.as_bytes();
    let mut head = [0u8; 8];
    head.copy_from_slice(&bytes[..8]);
    u64::from_be_bytes(head) & 0x7FFF_FFFF_FFFF_FFFF
}

/// One LCG step. Wrapping arithmetic is exact here because 2^32 divides 2^64.
pub const fn lcg_step(state: u64) -> u64 {
    LCG_MULTIPLIER
        .wrapping_mul(state)
        .wrapping_add(LCG_INCREMENT)
        % LCG_MODULUS
}

/// Number of values in `min..=max`, if it fits an `i64`.
pub fn range_width(min: i64, max: i64) -> Result<u64> {
    if min > max {
        return Err(XEntropyError::InvalidRange { min, max });
    }
    max.checked_sub(min)
        .and_then(|span| span.checked_add(1))
        .map(|width| width as u64)
        .ok_or(XEntropyError::RangeOverflow { min, max })
}

/// Map a 32-bit draw into `min..=max` by modulo reduction.
pub fn map_to_range(value: u32, min: i64, max: i64) -> Result<i64> {
    let width = range_width(min, max)?;
    let offset = u64::from(value) % width;
    // offset < width, so min + offset <= max.
    Ok(min.wrapping_add(offset as i64))
}

/// Worst-case excess probability of a residue: `(2^32 mod width) / 2^32`.
///
/// Zero for powers of two up to 2^32. For widths above 2^32 the draw cannot
/// reach most of the range and the result saturates at 1.0.
pub fn modulo_bias(width: u64) -> f64 {
    if width == 0 {
        return 0.0;
    }
    (LCG_MODULUS % width) as f64 / LCG_MODULUS as f64
}

/// A generator that has been seeded. There is no unseeded state to misuse:
/// construction is the `initialize` transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedGenerator {
    state: u64,
}

impl BoundedGenerator {
    pub fn from_seed(seed: &ConditionedSeed) -> Self {
        Self {
            state: seed_state(seed),
        }
    }

    /// Current state, for logging.
    pub fn state(&self) -> u64 {
        self.state
    }

    /// Advance once and return the new 32-bit state.
    pub fn next_u32(&mut self) -> u32 {
        self.state = lcg_step(self.state);
        self.state as u32
    }

    /// Draw once and map into `min..=max`.
    pub fn draw_in_range(&mut self, min: i64, max: i64) -> Result<i64> {
        range_width(min, max)?;
        let value = self.next_u32();
        map_to_range(value, min, max)
    }
}
