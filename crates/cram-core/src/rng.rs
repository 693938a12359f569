//! Seeded xorshift64* generator used for shuffling
//!
//! Not cryptographic. Entropy only varies the play order between runs;
//! [`Rng::from_seed`] gives reproducible sequences.

use chrono::Utc;
use cram_config::RNG_RETRY_LIMIT;
use std::fs::File;
use std::io::{self, Read};
use std::num::NonZeroUsize;
use tracing::debug;

/// Replaces a seed that mixes to zero, which xorshift can never leave
const NONZERO_SEED: u64 = 0x9e37_79b9_7f4a_7c15;

const OUTPUT_MULTIPLIER: u64 = 0x2545_f491_4f6c_dd1d;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rng {
    state: u64,
    retry_limit: u32,
}

impl Rng {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            state: mix(seed),
            retry_limit: RNG_RETRY_LIMIT,
        }
    }

    /// Seed from `/dev/urandom`, or from the wall clock and pid if that fails
    pub fn from_entropy() -> Self {
        Self::from_seed(entropy_seed())
    }

    /// Attempts at rejection sampling before falling back to plain modulo
    pub fn with_retry_limit(mut self, retry_limit: u32) -> Self {
        self.retry_limit = retry_limit;
        self
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(OUTPUT_MULTIPLIER)
    }

    /// Uniform value in `0..upper`.
    ///
    /// Words below `2^64 mod upper` are redrawn so every residue is equally
    /// likely. If every attempt is rejected the last draw is reduced with a
    /// plain modulo, which is slightly biased.
    pub fn below(&mut self, upper: NonZeroUsize) -> usize {
        let upper = upper.get() as u64;
        let threshold = upper.wrapping_neg() % upper;

        for _ in 0..self.retry_limit {
            let r = self.next_u64();
            if r >= threshold {
                return (r % upper) as usize;
            }
        }

        (self.next_u64() % upper) as usize
    }

    /// Fisher-Yates, in place
    pub fn shuffle<T>(&mut self, values: &mut [T]) {
        for i in 1..values.len() {
            let j = self.below(NonZeroUsize::MIN.saturating_add(i));
            values.swap(i, j);
        }
    }
}

/// 64-bit avalanche finalizer
fn mix(seed: u64) -> u64 {
    let mut x = seed;
    x ^= x >> 33;
    x = x.wrapping_mul(0xff51_afd7_ed55_8ccd);
    x ^= x >> 33;
    x = x.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    x ^= x >> 33;
    if x == 0 { NONZERO_SEED } else { x }
}

fn entropy_seed() -> u64 {
    match urandom_seed() {
        Ok(seed) if seed != 0 => seed,
        Ok(_) => {
            debug!("Entropy source returned zero, seeding from clock");
            clock_seed()
        }
        Err(e) => {
            debug!(error = %e, "Entropy source unavailable, seeding from clock");
            clock_seed()
        }
    }
}

fn urandom_seed() -> io::Result<u64> {
    let mut bytes = [0u8; 8];
    File::open("/dev/urandom")?.read_exact(&mut bytes)?;
    Ok(u64::from_ne_bytes(bytes))
}

fn clock_seed() -> u64 {
    let now = Utc::now();
    let secs = now.timestamp() as u64;
    let nanos = u64::from(now.timestamp_subsec_nanos());
    (secs << 32) ^ nanos ^ u64::from(std::process::id())
}
