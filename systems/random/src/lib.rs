#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded random source shared by the generation systems.
//!
//! Every level build draws from its own ChaCha stream whose seed is derived
//! from the session seed, the build index, and the season/year being built.
//! Replaying the same command stream therefore reproduces the same levels.

use charm_seasons_core::{RandomSource, Season};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

const RNG_STREAM_BUILD: &str = "level-build";

/// Deterministic [`RandomSource`] backed by ChaCha8.
#[derive(Clone, Debug)]
pub struct SeededRandom {
    rng: ChaCha8Rng,
}

impl SeededRandom {
    /// Creates a source seeded directly from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Creates the source dedicated to one level build.
    #[must_use]
    pub fn for_build(session_seed: u64, build_index: u64, season: Season, year: u32) -> Self {
        Self::new(derive_build_seed(session_seed, build_index, season, year))
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }

    fn range_inclusive(&mut self, low: u32, high: u32) -> u32 {
        if high <= low {
            return low;
        }
        self.rng.gen_range(low..=high)
    }
}

/// Derives the seed of a single level build.
#[must_use]
pub fn derive_build_seed(session_seed: u64, build_index: u64, season: Season, year: u32) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(session_seed.to_le_bytes());
    hasher.update(RNG_STREAM_BUILD.as_bytes());
    hasher.update(build_index.to_le_bytes());
    hasher.update(season.name().as_bytes());
    hasher.update(year.to_le_bytes());
    finalize_seed(hasher)
}

fn finalize_seed(hasher: Sha256) -> u64 {
    let digest = hasher.finalize();
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}
