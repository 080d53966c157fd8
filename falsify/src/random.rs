//! Seeded random source with a reproducible seed string.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

use crate::error::ConfigError;

/// A seeded pseudo-random source.
///
/// Every draw is a pure function of the seed and the sequence of previous draws. The seed is
/// kept as a string so that it can be reported on failure and handed back to
/// [`RandomSource::from_seed`] to replay exactly the same values.
#[derive(Debug, Clone)]
pub struct RandomSource {
    seed: String,
    rng: StdRng,
}

impl RandomSource {
    /// Create a source with a fresh seed drawn from entropy
    pub fn new() -> Self {
        let seed: u64 = rand::thread_rng().r#gen();
        Self::from_u64(seed)
    }

    /// Create a source from a numeric seed
    pub fn from_u64(seed: u64) -> Self {
        Self {
            seed: seed.to_string(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Parse a seed string produced by [`RandomSource::seed`]
    pub fn from_seed(seed: &str) -> Result<Self, ConfigError> {
        let parsed = seed
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::MalformedSeed {
                seed: seed.to_string(),
            })?;
        Ok(Self::from_u64(parsed))
    }

    /// The seed that reproduces this source from its initial state
    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Derive an independent child source; the child's seed is drawn from this source
    pub fn split(&mut self) -> RandomSource {
        let child_seed: u64 = self.rng.r#gen();
        Self::from_u64(child_seed)
    }
}

impl Default for RandomSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RngCore for RandomSource {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}
