//! Weighted coin flip deciding whether a message drops a cheese.
//!
//! The weight is a static bias: every flip is independent, and a long dry
//! spell does not make the next drop more likely.

use rand::rngs::StdRng;
use rand::seq::IndexedRandom as _;
use rand::{Rng as _, SeedableRng as _};

use crate::config::DEFAULT_DROP_MESSAGE;

/// Lowest accepted drop chance, in percent.
pub const MIN_CHANCE_WEIGHT: u8 = 10;

/// Highest accepted drop chance, in percent.
pub const MAX_CHANCE_WEIGHT: u8 = 50;

/// Drop chance in percent, always within 10..=50.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ChanceWeight(u8);

impl ChanceWeight {
    /// Clamp a raw configured value into the legal range.
    pub fn new(raw: i64) -> Self {
        let clamped = raw.clamp(i64::from(MIN_CHANCE_WEIGHT), i64::from(MAX_CHANCE_WEIGHT));
        Self(u8::try_from(clamped).unwrap_or(MIN_CHANCE_WEIGHT))
    }

    /// The chance in percent.
    pub const fn percent(self) -> u8 {
        self.0
    }
}

impl Default for ChanceWeight {
    fn default() -> Self {
        Self(MIN_CHANCE_WEIGHT)
    }
}

/// Source of drop decisions and announcement choices.
#[derive(Debug)]
pub enum DropSampler {
    /// Pseudo-random flips from a seeded generator.
    Random(StdRng),
    /// Every flip returns the given value and the first announcement is
    /// always chosen. Useful for walking through the drop flow by hand.
    Fixed(bool),
}

impl DropSampler {
    /// A random sampler seeded once from the operating system.
    pub fn from_entropy() -> Self {
        Self::Random(StdRng::from_os_rng())
    }

    /// A random sampler with a fixed seed, for reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self::Random(StdRng::seed_from_u64(seed))
    }

    /// Flip the weighted coin: `true` with probability `weight / 100`.
    pub fn sample(&mut self, weight: ChanceWeight) -> bool {
        match self {
            Self::Random(rng) => rng.random_range(0..100_u8) < weight.percent(),
            Self::Fixed(outcome) => *outcome,
        }
    }

    /// Pick an announcement for a fresh drop.
    pub fn pick_message<'a>(&mut self, messages: &'a [String]) -> &'a str {
        let picked = match self {
            Self::Random(rng) => messages.choose(rng),
            Self::Fixed(_) => messages.first(),
        };
        picked.map_or(DEFAULT_DROP_MESSAGE, String::as_str)
    }
}

impl Default for DropSampler {
    fn default() -> Self {
        Self::from_entropy()
    }
}
