//! Seedable random streams.
//!
//! A run owns one master seed. The initial population is drawn from the
//! master stream; every reproduction slot gets its own stream derived from
//! `(seed, generation, slot)`, so the offspring of a slot do not depend on
//! which worker produced them or in what order.

use rand::SeedableRng;
use rand::rngs::SmallRng;

/// Random generator used by every operator.
pub type GaRng = SmallRng;

/// SplitMix64 finalizer.
fn mix(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Factory for the master stream and per-slot streams of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Streams {
    seed: u64,
}

impl Streams {
    /// Streams for the given master seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Streams seeded from OS entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    /// The master seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The master stream, used to draw the initial population.
    #[must_use]
    pub fn master(&self) -> GaRng {
        GaRng::seed_from_u64(self.seed)
    }

    /// Independent stream for reproduction slot `slot` of `generation`.
    #[must_use]
    pub fn slot(&self, generation: usize, slot: usize) -> GaRng {
        let g = mix(self.seed ^ mix(generation as u64));
        GaRng::seed_from_u64(mix(g ^ mix((slot as u64).wrapping_add(0x5EED))))
    }
}
