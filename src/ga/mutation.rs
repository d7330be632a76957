//! Bit-flip mutation with a linearly decaying rate.
//!
//! The per-gene flip probability starts at the base rate in generation 0 and
//! falls linearly to zero at the generation budget: wide exploration early,
//! stability late.

// Generation counters are converted to f64 for the schedule
#![allow(clippy::cast_precision_loss)]

use rand::Rng;

use crate::ga::genome::Genome;

/// Per-gene flip probability at `generation` of `max_generations`.
///
/// `base_prob * (1 - generation / max_generations)`, clamped to
/// `[0, base_prob]`. A zero budget disables mutation.
#[must_use]
pub fn mutation_probability(generation: usize, max_generations: usize, base_prob: f64) -> f64 {
    if max_generations == 0 {
        return 0.0;
    }
    let progress = (generation as f64 / max_generations as f64).min(1.0);
    (base_prob * (1.0 - progress)).max(0.0)
}

/// Return a copy of `genome` with each gene flipped independently.
#[must_use]
pub fn mutate<R: Rng>(
    genome: &Genome,
    generation: usize,
    max_generations: usize,
    base_prob: f64,
    rng: &mut R,
) -> Genome {
    let p = mutation_probability(generation, max_generations, base_prob);
    genome
        .genes()
        .iter()
        .map(|&gene| if rng.r#gen::<f64>() < p { !gene } else { gene })
        .collect()
}
