//! Uniform crossover.
//!
//! Each gene of each child is inherited from either parent with equal
//! probability. The two children use independent coins, so they are not
//! complements of each other and neither is guaranteed to carry material from
//! a particular parent.

use rand::Rng;

use crate::ga::genome::Genome;

/// Cross two parents into two children of the same length.
///
/// Parents of different lengths are crossed over their common prefix.
#[must_use]
pub fn uniform_crossover<R: Rng>(a: &Genome, b: &Genome, rng: &mut R) -> (Genome, Genome) {
    let pairs = || a.genes().iter().zip(b.genes());

    let child_a = pairs()
        .map(|(&ga, &gb)| if rng.r#gen::<f64>() > 0.5 { ga } else { gb })
        .collect::<Genome>();
    let child_b = pairs()
        .map(|(&ga, &gb)| if rng.r#gen::<f64>() > 0.5 { gb } else { ga })
        .collect::<Genome>();

    (child_a, child_b)
}
