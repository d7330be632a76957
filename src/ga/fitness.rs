//! Fitness contract and population evaluation.
//!
//! The engine never knows what problem it is solving; it only calls a
//! [`FitnessFunction`]. Scores are a pure function of the genome and the
//! problem data, so evaluating a generation in parallel yields the same
//! scores as evaluating it sequentially.

use rayon::prelude::*;

use crate::ga::genome::Genome;

/// Problem-specific scoring of a genome.
///
/// Implementations must be pure: the same genome always scores the same.
pub trait FitnessFunction: Sync {
    /// Score a genome. Higher is better.
    fn fitness(&self, genome: &Genome) -> u64;
}

impl<F> FitnessFunction for F
where
    F: Fn(&Genome) -> u64 + Sync,
{
    fn fitness(&self, genome: &Genome) -> u64 {
        self(genome)
    }
}

/// Score every genome, returning fitness in population order.
#[must_use]
pub fn evaluate_population<F>(population: &[Genome], fitness: &F, parallel: bool) -> Vec<u64>
where
    F: FitnessFunction + ?Sized,
{
    if parallel {
        population.par_iter().map(|g| fitness.fitness(g)).collect()
    } else {
        population.iter().map(|g| fitness.fitness(g)).collect()
    }
}

/// Sort a population best-first.
///
/// The sort is stable: genomes of equal fitness keep their relative order.
/// Returns the reordered population and its aligned fitness values.
#[must_use]
pub fn rank(population: Vec<Genome>, fitness: Vec<u64>) -> (Vec<Genome>, Vec<u64>) {
    let mut scored: Vec<(Genome, u64)> = population.into_iter().zip(fitness).collect();
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.into_iter().unzip()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::ga::genome::generate_population;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn test_parallel_matches_sequential() {
        let catalog = Catalog::example();
        let mut rng = SmallRng::seed_from_u64(5);
        let population = generate_population(200, catalog.len(), &mut rng);

        let sequential = evaluate_population(&population, &catalog, false);
        let parallel = evaluate_population(&population, &catalog, true);
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_closure_fitness() {
        let ones = |g: &Genome| g.count_ones() as u64;
        let population = vec![Genome::from_bits("101").unwrap(), Genome::from_bits("111").unwrap()];
        assert_eq!(evaluate_population(&population, &ones, false), vec![2, 3]);
    }

    #[test]
    fn test_rank_is_stable_descending() {
        let population: Vec<Genome> = ["00", "01", "10", "11"]
            .iter()
            .map(|b| Genome::from_bits(b).unwrap())
            .collect();
        let fitness = vec![5, 9, 5, 1];

        let (ranked, scores) = rank(population, fitness);
        assert_eq!(scores, vec![9, 5, 5, 1]);
        let order: Vec<String> = ranked.iter().map(ToString::to_string).collect();
        assert_eq!(order, vec!["01", "00", "10", "11"]);
    }
}
