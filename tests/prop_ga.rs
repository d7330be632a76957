//! Property-based tests for the GA operators and the knapsack catalog.
//!
//! Run with: cargo test --release prop_ga

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use rand::SeedableRng;

use knapsack_evo::ga::{
    EvolutionConfig, GaRng, Genome, generate_population, mutate, mutation_probability,
    tournament_select, uniform_crossover,
};
use knapsack_evo::{Catalog, LimitStrategy};

fn catalog_strategy() -> impl Strategy<Value = Catalog> {
    (prop::collection::vec((0u64..500, 0u64..100), 0..16), 0u64..400).prop_map(|(items, capacity)| {
        let (values, weights) = items.into_iter().unzip();
        Catalog::new(values, weights, capacity).unwrap()
    })
}

fn genome_strategy(len: usize) -> impl Strategy<Value = Genome> {
    prop::collection::vec(any::<bool>(), len).prop_map(Genome::new)
}

fn catalog_and_genome() -> impl Strategy<Value = (Catalog, Genome)> {
    catalog_strategy().prop_flat_map(|catalog| {
        let len = catalog.len();
        (Just(catalog), genome_strategy(len))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Crossover and mutation never change genome length.
    #[test]
    fn prop_operators_preserve_length(
        len in 0usize..64,
        seed in any::<u64>(),
        generation in 0usize..200,
        base in 0.0f64..=1.0,
    ) {
        let mut rng = GaRng::seed_from_u64(seed);
        let parents = generate_population(2, len, &mut rng);
        let (a, b) = uniform_crossover(&parents[0], &parents[1], &mut rng);
        prop_assert_eq!(a.len(), len);
        prop_assert_eq!(b.len(), len);

        let mutated = mutate(&a, generation, 100, base, &mut rng);
        prop_assert_eq!(mutated.len(), len);
    }

    /// Each crossover child takes every gene from one of its parents.
    #[test]
    fn prop_crossover_genes_come_from_parents(len in 1usize..64, seed in any::<u64>()) {
        let mut rng = GaRng::seed_from_u64(seed);
        let parents = generate_population(2, len, &mut rng);
        let (a, b) = uniform_crossover(&parents[0], &parents[1], &mut rng);

        for i in 0..len {
            let options = [parents[0].gene(i), parents[1].gene(i)];
            prop_assert!(options.contains(&a.gene(i)));
            prop_assert!(options.contains(&b.gene(i)));
        }
    }

    /// Fitness is the packed value when it fits, otherwise zero.
    #[test]
    fn prop_fitness_rule((catalog, genome) in catalog_and_genome()) {
        let (value, weight) = genome
            .selected()
            .fold((0u64, 0u64), |(v, w), i| (v + catalog.values()[i], w + catalog.weights()[i]));

        let expected = if weight <= catalog.capacity() { value } else { 0 };
        prop_assert_eq!(catalog.fitness(&genome), expected);
        prop_assert_eq!(catalog.pack(&genome).feasible, weight <= catalog.capacity());
    }

    /// No genome beats the fractional relaxation, nor does the greedy packing.
    #[test]
    fn prop_relaxed_bound_dominates((catalog, genome) in catalog_and_genome()) {
        let bound = catalog.relaxed_bound();
        prop_assert!(catalog.fitness(&genome) <= bound);
        prop_assert!(catalog.fitness_limit() <= bound);
    }

    /// Some feasible packing scores exactly the greedy limit, and no feasible
    /// packing beats the fractional bound.
    #[test]
    fn prop_greedy_limit_is_attainable(catalog in catalog_strategy()) {
        let n = catalog.len();
        let mut attained = false;
        let mut best = 0u64;
        for mask in 0u32..(1 << n) {
            let genome: Genome = (0..n).map(|i| mask & (1 << i) != 0).collect();
            if !catalog.pack(&genome).feasible {
                continue;
            }
            let fitness = catalog.fitness(&genome);
            attained |= fitness == catalog.fitness_limit();
            best = best.max(fitness);
        }

        prop_assert!(attained, "no feasible packing scores {}", catalog.fitness_limit());
        prop_assert!(catalog.fitness_limit() <= best);
        prop_assert!(best <= catalog.relaxed_bound());
    }

    /// Decayed mutation probability never increases over generations.
    #[test]
    fn prop_mutation_probability_monotone(
        generation in 0usize..1000,
        max in 1usize..1000,
        base in 0.0f64..=1.0,
    ) {
        let now = mutation_probability(generation, max, base);
        let next = mutation_probability(generation + 1, max, base);
        prop_assert!(next <= now);
        prop_assert!((0.0..=base).contains(&now));
    }

    /// Tournaments return a valid index, and the overall best when everyone competes.
    #[test]
    fn prop_tournament_index_in_range(
        fitness in prop::collection::vec(any::<u64>(), 1..50),
        k in 1usize..10,
        seed in any::<u64>(),
    ) {
        let mut rng = GaRng::seed_from_u64(seed);
        let idx = tournament_select(&fitness, k, &mut rng);
        prop_assert!(idx < fitness.len());
        if k >= fitness.len() {
            prop_assert_eq!(fitness[idx], *fitness.iter().max().unwrap());
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Population size holds every generation and elitism keeps the best.
    #[test]
    fn prop_run_invariants(
        catalog in catalog_strategy(),
        population_size in 1usize..24,
        elite_count in 1usize..4,
        seed in any::<u64>(),
    ) {
        let config = EvolutionConfig {
            population_size,
            generation_limit: 25,
            elite_count,
            seed: Some(seed),
            ..EvolutionConfig::default()
        };

        let mut sizes = Vec::new();
        let mut observer = |r: &knapsack_evo::ga::GenerationReport<'_>| sizes.push(r.population.len());
        let outcome = catalog.solve(config, LimitStrategy::Relaxed, &mut observer).unwrap();

        prop_assert!(sizes.iter().all(|&s| s == population_size));
        prop_assert_eq!(outcome.population.len(), population_size);

        let series = outcome.best_series();
        prop_assert!(series.windows(2).all(|w| w[1] >= w[0]), "best fitness regressed: {:?}", series);
        prop_assert!(outcome.fitness.windows(2).all(|w| w[0] >= w[1]));
    }
}
