//! Genome and population representation.
//!
//! A genome is a fixed-length bit vector where bit `i` says whether item `i`
//! of the catalog is packed. Genomes are never edited in place: crossover and
//! mutation always build new ones.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A fixed-length binary vector encoding inclusion of each catalog item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Genome {
    genes: Vec<bool>,
}

/// An ordered collection of genomes of equal length.
pub type Population = Vec<Genome>;

impl Genome {
    /// Wrap an explicit gene vector.
    #[must_use]
    pub fn new(genes: Vec<bool>) -> Self {
        Self { genes }
    }

    /// Uniformly random genome: each bit is set with probability 0.5.
    #[must_use]
    pub fn random<R: Rng>(length: usize, rng: &mut R) -> Self {
        Self {
            genes: (0..length).map(|_| rng.gen_bool(0.5)).collect(),
        }
    }

    /// Number of genes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Whether the genome has no genes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Gene values in index order.
    #[must_use]
    pub fn genes(&self) -> &[bool] {
        &self.genes
    }

    /// Gene at `index`, or `None` past the end.
    #[must_use]
    pub fn gene(&self, index: usize) -> Option<bool> {
        self.genes.get(index).copied()
    }

    /// Number of set bits.
    #[must_use]
    pub fn count_ones(&self) -> usize {
        self.genes.iter().filter(|&&g| g).count()
    }

    /// Indices of the set bits.
    pub fn selected(&self) -> impl Iterator<Item = usize> + '_ {
        self.genes
            .iter()
            .enumerate()
            .filter_map(|(i, &g)| g.then_some(i))
    }

    /// Parse a string of `0`/`1` characters.
    #[must_use]
    pub fn from_bits(bits: &str) -> Option<Self> {
        bits.chars()
            .map(|c| match c {
                '0' => Some(false),
                '1' => Some(true),
                _ => None,
            })
            .collect::<Option<Vec<bool>>>()
            .map(Self::new)
    }
}

impl FromIterator<bool> for Genome {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &gene in &self.genes {
            f.write_str(if gene { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl Serialize for Genome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Genome {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bits = String::deserialize(deserializer)?;
        Self::from_bits(&bits)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid genome bits: {bits:?}")))
    }
}

/// Generate a uniformly random genome of the given length.
#[must_use]
pub fn generate_genome<R: Rng>(length: usize, rng: &mut R) -> Genome {
    Genome::random(length, rng)
}

/// Generate `size` independent random genomes of the given length.
#[must_use]
pub fn generate_population<R: Rng>(size: usize, length: usize, rng: &mut R) -> Population {
    (0..size).map(|_| generate_genome(length, rng)).collect()
}
