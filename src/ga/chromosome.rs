//! Genotype and population containers.
//!
//! A [`Chromosome`] owns its genes and a lazily computed fitness cache. The
//! genes are private: every write goes through an accessor that clears the
//! cache, so a cached value can never describe genes it was not computed
//! from.

use super::types::{GaProblem, Gene};

/// A fixed-length genotype with a cached fitness.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Chromosome {
    genes: Vec<Gene>,
    #[cfg_attr(feature = "serde", serde(skip))]
    fitness: Option<f64>,
}

impl Chromosome {
    /// Creates a chromosome with an unset fitness cache.
    pub fn new(genes: Vec<Gene>) -> Self {
        Self {
            genes,
            fitness: None,
        }
    }

    /// The genes, in locus order.
    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    /// The gene at `locus`.
    ///
    /// # Panics
    /// Panics if `locus` is out of bounds.
    pub fn gene(&self, locus: usize) -> Gene {
        self.genes[locus]
    }

    /// Number of genes.
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Returns `true` if the chromosome has no genes.
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Writes the gene at `locus` and clears the fitness cache.
    pub fn set_gene(&mut self, locus: usize, gene: Gene) {
        self.genes[locus] = gene;
        self.fitness = None;
    }

    /// Flips a binary gene (`0 ↔ 1`) and clears the fitness cache.
    pub fn flip(&mut self, locus: usize) {
        self.genes[locus] = 1 - self.genes[locus].min(1);
        self.fitness = None;
    }

    /// Mutable access to all genes. Clears the fitness cache up front.
    pub fn genes_mut(&mut self) -> &mut [Gene] {
        self.fitness = None;
        &mut self.genes
    }

    /// The cached fitness, or `None` if it has not been computed since the
    /// last gene write.
    pub fn cached_fitness(&self) -> Option<f64> {
        self.fitness
    }

    /// Returns the fitness, evaluating and caching it on first use.
    pub fn fitness<P: GaProblem>(&mut self, problem: &P) -> f64 {
        if let Some(f) = self.fitness {
            return f;
        }
        let f = problem.fitness(self);
        self.fitness = Some(f);
        f
    }

    /// Consumes the chromosome, returning its genes.
    pub fn into_genes(self) -> Vec<Gene> {
        self.genes
    }
}

/// Best-member summary of a population, as computed by [`Population::best`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationStats {
    /// Index of the first member with the maximum fitness.
    pub best_index: usize,

    /// Maximum fitness.
    pub best_fitness: f64,

    /// Mean fitness over all members.
    pub mean_fitness: f64,
}

/// A generation's chromosomes.
///
/// Order carries no meaning for the GA, but it is kept stable so that runs
/// replay identically from the same seed.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Population {
    members: Vec<Chromosome>,
}

impl Population {
    /// Wraps a list of chromosomes.
    pub fn new(members: Vec<Chromosome>) -> Self {
        Self { members }
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` if the population has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// The members, in order.
    pub fn members(&self) -> &[Chromosome] {
        &self.members
    }

    /// Mutable access to the members.
    ///
    /// Gene writes still go through [`Chromosome`]'s invalidating accessors.
    pub fn members_mut(&mut self) -> &mut [Chromosome] {
        &mut self.members
    }

    /// Iterates over the members.
    pub fn iter(&self) -> std::slice::Iter<'_, Chromosome> {
        self.members.iter()
    }

    /// Appends a member.
    pub fn push(&mut self, chromosome: Chromosome) {
        self.members.push(chromosome);
    }

    /// Removes and returns the member at `index`, shifting later members down.
    pub fn remove(&mut self, index: usize) -> Chromosome {
        self.members.remove(index)
    }

    /// Consumes the population, returning its members.
    pub fn into_members(self) -> Vec<Chromosome> {
        self.members
    }

    /// Fitness of the member at `index`, evaluated on demand.
    pub fn fitness_of<P: GaProblem>(&mut self, index: usize, problem: &P) -> f64 {
        self.members[index].fitness(problem)
    }

    /// Fills every missing fitness cache.
    ///
    /// With the `parallel` feature and `parallel == true` members are
    /// evaluated with rayon. Evaluation draws no randomness, so the result
    /// is the same either way.
    pub fn evaluate<P: GaProblem>(&mut self, problem: &P, parallel: bool) {
        #[cfg(feature = "parallel")]
        if parallel {
            use rayon::prelude::*;
            self.members.par_iter_mut().for_each(|c| {
                c.fitness(problem);
            });
            return;
        }
        #[cfg(not(feature = "parallel"))]
        let _ = parallel;

        for c in &mut self.members {
            c.fitness(problem);
        }
    }

    /// Single pass over the population: maximum fitness (first-seen wins
    /// ties) and mean fitness.
    ///
    /// The mean is recomputed on every call.
    ///
    /// # Panics
    /// Panics if the population is empty.
    pub fn best<P: GaProblem>(&mut self, problem: &P) -> PopulationStats {
        assert!(!self.members.is_empty(), "population must not be empty");

        let n = self.members.len() as f64;
        let mut best_index = 0;
        let mut best_fitness = self.members[0].fitness(problem);
        let mut mean_fitness = best_fitness / n;
        for (i, c) in self.members.iter_mut().enumerate().skip(1) {
            let f = c.fitness(problem);
            if f > best_fitness {
                best_fitness = f;
                best_index = i;
            }
            mean_fitness += f / n;
        }

        PopulationStats {
            best_index,
            best_fitness,
            mean_fitness,
        }
    }

    /// Single pass over the population: index and fitness of the minimum
    /// (first-seen wins ties).
    ///
    /// # Panics
    /// Panics if the population is empty.
    pub fn worst<P: GaProblem>(&mut self, problem: &P) -> (usize, f64) {
        assert!(!self.members.is_empty(), "population must not be empty");

        let mut worst_index = 0;
        let mut worst_fitness = self.members[0].fitness(problem);
        for (i, c) in self.members.iter_mut().enumerate().skip(1) {
            let f = c.fitness(problem);
            if f < worst_fitness {
                worst_fitness = f;
                worst_index = i;
            }
        }
        (worst_index, worst_fitness)
    }
}

impl From<Vec<Chromosome>> for Population {
    fn from(members: Vec<Chromosome>) -> Self {
        Self::new(members)
    }
}

impl<'a> IntoIterator for &'a Population {
    type Item = &'a Chromosome;
    type IntoIter = std::slice::Iter<'a, Chromosome>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}
