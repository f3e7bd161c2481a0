//! Core trait definitions for the GA framework.
//!
//! The two central traits — [`Evaluator`] and [`GaProblem`] — define the
//! contract between the generic GA engine and domain-specific problem
//! implementations. The engine only ever holds them by shared reference.

use super::chromosome::Chromosome;
use rand::Rng;

/// A single locus value. Binary problems use the alphabet `{0, 1}`.
pub type Gene = u8;

/// A decoded candidate (phenotype): the selected domain elements and their cost.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Solution {
    /// Indices of the domain elements present in the solution.
    pub elements: Vec<usize>,

    /// Objective value, set by [`Evaluator::evaluate`].
    pub cost: f64,
}

impl Solution {
    /// Creates an empty solution with zero cost.
    ///
    /// For a QBF the all-zero assignment has zero value, so this is also a
    /// correctly evaluated solution.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of selected elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if no element is selected.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// An objective function over a binary domain.
///
/// Implementations are read-only during a run and may be shared between
/// any number of concurrently executing runs.
pub trait Evaluator: Send + Sync {
    /// Dimension of the decision vector.
    fn domain_size(&self) -> usize;

    /// Computes the objective value of `solution`, stores it in
    /// `solution.cost` and returns it.
    fn evaluate(&self, solution: &mut Solution) -> f64;

    /// Repairs `chromosome` in place so that it satisfies problem-specific
    /// feasibility constraints. Called before every decode.
    ///
    /// Unconstrained problems keep the default no-op.
    fn make_viable(&self, _chromosome: &mut Chromosome) {}
}

/// Defines a GA optimization problem.
///
/// This is the trait plugged into [`GaRunner`](super::GaRunner). It covers:
///
/// 1. **Initialization**: how to create random chromosomes
/// 2. **Decoding**: how a genotype maps to an evaluated [`Solution`]
/// 3. **Mutation**: how a single locus is perturbed
///
/// Fitness is maximized. It defaults to the decoded solution's cost.
///
/// # Thread Safety
///
/// `GaProblem` must be `Send + Sync` because independent runs over the same
/// problem may execute on different threads, and fitness may be evaluated in
/// parallel with rayon.
pub trait GaProblem: Send + Sync {
    /// Number of genes in every chromosome.
    fn chromosome_size(&self) -> usize;

    /// Creates a random chromosome of [`chromosome_size`](Self::chromosome_size) genes.
    fn create_chromosome<R: Rng>(&self, rng: &mut R) -> Chromosome;

    /// Maps a genotype to its evaluated solution.
    ///
    /// May repair the chromosome in place first; any such write clears its
    /// cached fitness, which is then set by the caller from the returned cost.
    fn decode(&self, chromosome: &mut Chromosome) -> Solution;

    /// Mutates the gene at `locus`.
    ///
    /// Must go through an invalidating accessor such as
    /// [`Chromosome::flip`] or [`Chromosome::set_gene`].
    fn mutate_gene(&self, chromosome: &mut Chromosome, locus: usize);

    /// Scalar fitness of a chromosome (higher is better).
    ///
    /// The engine calls this only through [`Chromosome::fitness`], which
    /// caches the result until the next gene write.
    fn fitness(&self, chromosome: &mut Chromosome) -> f64 {
        self.decode(chromosome).cost
    }

    /// Called at the end of each generation with the best fitness so far.
    ///
    /// The default implementation is a no-op.
    fn on_generation(&self, _generation: usize, _best_fitness: f64) {}
}
