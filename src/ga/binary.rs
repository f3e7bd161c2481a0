//! Binary encoding over any [`Evaluator`].
//!
//! Each locus says whether the corresponding domain element is part of the
//! solution. Decoding repairs the chromosome with
//! [`Evaluator::make_viable`], collects the loci set to `1` and evaluates
//! the resulting [`Solution`].

use super::chromosome::Chromosome;
use super::types::{Evaluator, GaProblem, Solution};
use rand::Rng;

/// Adapts an [`Evaluator`] to the [`GaProblem`] interface with a `{0, 1}`
/// alphabet and bit-flip mutation.
///
/// # Examples
///
/// ```
/// use u_bitga::ga::{BinaryProblem, GaConfig, GaRunner};
/// use u_bitga::qbf::Qbf;
///
/// let qbf = Qbf::parse("3  1 -2 0  1 1  -1").unwrap();
/// let problem = BinaryProblem::new(qbf);
/// let config = GaConfig::default()
///     .with_population_size(20)
///     .with_max_generations(50)
///     .with_mutation_rate(0.2)
///     .with_seed(1);
/// let result = GaRunner::run(&problem, &config).unwrap();
/// assert!(result.best_fitness >= 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct BinaryProblem<E> {
    evaluator: E,
}

impl<E: Evaluator> BinaryProblem<E> {
    /// Wraps an evaluator.
    pub fn new(evaluator: E) -> Self {
        Self { evaluator }
    }

    /// The wrapped evaluator.
    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Consumes the problem, returning the evaluator.
    pub fn into_evaluator(self) -> E {
        self.evaluator
    }
}

impl<E: Evaluator> GaProblem for BinaryProblem<E> {
    fn chromosome_size(&self) -> usize {
        self.evaluator.domain_size()
    }

    fn create_chromosome<R: Rng>(&self, rng: &mut R) -> Chromosome {
        let genes = (0..self.chromosome_size())
            .map(|_| rng.random_range(0..2))
            .collect();
        Chromosome::new(genes)
    }

    fn decode(&self, chromosome: &mut Chromosome) -> Solution {
        self.evaluator.make_viable(chromosome);

        let mut solution = Solution::empty();
        solution.elements = chromosome
            .genes()
            .iter()
            .enumerate()
            .filter(|(_, &g)| g == 1)
            .map(|(locus, _)| locus)
            .collect();
        self.evaluator.evaluate(&mut solution);
        solution
    }

    fn mutate_gene(&self, chromosome: &mut Chromosome, locus: usize) {
        chromosome.flip(locus);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    /// Sum of selected indices; repair forbids selecting element 0.
    struct IndexSum {
        n: usize,
    }

    impl Evaluator for IndexSum {
        fn domain_size(&self) -> usize {
            self.n
        }

        fn evaluate(&self, solution: &mut Solution) -> f64 {
            solution.cost = solution.elements.iter().sum::<usize>() as f64;
            solution.cost
        }

        fn make_viable(&self, chromosome: &mut Chromosome) {
            if chromosome.gene(0) == 1 {
                chromosome.set_gene(0, 0);
            }
        }
    }

    #[test]
    fn test_random_chromosome_is_binary_and_sized() {
        let problem = BinaryProblem::new(IndexSum { n: 50 });
        let mut rng = create_rng(42);
        for _ in 0..20 {
            let c = problem.create_chromosome(&mut rng);
            assert_eq!(c.len(), 50);
            assert!(c.genes().iter().all(|&g| g <= 1));
            assert_eq!(c.cached_fitness(), None);
        }
    }

    #[test]
    fn test_decode_repairs_then_collects_ones() {
        let problem = BinaryProblem::new(IndexSum { n: 5 });
        let mut c = Chromosome::new(vec![1, 0, 1, 1, 0]);
        let solution = problem.decode(&mut c);
        assert_eq!(c.genes(), &[0, 0, 1, 1, 0]);
        assert_eq!(solution.elements, vec![2, 3]);
        assert_eq!(solution.cost, 5.0);
    }

    #[test]
    fn test_cached_fitness_matches_repaired_genes() {
        let problem = BinaryProblem::new(IndexSum { n: 3 });
        let mut c = Chromosome::new(vec![1, 1, 1]);
        assert_eq!(c.fitness(&problem), 3.0);
        assert_eq!(c.genes(), &[0, 1, 1]);
        assert_eq!(c.cached_fitness(), Some(3.0));
    }

    #[test]
    fn test_evaluator_accessors() {
        let problem = BinaryProblem::new(IndexSum { n: 7 });
        assert_eq!(problem.evaluator().n, 7);
        assert_eq!(problem.chromosome_size(), 7);
        assert_eq!(problem.into_evaluator().domain_size(), 7);
    }

    #[test]
    fn test_mutate_gene_flips_and_invalidates() {
        let problem = BinaryProblem::new(IndexSum { n: 3 });
        let mut c = Chromosome::new(vec![0, 1, 0]);
        c.fitness(&problem);
        problem.mutate_gene(&mut c, 2);
        assert_eq!(c.genes(), &[0, 1, 1]);
        assert_eq!(c.cached_fitness(), None);
    }
}
