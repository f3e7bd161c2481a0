//! Selection strategies for the GA.
//!
//! Selection fills the mating pool: exactly `population_size` parents,
//! drawn with repetition from the current population. All strategies
//! assume **maximization** (higher fitness = better).
//!
//! # References
//!
//! - Goldberg & Deb (1991), "A Comparative Analysis of Selection Schemes
//!   Used in Genetic Algorithms"
//! - Baker (1987), "Reducing Bias and Inefficiency in the Selection Algorithm"

use super::chromosome::{Chromosome, Population};
use super::types::GaProblem;
use rand::seq::SliceRandom;
use rand::Rng;

/// Selection strategy for choosing parents.
///
/// # Examples
///
/// ```
/// use u_bitga::ga::Selection;
///
/// // Binary tournament (the default)
/// let sel = Selection::default();
/// assert_eq!(sel, Selection::Tournament);
///
/// // Stochastic universal sampling
/// let sel = Selection::StochasticUniversal;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Selection {
    /// Binary tournament: draw two members uniformly with replacement and
    /// keep the fitter one. On a tie the second draw wins.
    ///
    /// # Complexity
    /// O(1) per parent
    #[default]
    Tournament,

    /// Stochastic universal sampling over the weights
    /// `(fitness - min_fitness)²`.
    ///
    /// One random offset places `n` evenly spaced pointers over the
    /// cumulative weights, so every member is picked within one of its
    /// expected count. The picks are shuffled afterwards, otherwise the
    /// mating pool would follow population order.
    ///
    /// When every weight is zero (all members equally fit) the pool is
    /// drawn uniformly instead.
    ///
    /// # Complexity
    /// O(n) per generation
    StochasticUniversal,
}

impl Selection {
    /// Selects `population.len()` parents, evaluating fitness where needed.
    ///
    /// # Panics
    /// Panics if `population` is empty.
    pub fn select_parents<P: GaProblem, R: Rng>(
        &self,
        population: &mut Population,
        problem: &P,
        rng: &mut R,
    ) -> Vec<Chromosome> {
        assert!(
            !population.is_empty(),
            "cannot select from empty population"
        );

        let fitness: Vec<f64> = (0..population.len())
            .map(|i| population.fitness_of(i, problem))
            .collect();
        let members = population.members();

        self.select_indices(&fitness, rng)
            .into_iter()
            .map(|i| members[i].clone())
            .collect()
    }

    /// Selects `fitness.len()` indices given each member's fitness.
    ///
    /// # Panics
    /// Panics if `fitness` is empty.
    pub fn select_indices<R: Rng>(&self, fitness: &[f64], rng: &mut R) -> Vec<usize> {
        assert!(!fitness.is_empty(), "cannot select from empty population");

        match self {
            Selection::Tournament => (0..fitness.len())
                .map(|_| {
                    let first = rng.random_range(0..fitness.len());
                    let second = rng.random_range(0..fitness.len());
                    tournament_winner(fitness, first, second)
                })
                .collect(),
            Selection::StochasticUniversal => stochastic_universal(fitness, rng),
        }
    }
}

/// Winner of a binary tournament between `first` and `second`.
///
/// `first` wins only if strictly fitter; ties go to `second`.
pub fn tournament_winner(fitness: &[f64], first: usize, second: usize) -> usize {
    if fitness[first] > fitness[second] {
        first
    } else {
        second
    }
}

/// Stochastic universal sampling with squared-excess weights.
fn stochastic_universal<R: Rng>(fitness: &[f64], rng: &mut R) -> Vec<usize> {
    let n = fitness.len();
    let min_fitness = fitness.iter().copied().fold(f64::INFINITY, f64::min);

    let mut cumulative = Vec::with_capacity(n);
    let mut total = 0.0;
    let mut last_positive = 0;
    for (i, &f) in fitness.iter().enumerate() {
        let excess = f - min_fitness;
        let weight = excess * excess;
        if weight > 0.0 {
            last_positive = i;
        }
        total += weight;
        cumulative.push(total);
    }

    let step = total / n as f64;
    if !(step > 0.0 && step.is_finite()) {
        tracing::trace!(total, "sus weights vanish, drawing parents uniformly");
        return (0..n).map(|_| rng.random_range(0..n)).collect();
    }

    let offset = rng.random_range(0.0..step);
    let mut selected = Vec::with_capacity(n);
    let mut chosen = 0;
    for k in 0..n {
        let pointer = offset + k as f64 * step;
        // Stop at the last weighted member so rounding never lands on a zero weight.
        while chosen < last_positive && cumulative[chosen] <= pointer {
            chosen += 1;
        }
        selected.push(chosen);
    }

    selected.shuffle(rng);
    selected
}
