//! Generational operators: two-point crossover, per-locus mutation with an
//! adaptive rate controller, and elitist replacement.
//!
//! # Crossover
//!
//! - [`Crosspoints`]: how the exchange interval `[p1, p2)` is drawn
//! - [`two_point_crossover`]: swap the interval between two parents
//! - [`crossover`]: pairwise crossover over a whole mating pool
//!
//! # Mutation
//!
//! - [`mutate`]: flip each locus with probability `rate`
//! - [`MutationControl`]: best/mean feedback on the rate
//!
//! # Replacement
//!
//! - [`replace_worst`]: the previous best replaces the worst offspring
//!
//! # References
//!
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*
//! - Eiben, Hinterding & Michalewicz (1999), "Parameter Control in Evolutionary Algorithms"

use super::chromosome::{Chromosome, Population};
use super::types::{GaProblem, Gene};
use rand::Rng;

// ============================================================================
// Crossover
// ============================================================================

/// How the two crossover points are drawn for a chromosome of length `n`.
///
/// Both disciplines return `p1 <= p2` within `[0, n]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Crosspoints {
    /// `p1 ~ U[0, n]`, then `p2 ~ U[p1, n]`.
    ///
    /// Short intervals near the end of the chromosome are more likely than
    /// under [`DistinctPoints`](Self::DistinctPoints), and `p1 == p2`
    /// (no exchange) is possible.
    OrderedInterval,

    /// Two distinct points drawn independently from `U[0, n]` (redrawn on
    /// collision), then sorted.
    #[default]
    DistinctPoints,
}

impl Crosspoints {
    /// Draws `(p1, p2)` with `p1 <= p2 <= n`.
    ///
    /// For `n == 0` there is a single point and `(0, 0)` is returned.
    pub fn draw<R: Rng>(&self, n: usize, rng: &mut R) -> (usize, usize) {
        match self {
            Crosspoints::OrderedInterval => {
                let p1 = rng.random_range(0..=n);
                let p2 = rng.random_range(p1..=n);
                (p1, p2)
            }
            Crosspoints::DistinctPoints => {
                if n == 0 {
                    return (0, 0);
                }
                loop {
                    let a = rng.random_range(0..=n);
                    let b = rng.random_range(0..=n);
                    if a != b {
                        return (a.min(b), a.max(b));
                    }
                }
            }
        }
    }
}

/// Two-point crossover with fixed crosspoints.
///
/// Loci in `[p1, p2)` are exchanged between the children; all other loci
/// keep their own parent's gene.
///
/// ```text
///                        p1            p2
///    Parent 1: X1 ... Xi | Xi+1 ... Xj | Xj+1 ... Xn
///    Parent 2: Y1 ... Yi | Yi+1 ... Yj | Yj+1 ... Yn
///
///     Child 1: X1 ... Xi | Yi+1 ... Yj | Xj+1 ... Xn
///     Child 2: Y1 ... Yi | Xi+1 ... Xj | Yj+1 ... Yn
/// ```
///
/// # Panics
/// Panics if the parents differ in length or `p1 > p2` or `p2 > len`.
pub fn two_point_crossover(
    parent1: &[Gene],
    parent2: &[Gene],
    p1: usize,
    p2: usize,
) -> (Vec<Gene>, Vec<Gene>) {
    let n = parent1.len();
    assert_eq!(n, parent2.len(), "parents must have equal length");
    assert!(p1 <= p2 && p2 <= n, "invalid crosspoints ({p1}, {p2}) for length {n}");

    let mut child1 = Vec::with_capacity(n);
    let mut child2 = Vec::with_capacity(n);
    child1.extend_from_slice(&parent1[..p1]);
    child1.extend_from_slice(&parent2[p1..p2]);
    child1.extend_from_slice(&parent1[p2..]);
    child2.extend_from_slice(&parent2[..p1]);
    child2.extend_from_slice(&parent1[p1..p2]);
    child2.extend_from_slice(&parent2[p2..]);
    (child1, child2)
}

/// Pairwise two-point crossover over a mating pool.
///
/// Parents `(0, 1)`, `(2, 3)`, … each produce two children, so the
/// offspring population has the same size as the pool.
///
/// # Panics
/// Panics if `parents` is empty or has odd length.
pub fn crossover<R: Rng>(
    parents: &[Chromosome],
    crosspoints: Crosspoints,
    rng: &mut R,
) -> Population {
    assert!(
        !parents.is_empty() && parents.len() % 2 == 0,
        "crossover needs a non-empty, even mating pool, got {}",
        parents.len()
    );

    let mut offspring = Vec::with_capacity(parents.len());
    for pair in parents.chunks_exact(2) {
        let (p1, p2) = crosspoints.draw(pair[0].len(), rng);
        let (c1, c2) = two_point_crossover(pair[0].genes(), pair[1].genes(), p1, p2);
        offspring.push(Chromosome::new(c1));
        offspring.push(Chromosome::new(c2));
    }
    Population::new(offspring)
}

// ============================================================================
// Mutation
// ============================================================================

/// Mutates every locus of every offspring independently with probability
/// `rate`, through [`GaProblem::mutate_gene`].
///
/// A rate above 1 mutates every locus; a rate of 0 or below mutates none.
pub fn mutate<P: GaProblem, R: Rng>(
    offspring: &mut Population,
    problem: &P,
    rate: f64,
    rng: &mut R,
) {
    for c in offspring.members_mut() {
        for locus in 0..c.len() {
            if rng.random::<f64>() < rate {
                problem.mutate_gene(c, locus);
            }
        }
    }
}

/// Best/mean ratio below which the population counts as insufficiently
/// converged and the mutation rate grows.
pub const ADAPTIVE_RATIO_THRESHOLD: f64 = 1.02;

/// Multiplier applied when the ratio is below the threshold.
pub const ADAPTIVE_INCREASE: f64 = 1.1;

/// Multiplier applied otherwise.
pub const ADAPTIVE_DECREASE: f64 = 0.9;

/// The run's mutation rate and its optional feedback controller.
///
/// ```
/// use u_bitga::ga::MutationControl;
///
/// let mut m = MutationControl::new(0.1, true);
/// m.adapt(10.1, 10.0); // ratio 1.01 < 1.02
/// assert!((m.rate() - 0.11).abs() < 1e-12);
/// m.adapt(11.0, 10.0); // ratio 1.1
/// assert!((m.rate() - 0.099).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MutationControl {
    rate: f64,
    adaptive: bool,
    bounds: Option<(f64, f64)>,
}

impl MutationControl {
    /// A controller starting at `rate`. When `adaptive` is false,
    /// [`adapt`](Self::adapt) leaves the rate untouched.
    pub fn new(rate: f64, adaptive: bool) -> Self {
        Self {
            rate,
            adaptive,
            bounds: None,
        }
    }

    /// Clamps every adapted rate to `[min, max]`.
    pub fn with_bounds(mut self, min: f64, max: f64) -> Self {
        self.bounds = Some((min, max));
        self
    }

    /// Current per-locus mutation probability.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Whether the feedback rule is active.
    pub fn is_adaptive(&self) -> bool {
        self.adaptive
    }

    /// Applies the feedback rule for one generation.
    ///
    /// `best / mean < 1.02` multiplies the rate by 1.1, anything else
    /// (including a NaN ratio from a zero mean) by 0.9. Without bounds the
    /// rate is not clamped.
    pub fn adapt(&mut self, best: f64, mean: f64) {
        if !self.adaptive {
            return;
        }
        if best / mean < ADAPTIVE_RATIO_THRESHOLD {
            self.rate *= ADAPTIVE_INCREASE;
        } else {
            self.rate *= ADAPTIVE_DECREASE;
        }
        if let Some((min, max)) = self.bounds {
            self.rate = self.rate.clamp(min, max);
        }
    }
}

// ============================================================================
// Replacement
// ============================================================================

/// Elitist replacement.
///
/// If the worst offspring is strictly less fit than `previous_best`, it is
/// removed and a copy of `previous_best` is appended. Returns whether the
/// replacement happened. The population size never changes.
///
/// # Panics
/// Panics if `offspring` is empty.
pub fn replace_worst<P: GaProblem>(
    offspring: &mut Population,
    previous_best: &mut Chromosome,
    problem: &P,
) -> bool {
    let (worst_index, worst_fitness) = offspring.worst(problem);
    if worst_fitness < previous_best.fitness(problem) {
        offspring.remove(worst_index);
        offspring.push(previous_best.clone());
        true
    } else {
        false
    }
}

// ============================================================================
// Tests
// ============================================================================
