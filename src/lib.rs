//! Reproducible binary genetic algorithm engine.
//!
//! - **GA**: generational loop over `{0, 1}` genotypes with tournament or
//!   stochastic universal selection, two-point crossover, per-locus
//!   mutation with an optional adaptive rate, and single-slot elitism.
//!   Runs end on a generation cap, a stagnation timeout or a time limit.
//! - **QBF**: quadratic binary function instances as a ready-made objective.
//! - **Experiment**: the standard parameter variants and repeated-run batches
//!   used to compare them.
//!
//! Every run draws from one seeded RNG, so a seed and a configuration fully
//! determine the result when the time-based stop conditions do not fire.

pub mod experiment;
pub mod ga;
pub mod qbf;
pub mod random;
