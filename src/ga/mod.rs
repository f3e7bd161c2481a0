//! Genetic Algorithm framework.
//!
//! A generational GA over fixed-length genotypes, built on trait-based
//! abstractions. Users define their problem by implementing [`GaProblem`]
//! directly, or implement [`Evaluator`] and wrap it in [`BinaryProblem`] for
//! a `{0, 1}` encoding with bit-flip mutation.
//!
//! # Core Traits
//!
//! - [`Evaluator`]: Objective function and feasibility repair
//! - [`GaProblem`]: Chromosome creation, decoding, per-locus mutation
//!
//! # Key Types
//!
//! - [`Chromosome`] / [`Population`]: Genotypes with a cached fitness
//! - [`GaConfig`]: Algorithm parameters (population, selection, crossover, limits)
//! - [`GaEngine`]: One run's state, advanced a generation at a time
//! - [`GaRunner`]: Executes the evolutionary loop under a [`Termination`] policy
//! - [`GaResult`]: Final optimization result with statistics
//!
//! # Submodules
//!
//! - [`operators`]: Two-point crossover, mutation, adaptive rate, elitist replacement
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*

mod binary;
mod chromosome;
mod config;
pub mod operators;
mod runner;
mod selection;
mod termination;
mod types;

pub use binary::BinaryProblem;
pub use chromosome::{Chromosome, Population, PopulationStats};
pub use config::{ConfigError, GaConfig};
pub use operators::{Crosspoints, MutationControl};
pub use runner::{GaEngine, GaResult, GaRunner, GenerationStats};
pub use selection::{tournament_winner, Selection};
pub use termination::{Clock, ManualClock, StopReason, SystemClock, Termination};
pub use types::{Evaluator, GaProblem, Gene, Solution};
