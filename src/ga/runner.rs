//! GA evolutionary loop execution.
//!
//! [`GaEngine`] holds the state of one run and advances it one generation
//! at a time: selection → crossover → mutation → replacement → best update
//! → adaptive rate update. [`GaRunner`] wraps it in the outer loop and the
//! termination policy.

use super::chromosome::{Chromosome, Population};
use super::config::{ConfigError, GaConfig};
use super::operators::{self, MutationControl};
use super::termination::{Clock, StopReason, SystemClock, Termination};
use super::types::{GaProblem, Solution};
use crate::random::{create_rng, resolve_seed, GaRng};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

/// Result of a GA optimization run.
///
/// Contains the best solution found, along with statistics about the
/// evolutionary process.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GaResult {
    /// The chromosome that produced [`best_solution`](Self::best_solution).
    pub best: Chromosome,

    /// The best decoded solution found during the entire run.
    pub best_solution: Solution,

    /// Fitness of [`best`](Self::best).
    pub best_fitness: f64,

    /// Number of generations executed (generation 0 not counted).
    pub generations: usize,

    /// Which stop condition ended the run.
    pub stop_reason: StopReason,

    /// Best fitness so far after each generation, starting with generation 0.
    pub fitness_history: Vec<f64>,

    /// Mutation rate at the end of the run (differs from the configured rate
    /// only with adaptive mutation).
    pub final_mutation_rate: f64,

    /// Seed of the run's random stream. Rerunning with this seed replays it.
    pub seed: u64,

    /// Time spent in the generational loop.
    pub elapsed: Duration,
}

impl GaResult {
    /// Whether the run was terminated due to stagnation.
    pub fn stagnated(&self) -> bool {
        self.stop_reason == StopReason::Stagnation
    }

    /// Whether the run was cancelled externally.
    pub fn cancelled(&self) -> bool {
        self.stop_reason == StopReason::Cancelled
    }
}

/// Summary of one generation, returned by [`GaEngine::step`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationStats {
    /// 1-based generation number.
    pub generation: usize,

    /// Best fitness in the new population.
    pub best_fitness: f64,

    /// Mean fitness of the new population.
    pub mean_fitness: f64,

    /// Whether the best-so-far fitness strictly improved.
    pub improved: bool,

    /// Whether elitist replacement swapped in the previous best.
    pub replaced: bool,

    /// Mutation rate after the adaptive update.
    pub mutation_rate: f64,
}

/// State of a single GA run.
///
/// Owns its population, mutation rate and random stream; the problem is
/// only borrowed. Two engines built from the same problem, configuration
/// and seed step through identical states.
pub struct GaEngine<'p, P: GaProblem> {
    problem: &'p P,
    config: GaConfig,
    seed: u64,
    rng: GaRng,
    population: Population,
    elite: Chromosome,
    best: Chromosome,
    best_solution: Solution,
    best_fitness: f64,
    mutation: MutationControl,
    generation: usize,
    fitness_history: Vec<f64>,
}

impl<'p, P: GaProblem> GaEngine<'p, P> {
    /// Validates the configuration and builds generation 0.
    pub fn new(problem: &'p P, config: &GaConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let chromosome_size = problem.chromosome_size();
        if chromosome_size == 0 {
            return Err(ConfigError::EmptyChromosome);
        }

        let seed = resolve_seed(config.seed);
        let mut rng = create_rng(seed);

        // 1. Initialize population
        let mut population: Population = (0..config.population_size)
            .map(|_| problem.create_chromosome(&mut rng))
            .collect::<Vec<_>>()
            .into();
        debug_assert!(population.iter().all(|c| c.len() == chromosome_size));

        // 2. Evaluate and track best
        population.evaluate(problem, config.parallel);
        let stats = population.best(problem);
        let elite = population.members()[stats.best_index].clone();
        let best_solution = problem.decode(&mut elite.clone());

        let mut mutation = MutationControl::new(config.mutation_rate, config.adaptive_mutation);
        if let Some((min, max)) = config.mutation_rate_bounds {
            mutation = mutation.with_bounds(min, max);
        }

        Ok(Self {
            problem,
            config: config.clone(),
            seed,
            rng,
            population,
            best: elite.clone(),
            elite,
            best_solution,
            best_fitness: stats.best_fitness,
            mutation,
            generation: 0,
            fitness_history: vec![stats.best_fitness],
        })
    }

    /// Runs one generation.
    pub fn step(&mut self) -> GenerationStats {
        let problem = self.problem;

        // Selection
        let parents = self
            .config
            .selection
            .select_parents(&mut self.population, problem, &mut self.rng);

        // Crossover
        let mut offspring = operators::crossover(&parents, self.config.crosspoints, &mut self.rng);

        // Mutation
        operators::mutate(&mut offspring, problem, self.mutation.rate(), &mut self.rng);
        offspring.evaluate(problem, self.config.parallel);

        // Elitist replacement
        let replaced = operators::replace_worst(&mut offspring, &mut self.elite, problem);
        self.population = offspring;
        self.generation += 1;

        // Update best
        let stats = self.population.best(problem);
        self.elite = self.population.members()[stats.best_index].clone();
        let improved = stats.best_fitness > self.best_fitness;
        if improved {
            self.best = self.elite.clone();
            self.best_solution = problem.decode(&mut self.elite.clone());
            self.best_fitness = stats.best_fitness;
            tracing::debug!(
                generation = self.generation,
                mutation_rate = self.mutation.rate(),
                cost = self.best_solution.cost,
                size = self.best_solution.len(),
                "new best solution"
            );
        }

        // Adaptive mutation
        self.mutation.adapt(stats.best_fitness, stats.mean_fitness);

        self.fitness_history.push(self.best_fitness);
        problem.on_generation(self.generation, self.best_fitness);

        tracing::trace!(
            generation = self.generation,
            best = stats.best_fitness,
            mean = stats.mean_fitness,
            mutation_rate = self.mutation.rate(),
            "generation complete"
        );

        GenerationStats {
            generation: self.generation,
            best_fitness: stats.best_fitness,
            mean_fitness: stats.mean_fitness,
            improved,
            replaced,
            mutation_rate: self.mutation.rate(),
        }
    }

    /// Current population.
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Chromosome of the best solution found so far.
    pub fn best(&self) -> &Chromosome {
        &self.best
    }

    /// Best decoded solution found so far.
    pub fn best_solution(&self) -> &Solution {
        &self.best_solution
    }

    /// Fitness of the best solution found so far.
    pub fn best_fitness(&self) -> f64 {
        self.best_fitness
    }

    /// Current mutation rate.
    pub fn mutation_rate(&self) -> f64 {
        self.mutation.rate()
    }

    /// Number of generations executed so far.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Seed of this run's random stream.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Finishes the run.
    pub fn into_result(self, stop_reason: StopReason, elapsed: Duration) -> GaResult {
        GaResult {
            best: self.best,
            best_solution: self.best_solution,
            best_fitness: self.best_fitness,
            generations: self.generation,
            stop_reason,
            fitness_history: self.fitness_history,
            final_mutation_rate: self.mutation.rate(),
            seed: self.seed,
            elapsed,
        }
    }
}

/// Executes the GA evolutionary loop.
///
/// # Usage
///
/// ```ignore
/// let problem = BinaryProblem::new(Qbf::from_path("instances/qbf040")?);
/// let config = GaConfig::default().with_seed(42);
/// let result = GaRunner::run(&problem, &config)?;
/// println!("Best cost: {}", result.best_solution.cost);
/// ```
pub struct GaRunner;

impl GaRunner {
    /// Runs the GA optimization.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the configuration is invalid; nothing runs.
    pub fn run<P: GaProblem>(problem: &P, config: &GaConfig) -> Result<GaResult, ConfigError> {
        Self::run_with_clock(problem, config, &SystemClock, None)
    }

    /// Runs the GA with an optional cancellation token.
    ///
    /// If `cancel` is `Some` and the flag is set to `true`, the GA will
    /// stop at the next generation boundary and return the best
    /// solution found so far.
    pub fn run_with_cancel<P: GaProblem>(
        problem: &P,
        config: &GaConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<GaResult, ConfigError> {
        Self::run_with_clock(problem, config, &SystemClock, cancel)
    }

    /// Runs the GA reading time from `clock`.
    #[instrument(
        level = "debug",
        skip_all,
        fields(
            population_size = config.population_size,
            selection = ?config.selection,
            crosspoints = ?config.crosspoints,
            adaptive = config.adaptive_mutation,
        )
    )]
    pub fn run_with_clock<P: GaProblem, C: Clock>(
        problem: &P,
        config: &GaConfig,
        clock: &C,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<GaResult, ConfigError> {
        let mut engine = GaEngine::new(problem, config)?;
        let termination = Termination::from_config(config).with_cancel(cancel);

        tracing::info!(
            seed = engine.seed(),
            chromosome_size = problem.chromosome_size(),
            initial_best = engine.best_fitness(),
            "ga run started"
        );

        let started = clock.now();
        let mut last_improvement = started;
        let stop_reason = loop {
            let next = engine.generation() + 1;
            if let Some(reason) = termination.check(next, started, last_improvement, clock.now()) {
                break reason;
            }
            if engine.step().improved {
                last_improvement = clock.now();
            }
        };
        let elapsed = clock.now().saturating_duration_since(started);

        tracing::info!(
            generations = engine.generation(),
            best_fitness = engine.best_fitness(),
            %stop_reason,
            elapsed_ms = elapsed.as_millis() as u64,
            "ga run finished"
        );

        Ok(engine.into_result(stop_reason, elapsed))
    }
}

// ============================================================================
// Tests
// ============================================================================
