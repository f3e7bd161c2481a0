//! GA configuration.
//!
//! [`GaConfig`] holds all parameters that control the evolutionary loop.
//! It is immutable for the duration of a run and validated before the
//! first generation.

use super::operators::Crosspoints;
use super::selection::Selection;
use std::time::Duration;

/// Reasons a [`GaConfig`] is rejected before a run starts.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("population_size must be positive, got 0")]
    EmptyPopulation,
    #[error("population_size must be even, got {0}")]
    OddPopulation(usize),
    #[error("max_generations must be at least 1")]
    NoGenerations,
    #[error("mutation_rate must be within [0, 1], got {0}")]
    MutationRateOutOfRange(f64),
    #[error("mutation_rate_bounds must satisfy 0 <= min <= max, got ({min}, {max})")]
    InvalidMutationBounds { min: f64, max: f64 },
    #[error("{0} must be positive or None")]
    ZeroDuration(&'static str),
    #[error("problem has no genes to evolve")]
    EmptyChromosome,
}

/// Configuration for the Genetic Algorithm.
///
/// # Defaults
///
/// ```
/// use u_bitga::ga::GaConfig;
///
/// let config = GaConfig::default();
/// assert_eq!(config.population_size, 100);
/// assert_eq!(config.stagnation_timeout_ms, Some(5 * 60 * 1000));
/// assert_eq!(config.time_limit_ms, Some(30 * 60 * 1000));
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_bitga::ga::{Crosspoints, GaConfig, Selection};
///
/// let config = GaConfig::default()
///     .with_population_size(400)
///     .with_selection(Selection::StochasticUniversal)
///     .with_crosspoints(Crosspoints::OrderedInterval)
///     .with_adaptive_mutation(true)
///     .with_mutation_rate(0.01);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GaConfig {
    /// Number of chromosomes in the population. Must be even and positive,
    /// since crossover consumes parents two at a time.
    pub population_size: usize,

    /// Maximum number of generations before termination.
    pub max_generations: usize,

    /// Per-locus mutation probability (0.0–1.0).
    ///
    /// A typical choice is `1 / chromosome_size`.
    pub mutation_rate: f64,

    /// Whether the mutation rate follows the best/mean feedback rule after
    /// every generation.
    pub adaptive_mutation: bool,

    /// Optional `(min, max)` clamp applied to the adapted mutation rate.
    ///
    /// `None` (the default) leaves the multiplicative drift unbounded, so the
    /// rate may exceed 1 or decay towards 0 over long runs.
    pub mutation_rate_bounds: Option<(f64, f64)>,

    /// How crossover points are drawn.
    pub crosspoints: Crosspoints,

    /// Parent selection strategy.
    pub selection: Selection,

    /// Stop when the best fitness has not improved for this many
    /// milliseconds. `None` disables the check.
    pub stagnation_timeout_ms: Option<u64>,

    /// Stop after this many milliseconds of wall-clock time, returning the
    /// best solution found so far. `None` disables the check.
    ///
    /// Both time checks happen at generation boundaries, so the actual
    /// runtime may exceed a limit by one generation's worth of work.
    pub time_limit_ms: Option<u64>,

    /// Whether to evaluate fitness in parallel using rayon.
    ///
    /// Only effective with the `parallel` feature. Results do not depend on it.
    pub parallel: bool,

    /// Random seed for reproducibility.
    ///
    /// `None` draws a fresh seed, reported back in the run result.
    pub seed: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_generations: 1000,
            mutation_rate: 0.01,
            adaptive_mutation: false,
            mutation_rate_bounds: None,
            crosspoints: Crosspoints::default(),
            selection: Selection::default(),
            stagnation_timeout_ms: Some(5 * 60 * 1000),
            time_limit_ms: Some(30 * 60 * 1000),
            parallel: false,
            seed: None,
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the maximum number of generations.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the mutation rate.
    ///
    /// Out-of-range rates are kept as given and rejected by
    /// [`validate`](Self::validate).
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Enables or disables the adaptive mutation-rate controller.
    pub fn with_adaptive_mutation(mut self, adaptive: bool) -> Self {
        self.adaptive_mutation = adaptive;
        self
    }

    /// Clamps the adapted mutation rate to `[min, max]`.
    pub fn with_mutation_rate_bounds(mut self, min: f64, max: f64) -> Self {
        self.mutation_rate_bounds = Some((min, max));
        self
    }

    /// Sets the crosspoint discipline.
    pub fn with_crosspoints(mut self, crosspoints: Crosspoints) -> Self {
        self.crosspoints = crosspoints;
        self
    }

    /// Sets the selection strategy.
    pub fn with_selection(mut self, sel: Selection) -> Self {
        self.selection = sel;
        self
    }

    /// Sets the stagnation timeout in milliseconds.
    pub fn with_stagnation_timeout_ms(mut self, ms: u64) -> Self {
        self.stagnation_timeout_ms = Some(ms);
        self
    }

    /// Sets the wall-clock time limit in milliseconds.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Disables both time-based stop conditions, leaving only the
    /// generation cap (and cancellation).
    pub fn without_time_limits(mut self) -> Self {
        self.stagnation_timeout_ms = None;
        self.time_limit_ms = None;
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Stagnation timeout as a [`Duration`].
    pub fn stagnation_timeout(&self) -> Option<Duration> {
        self.stagnation_timeout_ms.map(Duration::from_millis)
    }

    /// Time limit as a [`Duration`].
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_ms.map(Duration::from_millis)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if self.population_size % 2 != 0 {
            return Err(ConfigError::OddPopulation(self.population_size));
        }
        if self.max_generations == 0 {
            return Err(ConfigError::NoGenerations);
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(ConfigError::MutationRateOutOfRange(self.mutation_rate));
        }
        if let Some((min, max)) = self.mutation_rate_bounds {
            if !(min >= 0.0 && min <= max && max.is_finite()) {
                return Err(ConfigError::InvalidMutationBounds { min, max });
            }
        }
        if self.stagnation_timeout_ms == Some(0) {
            return Err(ConfigError::ZeroDuration("stagnation_timeout_ms"));
        }
        if self.time_limit_ms == Some(0) {
            return Err(ConfigError::ZeroDuration("time_limit_ms"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GaConfig::default();
        assert_eq!(config.population_size, 100);
        assert_eq!(config.max_generations, 1000);
        assert!((config.mutation_rate - 0.01).abs() < 1e-12);
        assert!(!config.adaptive_mutation);
        assert!(config.mutation_rate_bounds.is_none());
        assert_eq!(config.crosspoints, Crosspoints::DistinctPoints);
        assert_eq!(config.selection, Selection::Tournament);
        assert_eq!(config.stagnation_timeout(), Some(Duration::from_secs(300)));
        assert_eq!(config.time_limit(), Some(Duration::from_secs(1800)));
        assert!(!config.parallel);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_builder_pattern() {
        let config = GaConfig::default()
            .with_population_size(400)
            .with_max_generations(50)
            .with_mutation_rate(0.05)
            .with_adaptive_mutation(true)
            .with_mutation_rate_bounds(0.001, 0.5)
            .with_crosspoints(Crosspoints::OrderedInterval)
            .with_selection(Selection::StochasticUniversal)
            .with_stagnation_timeout_ms(1000)
            .with_time_limit_ms(2000)
            .with_parallel(true)
            .with_seed(42);

        assert_eq!(config.population_size, 400);
        assert_eq!(config.max_generations, 50);
        assert!((config.mutation_rate - 0.05).abs() < 1e-12);
        assert!(config.adaptive_mutation);
        assert_eq!(config.mutation_rate_bounds, Some((0.001, 0.5)));
        assert_eq!(config.crosspoints, Crosspoints::OrderedInterval);
        assert_eq!(config.selection, Selection::StochasticUniversal);
        assert_eq!(config.stagnation_timeout_ms, Some(1000));
        assert_eq!(config.time_limit_ms, Some(2000));
        assert!(config.parallel);
        assert_eq!(config.seed, Some(42));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_ok() {
        assert!(GaConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_odd_population() {
        let config = GaConfig::default().with_population_size(7);
        assert_eq!(config.validate(), Err(ConfigError::OddPopulation(7)));
    }

    #[test]
    fn test_validate_empty_population() {
        let config = GaConfig::default().with_population_size(0);
        assert_eq!(config.validate(), Err(ConfigError::EmptyPopulation));
    }

    #[test]
    fn test_validate_zero_generations() {
        let config = GaConfig::default().with_max_generations(0);
        assert_eq!(config.validate(), Err(ConfigError::NoGenerations));
    }

    #[test]
    fn test_validate_mutation_rate_range() {
        for rate in [-0.1, 1.5, f64::NAN] {
            let config = GaConfig::default().with_mutation_rate(rate);
            assert!(
                matches!(config.validate(), Err(ConfigError::MutationRateOutOfRange(_))),
                "rate {rate} should be rejected"
            );
        }
        for rate in [0.0, 1.0] {
            assert!(GaConfig::default().with_mutation_rate(rate).validate().is_ok());
        }
    }

    #[test]
    fn test_validate_mutation_bounds() {
        let config = GaConfig::default().with_mutation_rate_bounds(0.5, 0.1);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidMutationBounds { .. })
        ));
    }

    #[test]
    fn test_validate_zero_durations() {
        let config = GaConfig::default().with_time_limit_ms(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroDuration("time_limit_ms")));

        let config = GaConfig::default().with_stagnation_timeout_ms(0);
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroDuration("stagnation_timeout_ms"))
        );
    }

    #[test]
    fn test_without_time_limits() {
        let config = GaConfig::default().without_time_limits();
        assert!(config.stagnation_timeout().is_none());
        assert!(config.time_limit().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ConfigError::OddPopulation(5).to_string(),
            "population_size must be even, got 5"
        );
        assert_eq!(
            ConfigError::ZeroDuration("time_limit_ms").to_string(),
            "time_limit_ms must be positive or None"
        );
    }
}
