//! Parameter studies: the standard GA variants and repeated-run batches.
//!
//! A batch is a list of [`Job`]s (a label plus a [`GaConfig`]) run
//! `repetitions` times each. Repetition `r` of a job uses seed
//! `base + r`, where `base` is the job's configured seed (or a random one),
//! so every run owns an independent, replayable random stream. Runs share
//! nothing while executing; statistics are aggregated from the returned
//! results afterwards.

use crate::ga::{
    ConfigError, Crosspoints, GaConfig, GaProblem, GaResult, GaRunner, Selection, StopReason,
};
use crate::random::resolve_seed;
use tracing::instrument;

/// Generation cap of the standard variants. High enough that the
/// stagnation timeout or the time limit ends a run first.
pub const STUDY_GENERATIONS: usize = 1_000_000_000;

/// Errors of a batch run. Nothing runs if any job is rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExperimentError {
    #[error("repetitions must be at least 1")]
    NoRepetitions,
    #[error("job {label:?} rejected: {source}")]
    InvalidJob {
        label: String,
        #[source]
        source: ConfigError,
    },
}

/// The six GA configurations compared in the QBF study.
///
/// All share the [`Standard`](Variant::Standard) settings (population 100,
/// mutation rate `1/n`, distinct crosspoints, tournament selection) except
/// for the one parameter each variant names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Variant {
    Standard,
    /// Population 400.
    LargePopulation,
    /// Mutation rate `2/n`.
    DoubleMutation,
    /// Crosspoints drawn as an ordered interval.
    OrderedCrosspoints,
    /// Adaptive mutation rate.
    AdaptiveMutation,
    /// Stochastic universal sampling instead of tournaments.
    StochasticUniversal,
}

impl Variant {
    pub const ALL: [Variant; 6] = [
        Variant::Standard,
        Variant::LargePopulation,
        Variant::DoubleMutation,
        Variant::OrderedCrosspoints,
        Variant::AdaptiveMutation,
        Variant::StochasticUniversal,
    ];

    /// Short name used in reports.
    pub fn label(self) -> &'static str {
        match self {
            Variant::Standard => "standard",
            Variant::LargePopulation => "pop400",
            Variant::DoubleMutation => "mut2n",
            Variant::OrderedCrosspoints => "ordered-crosspoints",
            Variant::AdaptiveMutation => "adaptive",
            Variant::StochasticUniversal => "sus",
        }
    }

    /// The variant's configuration for a problem of `domain_size` genes,
    /// with [`STUDY_GENERATIONS`] and the default time bounds.
    ///
    /// ```
    /// use u_bitga::experiment::Variant;
    /// use u_bitga::ga::Selection;
    ///
    /// let config = Variant::StochasticUniversal.config(40);
    /// assert_eq!(config.population_size, 100);
    /// assert_eq!(config.mutation_rate, 1.0 / 40.0);
    /// assert_eq!(config.selection, Selection::StochasticUniversal);
    /// ```
    pub fn config(self, domain_size: usize) -> GaConfig {
        self.apply(
            GaConfig::default().with_max_generations(STUDY_GENERATIONS),
            domain_size,
        )
    }

    /// Overlays the variant's settings on `base`. Fields the variant does
    /// not mention (generation cap, time bounds, seed, parallelism) keep
    /// their values from `base`.
    pub fn apply(self, base: GaConfig, domain_size: usize) -> GaConfig {
        let per_locus = 1.0 / domain_size.max(1) as f64;
        let standard = base
            .with_population_size(100)
            .with_mutation_rate(per_locus)
            .with_adaptive_mutation(false)
            .with_crosspoints(Crosspoints::DistinctPoints)
            .with_selection(Selection::Tournament);

        match self {
            Variant::Standard => standard,
            Variant::LargePopulation => standard.with_population_size(400),
            Variant::DoubleMutation => standard.with_mutation_rate((2.0 * per_locus).min(1.0)),
            Variant::OrderedCrosspoints => {
                standard.with_crosspoints(Crosspoints::OrderedInterval)
            }
            Variant::AdaptiveMutation => standard.with_adaptive_mutation(true),
            Variant::StochasticUniversal => {
                standard.with_selection(Selection::StochasticUniversal)
            }
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A labelled configuration to run repeatedly.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Job {
    pub label: String,
    pub config: GaConfig,
}

impl Job {
    pub fn new(label: impl Into<String>, config: GaConfig) -> Self {
        Self {
            label: label.into(),
            config,
        }
    }

    /// A job running `variant` on a problem of `domain_size` genes.
    pub fn from_variant(variant: Variant, domain_size: usize) -> Self {
        Self::new(variant.label(), variant.config(domain_size))
    }
}

/// The outcome of one run, stripped of the genotype.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunSummary {
    pub repetition: usize,
    pub seed: u64,
    /// Objective value of the best solution.
    pub cost: f64,
    pub generations: usize,
    pub stop_reason: StopReason,
    pub final_mutation_rate: f64,
    pub elapsed_ms: u64,
}

impl RunSummary {
    fn from_result(repetition: usize, result: &GaResult) -> Self {
        Self {
            repetition,
            seed: result.seed,
            cost: result.best_solution.cost,
            generations: result.generations,
            stop_reason: result.stop_reason,
            final_mutation_rate: result.final_mutation_rate,
            elapsed_ms: result.elapsed.as_millis() as u64,
        }
    }
}

/// All repetitions of one job and their cost statistics.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BatchReport {
    pub label: String,
    /// Ordered by repetition.
    pub runs: Vec<RunSummary>,
    pub mean_cost: f64,
    pub max_cost: f64,
    pub min_cost: f64,
}

impl BatchReport {
    fn from_runs(label: String, runs: Vec<RunSummary>) -> Self {
        let costs = runs.iter().map(|r| r.cost);
        let mean_cost = costs.clone().sum::<f64>() / runs.len() as f64;
        let max_cost = costs.clone().fold(f64::NEG_INFINITY, f64::max);
        let min_cost = costs.fold(f64::INFINITY, f64::min);
        Self {
            label,
            runs,
            mean_cost,
            max_cost,
            min_cost,
        }
    }
}

/// Runs `config` `repetitions` times with consecutive seeds.
///
/// # Errors
/// Returns [`ConfigError`] if the configuration is invalid; nothing runs.
pub fn run_repetitions<P: GaProblem>(
    problem: &P,
    config: &GaConfig,
    repetitions: usize,
) -> Result<Vec<GaResult>, ConfigError> {
    config.validate()?;
    let base = resolve_seed(config.seed);
    (0..repetitions)
        .map(|r| GaRunner::run(problem, &seeded(config, base, r)))
        .collect()
}

/// Runs every job `repetitions` times and aggregates per job.
///
/// With the `parallel` feature, all `(job, repetition)` runs execute
/// concurrently on the rayon pool. Reports keep the order of `jobs`.
///
/// # Errors
/// [`ExperimentError::NoRepetitions`] for `repetitions == 0`, or
/// [`ExperimentError::InvalidJob`] for the first job whose configuration
/// is rejected.
#[instrument(level = "debug", skip_all, fields(jobs = jobs.len(), repetitions = repetitions))]
pub fn run_batch<P: GaProblem>(
    problem: &P,
    jobs: &[Job],
    repetitions: usize,
) -> Result<Vec<BatchReport>, ExperimentError> {
    if repetitions == 0 {
        return Err(ExperimentError::NoRepetitions);
    }
    if problem.chromosome_size() == 0 {
        return Err(ExperimentError::InvalidJob {
            label: jobs.first().map(|j| j.label.clone()).unwrap_or_default(),
            source: ConfigError::EmptyChromosome,
        });
    }
    for job in jobs {
        job.config
            .validate()
            .map_err(|source| ExperimentError::InvalidJob {
                label: job.label.clone(),
                source,
            })?;
    }

    let planned: Vec<(usize, usize, GaConfig)> = jobs
        .iter()
        .enumerate()
        .flat_map(|(j, job)| {
            let base = resolve_seed(job.config.seed);
            (0..repetitions).map(move |r| (j, r, seeded(&job.config, base, r)))
        })
        .collect();

    let run_one = |(j, r, config): &(usize, usize, GaConfig)| {
        let label = &jobs[*j].label;
        GaRunner::run(problem, config)
            .map(|result| {
                tracing::info!(
                    job = %label,
                    repetition = r,
                    seed = result.seed,
                    cost = result.best_solution.cost,
                    stop_reason = %result.stop_reason,
                    "run finished"
                );
                RunSummary::from_result(*r, &result)
            })
            .map_err(|source| ExperimentError::InvalidJob {
                label: label.clone(),
                source,
            })
    };

    #[cfg(feature = "parallel")]
    let summaries: Vec<RunSummary> = {
        use rayon::prelude::*;
        planned
            .par_iter()
            .map(run_one)
            .collect::<Result<_, ExperimentError>>()?
    };
    #[cfg(not(feature = "parallel"))]
    let summaries: Vec<RunSummary> = planned
        .iter()
        .map(run_one)
        .collect::<Result<_, ExperimentError>>()?;

    let mut per_job: Vec<Vec<RunSummary>> = vec![Vec::with_capacity(repetitions); jobs.len()];
    for ((j, _, _), summary) in planned.iter().zip(summaries) {
        per_job[*j].push(summary);
    }

    Ok(jobs
        .iter()
        .zip(per_job)
        .map(|(job, runs)| BatchReport::from_runs(job.label.clone(), runs))
        .collect())
}

fn seeded(config: &GaConfig, base: u64, repetition: usize) -> GaConfig {
    config
        .clone()
        .with_seed(base.wrapping_add(repetition as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::BinaryProblem;
    use crate::qbf::Qbf;

    fn problem(n: usize) -> BinaryProblem<Qbf> {
        let upper: Vec<f64> = (0..n * (n + 1) / 2)
            .map(|k| ((k * 13 + 5) % 11) as f64 - 5.0)
            .collect();
        BinaryProblem::new(Qbf::from_upper_triangle(n, &upper).unwrap())
    }

    fn quick(variant: Variant, n: usize) -> GaConfig {
        variant
            .config(n)
            .with_max_generations(20)
            .without_time_limits()
            .with_seed(100)
    }

    #[test]
    fn test_variant_settings() {
        let n = 40;
        let standard = Variant::Standard.config(n);
        assert_eq!(standard.population_size, 100);
        assert_eq!(standard.mutation_rate, 1.0 / 40.0);
        assert_eq!(standard.crosspoints, Crosspoints::DistinctPoints);
        assert_eq!(standard.selection, Selection::Tournament);
        assert!(!standard.adaptive_mutation);
        assert_eq!(standard.max_generations, STUDY_GENERATIONS);
        assert_eq!(standard.stagnation_timeout_ms, Some(300_000));
        assert_eq!(standard.time_limit_ms, Some(1_800_000));

        assert_eq!(Variant::LargePopulation.config(n).population_size, 400);
        assert_eq!(Variant::DoubleMutation.config(n).mutation_rate, 2.0 / 40.0);
        assert_eq!(
            Variant::OrderedCrosspoints.config(n).crosspoints,
            Crosspoints::OrderedInterval
        );
        assert!(Variant::AdaptiveMutation.config(n).adaptive_mutation);
        assert_eq!(
            Variant::StochasticUniversal.config(n).selection,
            Selection::StochasticUniversal
        );

        for variant in Variant::ALL {
            assert!(variant.config(n).validate().is_ok(), "{variant}");
        }
    }

    #[test]
    fn test_variant_apply_keeps_unrelated_fields() {
        let base = GaConfig::default()
            .with_max_generations(7)
            .with_seed(9)
            .with_population_size(10)
            .with_time_limit_ms(1234);
        let config = Variant::AdaptiveMutation.apply(base, 20);
        assert_eq!(config.max_generations, 7);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.time_limit_ms, Some(1234));
        assert_eq!(config.population_size, 100);
    }

    #[test]
    fn test_variant_labels_distinct() {
        let mut labels: Vec<_> = Variant::ALL.iter().map(|v| v.label()).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), Variant::ALL.len());
    }

    #[test]
    fn test_run_repetitions_uses_consecutive_seeds() {
        let p = problem(12);
        let results = run_repetitions(&p, &quick(Variant::Standard, 12), 3).unwrap();
        let seeds: Vec<u64> = results.iter().map(|r| r.seed).collect();
        assert_eq!(seeds, vec![100, 101, 102]);

        let single = GaRunner::run(&p, &quick(Variant::Standard, 12).with_seed(101)).unwrap();
        assert_eq!(single.fitness_history, results[1].fitness_history);
        assert_eq!(single.best.genes(), results[1].best.genes());
    }

    #[test]
    fn test_run_repetitions_rejects_invalid_config() {
        let p = problem(8);
        let config = quick(Variant::Standard, 8).with_population_size(3);
        assert_eq!(
            run_repetitions(&p, &config, 2).unwrap_err(),
            ConfigError::OddPopulation(3)
        );
    }

    #[test]
    fn test_run_batch_aggregates_in_job_order() {
        let n = 12;
        let p = problem(n);
        let variants = [
            Variant::Standard,
            Variant::StochasticUniversal,
            Variant::AdaptiveMutation,
        ];
        let jobs: Vec<Job> = variants
            .into_iter()
            .map(|v| Job::new(v.label(), quick(v, n)))
            .collect();

        let reports = run_batch(&p, &jobs, 4).unwrap();
        assert_eq!(reports.len(), 3);
        for (report, job) in reports.iter().zip(&jobs) {
            assert_eq!(report.label, job.label);
            assert_eq!(report.runs.len(), 4);
            let reps: Vec<usize> = report.runs.iter().map(|r| r.repetition).collect();
            assert_eq!(reps, vec![0, 1, 2, 3]);

            let costs: Vec<f64> = report.runs.iter().map(|r| r.cost).collect();
            let mean = costs.iter().sum::<f64>() / 4.0;
            assert!((report.mean_cost - mean).abs() < 1e-9);
            assert!(costs.iter().all(|&c| c <= report.max_cost && c >= report.min_cost));
            assert!(report.runs.iter().all(|r| r.stop_reason == StopReason::GenerationLimit));
            assert!(report.runs.iter().all(|r| r.generations == 20));
        }
    }

    #[test]
    fn test_run_batch_matches_individual_runs() {
        let n = 10;
        let p = problem(n);
        let config = quick(Variant::DoubleMutation, n).with_seed(55);
        let reports = run_batch(&p, &[Job::new("x", config.clone())], 2).unwrap();

        for (r, summary) in reports[0].runs.iter().enumerate() {
            let single = GaRunner::run(&p, &config.clone().with_seed(55 + r as u64)).unwrap();
            assert_eq!(summary.seed, 55 + r as u64);
            assert_eq!(summary.cost, single.best_solution.cost);
        }
    }

    #[test]
    fn test_run_batch_errors() {
        let p = problem(6);
        let good = Job::new("good", quick(Variant::Standard, 6));
        assert_eq!(
            run_batch(&p, &[good.clone()], 0).unwrap_err(),
            ExperimentError::NoRepetitions
        );

        let bad = Job::new("bad", quick(Variant::Standard, 6).with_max_generations(0));
        match run_batch(&p, &[good, bad], 1).unwrap_err() {
            ExperimentError::InvalidJob { label, source } => {
                assert_eq!(label, "bad");
                assert_eq!(source, ConfigError::NoGenerations);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_run_batch_empty_jobs() {
        let p = problem(4);
        assert!(run_batch(&p, &[], 3).unwrap().is_empty());
    }
}
