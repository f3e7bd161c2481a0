use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use u_bitga::experiment::{run_batch, BatchReport, Job, Variant, STUDY_GENERATIONS};
use u_bitga::ga::{BinaryProblem, GaConfig};
use u_bitga::qbf::Qbf;

/// Runs the GA variants on QBF instances and reports mean and best costs.
#[derive(Parser, Debug)]
#[command(name = "qbf-ga", version)]
struct Args {
    /// QBF instance files.
    #[arg(required = true)]
    instances: Vec<PathBuf>,

    /// Variants to run, in report order. Defaults to all six.
    #[arg(long = "variant", value_enum)]
    variants: Vec<Variant>,

    /// Runs per variant and instance.
    #[arg(long, default_value_t = 10)]
    repetitions: usize,

    /// Base seed; repetition r runs with seed + r.
    #[arg(long)]
    seed: Option<u64>,

    /// Generation cap per run.
    #[arg(long)]
    generations: Option<usize>,

    /// Stop a run after this many seconds without improvement. 0 disables.
    #[arg(long)]
    stagnation_secs: Option<u64>,

    /// Stop a run after this many seconds. 0 disables.
    #[arg(long)]
    time_limit_secs: Option<u64>,

    /// JSON file with the base GaConfig the variants are applied to.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print a JSON report instead of CSV lines.
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct InstanceReport {
    instance: String,
    size: usize,
    variants: Vec<BatchReport>,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    let args = Args::parse();
    let base = base_config(&args)?;
    let variants = if args.variants.is_empty() {
        Variant::ALL.to_vec()
    } else {
        args.variants.clone()
    };

    if !args.json {
        let labels: Vec<&str> = variants.iter().map(|v| v.label()).collect();
        println!("instance,statistic,{}", labels.join(","));
    }

    let mut reports = Vec::with_capacity(args.instances.len());
    for path in &args.instances {
        let qbf = Qbf::from_path(path)
            .with_context(|| format!("loading instance {}", path.display()))?;
        let size = qbf.size();
        let instance = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let jobs: Vec<Job> = variants
            .iter()
            .map(|&v| Job::new(v.label(), v.apply(base.clone(), size)))
            .collect();
        let problem = BinaryProblem::new(qbf);
        let batch = run_batch(&problem, &jobs, args.repetitions)
            .with_context(|| format!("running instance {instance}"))?;

        if args.json {
            reports.push(InstanceReport {
                instance,
                size,
                variants: batch,
            });
        } else {
            println!("{instance},mean,{}", mean_line(&batch));
            println!("{instance},max,{}", max_line(&batch));
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }
    Ok(())
}

fn base_config(args: &Args) -> anyhow::Result<GaConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str::<GaConfig>(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => GaConfig::default().with_max_generations(STUDY_GENERATIONS),
    };

    if let Some(generations) = args.generations {
        config = config.with_max_generations(generations);
    }
    if let Some(secs) = args.stagnation_secs {
        config.stagnation_timeout_ms = secs_to_ms(secs, "--stagnation-secs")?;
    }
    if let Some(secs) = args.time_limit_secs {
        config.time_limit_ms = secs_to_ms(secs, "--time-limit-secs")?;
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    Ok(config)
}

/// Seconds to milliseconds, with 0 meaning disabled.
fn secs_to_ms(secs: u64, flag: &str) -> anyhow::Result<Option<u64>> {
    if secs == 0 {
        return Ok(None);
    }
    secs.checked_mul(1000)
        .map(Some)
        .with_context(|| format!("{flag} {secs} is too large"))
}

/// Mean costs with one decimal.
fn mean_line(batch: &[BatchReport]) -> String {
    batch
        .iter()
        .map(|r| format!("{:.1}", r.mean_cost))
        .collect::<Vec<_>>()
        .join(",")
}

/// Best costs, rounded to integers.
fn max_line(batch: &[BatchReport]) -> String {
    batch
        .iter()
        .map(|r| format!("{:.0}", r.max_cost))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(label: &str, mean_cost: f64, max_cost: f64) -> BatchReport {
        BatchReport {
            label: label.to_string(),
            runs: Vec::new(),
            mean_cost,
            max_cost,
            min_cost: 0.0,
        }
    }

    #[test]
    fn test_batches_run_concurrently() {
        assert!(cfg!(feature = "parallel"), "the cli feature must enable parallel");
    }

    #[test]
    fn test_secs_to_ms() {
        assert_eq!(secs_to_ms(0, "--time-limit-secs").unwrap(), None);
        assert_eq!(secs_to_ms(300, "--time-limit-secs").unwrap(), Some(300_000));

        let err = secs_to_ms(u64::MAX, "--stagnation-secs").unwrap_err();
        assert!(err.to_string().contains("--stagnation-secs"), "{err}");
    }

    #[test]
    fn test_csv_cost_formatting() {
        let batch = vec![report("standard", 1234.56, 1500.0), report("sus", -7.04, -3.0)];
        assert_eq!(mean_line(&batch), "1234.6,-7.0");
        assert_eq!(max_line(&batch), "1500,-3");
    }

    #[test]
    fn test_base_config_rejects_overflowing_limits() {
        let args = Args::parse_from([
            "qbf-ga",
            "qbf020",
            "--time-limit-secs",
            "18446744073709551615",
        ]);
        assert!(base_config(&args).is_err());

        let args = Args::parse_from(["qbf-ga", "qbf020", "--stagnation-secs", "0", "--seed", "5"]);
        let config = base_config(&args).unwrap();
        assert_eq!(config.stagnation_timeout_ms, None);
        assert_eq!(config.seed, Some(5));
    }
}
