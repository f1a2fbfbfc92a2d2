use ::std::path::PathBuf;
use clap::Parser;
use langtree::{NgramBounds, ParallelTrainer, TrainerConfig};
use langtree_train::{corpus_jobs, write_models};

#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Input directory, one subdirectory of UTF-8 text files per language code
    #[arg(short = 'i', required = true)]
    inp: PathBuf,

    /// Output directory for the per-language model files
    #[arg(short = 'o', required = true)]
    out: PathBuf,

    /// Minimal ngram size
    #[arg(long, default_value_t = 1)]
    min: usize,

    /// Maximal ngram size
    #[arg(long, default_value_t = 3)]
    max: usize,

    /// Truncation threshold in 0.0..=1.0, 1.0 keeps every node
    #[arg(long, default_value_t = 1.0)]
    threshold: f64,

    /// Worker pool size, defaults to the number of cpus
    #[arg(long)]
    workers: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let mut config = TrainerConfig::new(NgramBounds::new(args.min, args.max)?);
    config.truncation_threshold = args.threshold;
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    let trainer = ParallelTrainer::new(config)?;

    let jobs = corpus_jobs(&args.inp)?;
    anyhow::ensure!(
        !jobs.is_empty(),
        "no language directories found in {}",
        args.inp.display()
    );

    let outcome = trainer.train(jobs);
    write_models(&outcome.trees, &args.out)?;

    for (code, error) in &outcome.failures {
        tracing::error!(%code, %error, "language failed to train");
    }
    anyhow::ensure!(
        outcome.is_complete(),
        "{} of {} languages failed to train",
        outcome.failures.len(),
        outcome.failures.len() + outcome.trees.len()
    );
    Ok(())
}
