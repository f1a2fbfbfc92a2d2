use crate::{
    error::{ConfigError, TrainError},
    ngrams::NgramBounds,
    tree::{GramTree, GramTreeBuilder},
};
use ::std::{io, sync::Arc};
use compact_str::CompactString;
use parking_lot::Mutex;
use threadpool::ThreadPool;

/// Training configuration shared by every language worker.
#[derive(Clone, Copy, Debug)]
pub struct TrainerConfig {
    pub bounds: NgramBounds,
    pub truncation_threshold: f64,
    /// Worker pool size, bounded by available hardware parallelism.
    pub workers: usize,
}

impl TrainerConfig {
    #[inline]
    pub fn new(bounds: NgramBounds) -> Self {
        Self {
            bounds,
            truncation_threshold: 1.0,
            workers: num_cpus::get(),
        }
    }
}

/// One language to train: its code and a stream of raw corpus lines. The
/// trainer never sees file layout.
pub struct CorpusJob {
    pub code: CompactString,
    pub lines: Box<dyn Iterator<Item = io::Result<String>> + Send>,
}

impl CorpusJob {
    #[inline]
    pub fn new(
        code: impl Into<CompactString>,
        lines: impl Iterator<Item = io::Result<String>> + Send + 'static,
    ) -> Self {
        Self {
            code: code.into(),
            lines: Box::new(lines),
        }
    }

    /// Job over an in-memory corpus, one line per text line.
    pub fn from_text(code: impl Into<CompactString>, text: &str) -> Self {
        let lines: Vec<io::Result<String>> = text.lines().map(|line| Ok(line.to_owned())).collect();
        Self::new(code, lines.into_iter())
    }
}

/// Result of a training batch: finished trees and per-language failures,
/// both sorted by language code. A failed language never disappears
/// silently.
pub struct TrainingOutcome {
    pub trees: Vec<(CompactString, GramTree)>,
    pub failures: Vec<(CompactString, TrainError)>,
}

impl TrainingOutcome {
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Trains one gram tree per language over a fixed worker pool.
///
/// Every worker owns its builder end-to-end; the only shared structure is
/// the results collection. The batch runs to completion, there is no
/// cancellation.
pub struct ParallelTrainer {
    config: TrainerConfig,
}

impl ParallelTrainer {
    pub fn new(config: TrainerConfig) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&config.truncation_threshold) {
            return Err(ConfigError::InvalidTruncationThreshold(
                config.truncation_threshold,
            ));
        }
        Ok(Self { config })
    }

    pub fn train(&self, jobs: Vec<CorpusJob>) -> TrainingOutcome {
        let workers = self.config.workers.clamp(1, jobs.len().max(1));
        let pool = ThreadPool::new(workers);
        let results = Arc::new(Mutex::new(Vec::with_capacity(jobs.len())));
        tracing::info!(languages = jobs.len(), workers, "training started");

        for job in jobs {
            let results = Arc::clone(&results);
            let config = self.config;
            pool.execute(move || {
                let CorpusJob { code, lines } = job;
                tracing::info!(%code, "language training started");
                let result = train_one(config, lines);
                match &result {
                    Ok(tree) => tracing::info!(
                        %code,
                        grams = tree.gram_count(),
                        nodes = tree.node_count(),
                        "language training finished"
                    ),
                    Err(e) => tracing::error!(%code, error = %e, "language training failed"),
                }
                results.lock().push((code, result));
            });
        }
        pool.join();

        let results = ::core::mem::take(&mut *results.lock());
        let mut trees = Vec::new();
        let mut failures = Vec::new();
        for (code, result) in results {
            match result {
                Ok(tree) => trees.push((code, tree)),
                Err(e) => failures.push((code, e)),
            }
        }
        trees.sort_unstable_by(|first, second| first.0.cmp(&second.0));
        failures.sort_unstable_by(|first, second| first.0.cmp(&second.0));
        TrainingOutcome { trees, failures }
    }
}

fn train_one(
    config: TrainerConfig,
    lines: Box<dyn Iterator<Item = io::Result<String>> + Send>,
) -> Result<GramTree, TrainError> {
    let mut builder = GramTreeBuilder::new(config.bounds);
    builder.set_truncation_threshold(config.truncation_threshold)?;
    for line in lines {
        let line = line.map_err(TrainError::Corpus)?;
        builder.learn(&line)?;
    }
    Ok(builder.build())
}
