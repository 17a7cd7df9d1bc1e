//! Command-line configuration for the `histogram`, `synth_ppm` and
//! `run_all_benchmarks` binaries.

use std::path::PathBuf;

use clap::Parser;

use crate::engine::{RunParams, MAX_THREADS};
use crate::error::{HistoError, Result};
use crate::strategy::{Reduction, StrategyKind, DEFAULT_MERGE_WORKERS, DEFAULT_PARALLEL_THRESHOLD};
use crate::synth::Distribution;

/// Compute per-channel histograms of a binary PPM image with worker threads.
#[derive(Parser, Debug, Clone)]
#[command(name = "histogram")]
pub struct HistogramArgs {
    /// Input P6 image
    pub input: PathBuf,

    /// Output histogram file
    pub output: PathBuf,

    /// Number of scan worker threads
    pub threads: usize,

    /// Merge strategy
    #[arg(long, value_enum, default_value_t = StrategyKind::Private)]
    pub strategy: StrategyKind,

    /// Reduction for the private strategy
    #[arg(long, value_enum, default_value_t = Reduction::Auto)]
    pub reduction: Reduction,

    /// Worker count at which `--reduction auto` goes parallel
    #[arg(long, default_value_t = DEFAULT_PARALLEL_THRESHOLD)]
    pub parallel_threshold: usize,

    /// Maximum number of parallel reduction threads
    #[arg(long, default_value_t = DEFAULT_MERGE_WORKERS)]
    pub merge_workers: usize,

    /// Pin worker threads to cores
    #[arg(long)]
    pub affinity: bool,

    /// Print a JSON run report instead of the plain timing line
    #[arg(long)]
    pub json: bool,

    #[arg(short, long)]
    pub verbose: bool,
}

impl HistogramArgs {
    pub fn to_params(&self) -> Result<RunParams> {
        let params = RunParams::new(self.threads, self.strategy)
            .with_reduction(self.reduction)
            .with_parallel_threshold(self.parallel_threshold)
            .with_merge_workers(self.merge_workers)
            .with_affinity(self.affinity);
        params.validate()?;
        Ok(params)
    }
}

/// Write a synthetic binary PPM image.
#[derive(Parser, Debug, Clone)]
#[command(name = "synth_ppm")]
pub struct SynthArgs {
    /// Output P6 image
    pub output: PathBuf,

    #[arg(long, default_value_t = 4096)]
    pub width: u32,

    #[arg(long, default_value_t = 4096)]
    pub height: u32,

    /// Maximum sample value (maxrgb)
    #[arg(long, default_value_t = 255)]
    pub depth: u32,

    #[arg(long, value_enum, default_value_t = Distribution::Uniform)]
    pub dist: Distribution,

    #[arg(long, default_value_t = 123_456_789)]
    pub seed: u64,

    #[arg(short, long)]
    pub verbose: bool,
}

/// Run every strategy over a sweep of thread counts and verify they agree.
#[derive(Parser, Debug, Clone)]
#[command(name = "run_all_benchmarks")]
pub struct SweepArgs {
    /// Input P6 image; a synthetic image is generated when absent
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Synthetic image width
    #[arg(long, default_value_t = 2048)]
    pub width: u32,

    /// Synthetic image height
    #[arg(long, default_value_t = 2048)]
    pub height: u32,

    #[arg(long, value_enum, default_value_t = Distribution::Uniform)]
    pub dist: Distribution,

    #[arg(long, default_value_t = 123_456_789)]
    pub seed: u64,

    /// Thread counts to sweep
    #[arg(long, value_delimiter = ',', default_values_t = [1, 2, 4, 8, 16])]
    pub threads: Vec<usize>,

    /// Strategies to run (default: all)
    #[arg(long, value_enum, value_delimiter = ',')]
    pub strategies: Vec<StrategyKind>,

    /// Timed repetitions per configuration; the minimum is reported
    #[arg(long, default_value_t = 3)]
    pub repeat: usize,

    #[arg(long)]
    pub affinity: bool,

    #[arg(short, long)]
    pub verbose: bool,
}

impl SweepArgs {
    pub fn validate(&self) -> Result<()> {
        if self.repeat == 0 {
            return Err(HistoError::config("--repeat must be at least 1"));
        }
        if self.threads.is_empty() {
            return Err(HistoError::config("--threads needs at least one value"));
        }
        if let Some(&t) = self.threads.iter().find(|&&t| t == 0 || t > MAX_THREADS) {
            return Err(HistoError::config(format!("thread count {t} must be in 1..={MAX_THREADS}")));
        }
        Ok(())
    }

    pub fn strategies(&self) -> Vec<StrategyKind> {
        if self.strategies.is_empty() {
            StrategyKind::ALL.to_vec()
        } else {
            self.strategies.clone()
        }
    }
}
