//! Multi-threaded RGB histograms with interchangeable merge strategies.
//!
//! Workers scan disjoint pixel ranges into private counters and combine them
//! through per-bucket spinlocks, per-bucket ticket locks, lock-free atomic
//! counters, or private histograms reduced after the join. Every strategy
//! produces the same histogram; they differ only in how they contend.

pub mod config;
pub mod engine;
pub mod error;
pub mod histogram;
pub mod io;
pub mod logging;
pub mod partition;
pub mod pixel;
pub mod scan;
pub mod strategy;
pub mod sync;
pub mod synth;
mod worker;

pub use engine::{run, RunOutcome, RunParams};
pub use error::{HistoError, Result};
pub use histogram::Histogram;
pub use pixel::{Channel, PixelBuffer};
pub use strategy::{Reduction, StrategyKind};
