//! The four ways of combining per-worker histograms into the final one.
//!
//! * [`StrategyKind::Spinlock`] / [`StrategyKind::Ticket`]: every bucket is
//!   guarded by its own padded lock, workers add their local counts under it.
//! * [`StrategyKind::Lockfree`]: every bucket is a padded atomic counter.
//! * [`StrategyKind::Private`]: workers publish their local histogram into a
//!   private slot; the coordinator reduces the slots after the join, serially
//!   or with a second wave of threads over disjoint bucket slices.
//!
//! The result never depends on the strategy, only the contention profile does.

mod locked;
mod lockfree;
mod reduce;

use clap::ValueEnum;
use serde::Serialize;

use crate::histogram::{Histogram, LocalHistogram};

pub use locked::{LockedHistogram, SpinlockHistogram, TicketHistogram};
pub use lockfree::AtomicHistogram;
pub use reduce::{reduce_parallel, reduce_serial, DEFAULT_MERGE_WORKERS, DEFAULT_PARALLEL_THRESHOLD};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Per-bucket test-and-set spinlock
    Spinlock,
    /// Per-bucket FIFO ticket lock
    Ticket,
    /// Per-bucket atomic fetch-add
    Lockfree,
    /// Private histograms plus reduction
    Private,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 4] = [
        StrategyKind::Spinlock,
        StrategyKind::Ticket,
        StrategyKind::Lockfree,
        StrategyKind::Private,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StrategyKind::Spinlock => "spinlock",
            StrategyKind::Ticket => "ticket",
            StrategyKind::Lockfree => "lockfree",
            StrategyKind::Private => "private",
        }
    }
}

/// How private histograms are reduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Reduction {
    /// Serial below the parallel threshold, parallel at or above it
    #[default]
    Auto,
    Serial,
    Parallel,
}

impl Reduction {
    pub fn as_str(self) -> &'static str {
        match self {
            Reduction::Auto => "auto",
            Reduction::Serial => "serial",
            Reduction::Parallel => "parallel",
        }
    }

    /// Resolve `Auto` against the worker count. Never returns `Auto`.
    pub fn resolve(self, threads: usize, parallel_threshold: usize) -> Reduction {
        match self {
            Reduction::Auto if threads >= parallel_threshold => Reduction::Parallel,
            Reduction::Auto => Reduction::Serial,
            other => other,
        }
    }
}

/// Shared histogram that scan workers merge into concurrently.
pub trait SharedHistogram: Sync {
    fn with_bins(bins: usize) -> Self;

    /// Add the first `bins` buckets of `local`, skipping empty ones.
    fn merge(&self, local: &LocalHistogram);

    /// Consume after all writers are joined.
    fn into_histogram(self) -> Histogram;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_auto() {
        assert_eq!(Reduction::Auto.resolve(1, 4), Reduction::Serial);
        assert_eq!(Reduction::Auto.resolve(3, 4), Reduction::Serial);
        assert_eq!(Reduction::Auto.resolve(4, 4), Reduction::Parallel);
        assert_eq!(Reduction::Serial.resolve(64, 4), Reduction::Serial);
        assert_eq!(Reduction::Parallel.resolve(1, 4), Reduction::Parallel);
    }

    #[test]
    fn test_strategy_names_match_cli() {
        for kind in StrategyKind::ALL {
            let parsed = StrategyKind::from_str(kind.as_str(), false).unwrap();
            assert_eq!(parsed, kind);
        }
    }
}
