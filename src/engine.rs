//! Run coordinator: partition, scan, merge, reduce.
//!
//! A run walks `Init -> Partition -> ScanMerge -> Done` when workers merge
//! into shared state, and `Init -> Partition -> Scan -> Reduce -> Done` for
//! private histograms. Every phase spawns its own OS threads inside a
//! [`std::thread::scope`] and joins them all before the next phase starts;
//! the join is the barrier.
//! Shared merge state (lock arrays, atomic arrays, private slots) is created
//! by the coordinator for one run and dropped with it.

use std::thread;
use std::time::Instant;

use core_affinity::CoreId;
use serde::Serialize;

use crate::error::{HistoError, Result};
use crate::histogram::{Histogram, LocalHistogram};
use crate::partition::partition;
use crate::pixel::PixelBuffer;
use crate::scan::ScanTask;
use crate::strategy::{
    reduce_parallel, reduce_serial, AtomicHistogram, Reduction, SharedHistogram, SpinlockHistogram,
    StrategyKind, TicketHistogram, DEFAULT_MERGE_WORKERS, DEFAULT_PARALLEL_THRESHOLD,
};
use crate::sync::CachePadded;
use crate::worker;

/// Hard cap on scan workers; larger requests are rejected, not clamped.
pub const MAX_THREADS: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    Partition,
    /// Private scan only; merging waits for `Reduce`.
    Scan,
    /// Each worker scans, then merges into shared state.
    ScanMerge,
    Reduce,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunParams {
    pub threads: usize,
    pub strategy: StrategyKind,
    pub reduction: Reduction,
    /// `Reduction::Auto` goes parallel at this many scan workers.
    pub parallel_threshold: usize,
    /// Upper bound on parallel reduction threads.
    pub merge_workers: usize,
    /// Pin scan worker `i` to core `i mod cores`.
    pub affinity: bool,
}

impl RunParams {
    pub fn new(threads: usize, strategy: StrategyKind) -> Self {
        Self {
            threads,
            strategy,
            reduction: Reduction::Auto,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            merge_workers: DEFAULT_MERGE_WORKERS,
            affinity: false,
        }
    }

    pub fn with_reduction(mut self, reduction: Reduction) -> Self {
        self.reduction = reduction;
        self
    }

    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    pub fn with_merge_workers(mut self, workers: usize) -> Self {
        self.merge_workers = workers;
        self
    }

    pub fn with_affinity(mut self, affinity: bool) -> Self {
        self.affinity = affinity;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            return Err(HistoError::InvalidThreadCount {
                threads: self.threads,
                reason: "at least one worker is required",
            });
        }
        if self.threads > MAX_THREADS {
            return Err(HistoError::InvalidThreadCount {
                threads: self.threads,
                reason: "exceeds the supported maximum of 1024",
            });
        }
        if self.merge_workers == 0 {
            return Err(HistoError::InvalidThreadCount {
                threads: 0,
                reason: "at least one merge worker is required",
            });
        }
        Ok(())
    }
}

/// Wall-clock phase durations in nanoseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PhaseTimings {
    /// Spawn to join of scan workers, including in-worker merging.
    pub scan_merge_ns: u64,
    /// Private-histogram reduction; zero for in-place strategies.
    pub reduce_ns: u64,
    /// Partition through final histogram.
    pub total_ns: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub histogram: Histogram,
    pub timings: PhaseTimings,
    /// Resolved reduction for the private strategy, `None` otherwise.
    pub reduction_used: Option<Reduction>,
}

/// Serializable summary of one run for `--json` output.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport<'a> {
    pub params: &'a RunParams,
    pub pixels: usize,
    pub bins: usize,
    pub reduction_used: Option<Reduction>,
    pub timings: PhaseTimings,
    pub conserved: bool,
}

impl RunOutcome {
    pub fn report<'a>(&self, params: &'a RunParams, buffer: &PixelBuffer) -> RunReport<'a> {
        RunReport {
            params,
            pixels: buffer.len(),
            bins: buffer.bins(),
            reduction_used: self.reduction_used,
            timings: self.timings,
            conserved: self.histogram.is_conserved(buffer.len()),
        }
    }
}

fn elapsed_ns(since: Instant) -> u64 {
    u64::try_from(since.elapsed().as_nanos()).unwrap_or(u64::MAX)
}

fn enter(phase: Phase) {
    tracing::debug!(?phase, "enter phase");
}

/// Compute the histogram of `buffer` with the strategy in `params`.
pub fn run(buffer: &PixelBuffer, params: &RunParams) -> Result<RunOutcome> {
    enter(Phase::Init);
    params.validate()?;
    let cores = if params.affinity { core_ids() } else { Vec::new() };

    let start = Instant::now();
    enter(Phase::Partition);
    let ranges = partition(buffer.len(), params.threads)?;
    let tasks: Vec<ScanTask<'_>> = ranges
        .iter()
        .enumerate()
        .map(|(worker, &range)| ScanTask {
            worker,
            buffer,
            range,
            core: (!cores.is_empty()).then(|| cores[worker % cores.len()]),
        })
        .collect();

    let bins = buffer.bins();
    let mut timings = PhaseTimings::default();
    let mut reduction_used = None;

    let histogram = match params.strategy {
        StrategyKind::Spinlock => scan_shared::<SpinlockHistogram>(&tasks, bins, &mut timings)?,
        StrategyKind::Ticket => scan_shared::<TicketHistogram>(&tasks, bins, &mut timings)?,
        StrategyKind::Lockfree => scan_shared::<AtomicHistogram>(&tasks, bins, &mut timings)?,
        StrategyKind::Private => {
            let scan_start = Instant::now();
            let slots = scan_private(&tasks)?;
            timings.scan_merge_ns = elapsed_ns(scan_start);

            let reduction = params.reduction.resolve(params.threads, params.parallel_threshold);
            reduction_used = Some(reduction);
            enter(Phase::Reduce);
            let reduce_start = Instant::now();
            let hist = match reduction {
                Reduction::Parallel => reduce_parallel(&slots, bins, params.merge_workers)?,
                _ => reduce_serial(&slots, bins),
            };
            timings.reduce_ns = elapsed_ns(reduce_start);
            hist
        }
    };
    timings.total_ns = elapsed_ns(start);
    enter(Phase::Done);

    tracing::debug!(
        strategy = params.strategy.as_str(),
        threads = params.threads,
        pixels = buffer.len(),
        total_ns = timings.total_ns,
        "histogram complete"
    );

    Ok(RunOutcome {
        histogram,
        timings,
        reduction_used,
    })
}

/// Scan and merge in-place into a shared histogram `H`.
fn scan_shared<H: SharedHistogram>(tasks: &[ScanTask<'_>], bins: usize, timings: &mut PhaseTimings) -> Result<Histogram> {
    let shared = H::with_bins(bins);
    let scan_start = Instant::now();
    enter(Phase::ScanMerge);
    thread::scope(|s| {
        let shared = &shared;
        let jobs = tasks.iter().map(|task| {
            move || {
                let local = task.run();
                shared.merge(&local);
            }
        });
        worker::run_all(s, "scan", jobs)
    })?;
    timings.scan_merge_ns = elapsed_ns(scan_start);
    Ok(shared.into_histogram())
}

/// Scan into one padded private slot per worker. No merge work in workers.
fn scan_private(tasks: &[ScanTask<'_>]) -> Result<Vec<CachePadded<LocalHistogram>>> {
    let mut slots: Vec<CachePadded<LocalHistogram>> = (0..tasks.len()).map(|_| CachePadded::default()).collect();
    enter(Phase::Scan);
    thread::scope(|s| {
        let jobs = tasks.iter().zip(slots.iter_mut()).map(|(task, slot)| move || **slot = task.run());
        worker::run_all(s, "scan", jobs)
    })?;
    Ok(slots)
}

fn core_ids() -> Vec<CoreId> {
    let cores = core_affinity::get_core_ids().unwrap_or_default();
    if cores.is_empty() {
        tracing::warn!("core affinity requested but no cores reported; running unpinned");
    }
    cores
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::Channel;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    fn scenario() -> PixelBuffer {
        PixelBuffer::new(2, 2, 255, vec![10, 10, 20, 30], vec![0, 1, 2, 3], vec![7; 4]).unwrap()
    }

    #[test]
    fn test_scenario_all_strategies() {
        let buf = scenario();
        for strategy in StrategyKind::ALL {
            let outcome = run(&buf, &RunParams::new(2, strategy)).unwrap();
            let r = outcome.histogram.counts(Channel::Red);
            assert_eq!((r[10], r[20], r[30]), (2, 1, 1), "{strategy:?}");
            assert_eq!(outcome.histogram.total(Channel::Red), 4);
            assert_eq!(outcome.histogram, Histogram::reference(&buf));
        }
    }

    #[test]
    fn test_validate_rejects_bad_thread_counts() {
        let buf = scenario();
        assert!(matches!(
            run(&buf, &RunParams::new(0, StrategyKind::Lockfree)),
            Err(HistoError::InvalidThreadCount { threads: 0, .. })
        ));
        assert!(run(&buf, &RunParams::new(MAX_THREADS + 1, StrategyKind::Private)).is_err());
        let params = RunParams::new(2, StrategyKind::Private).with_merge_workers(0);
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_reduction_reported() {
        let buf = scenario();
        let serial = run(&buf, &RunParams::new(2, StrategyKind::Private)).unwrap();
        assert_eq!(serial.reduction_used, Some(Reduction::Serial));
        let parallel = run(&buf, &RunParams::new(8, StrategyKind::Private)).unwrap();
        assert_eq!(parallel.reduction_used, Some(Reduction::Parallel));
        let locked = run(&buf, &RunParams::new(8, StrategyKind::Ticket)).unwrap();
        assert_eq!(locked.reduction_used, None);
        assert_eq!(locked.timings.reduce_ns, 0);
    }

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Capture {
        type Writer = Capture;

        fn make_writer(&'a self) -> Capture {
            self.clone()
        }
    }

    fn phase_log(params: &RunParams) -> String {
        let capture = Capture::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(capture.clone())
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || run(&scenario(), params)).unwrap();
        let bytes = capture.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    fn phases(log: &str) -> Vec<&str> {
        log.lines()
            .filter(|line| line.contains("enter phase"))
            .filter_map(|line| line.split("phase=").nth(1))
            .map(|rest| rest.split_whitespace().next().unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_shared_strategies_scan_and_merge_in_one_phase() {
        for strategy in [StrategyKind::Spinlock, StrategyKind::Ticket, StrategyKind::Lockfree] {
            let log = phase_log(&RunParams::new(2, strategy));
            assert_eq!(phases(&log), ["Init", "Partition", "ScanMerge", "Done"], "{strategy:?}");
        }
    }

    #[test]
    fn test_private_strategy_reduces_after_scan() {
        let log = phase_log(&RunParams::new(2, StrategyKind::Private));
        assert_eq!(phases(&log), ["Init", "Partition", "Scan", "Reduce", "Done"]);
    }

    #[test]
    fn test_affinity_does_not_change_result() {
        let buf = scenario();
        let params = RunParams::new(3, StrategyKind::Spinlock).with_affinity(true);
        let outcome = run(&buf, &params).unwrap();
        assert_eq!(outcome.histogram, Histogram::reference(&buf));
    }

    #[test]
    fn test_report_serializes() {
        let buf = scenario();
        let params = RunParams::new(4, StrategyKind::Private).with_reduction(Reduction::Serial);
        let outcome = run(&buf, &params).unwrap();
        let json = serde_json::to_value(outcome.report(&params, &buf)).unwrap();
        assert_eq!(json["params"]["strategy"], "private");
        assert_eq!(json["reduction_used"], "serial");
        assert_eq!(json["pixels"], 4);
        assert_eq!(json["conserved"], true);
    }
}
