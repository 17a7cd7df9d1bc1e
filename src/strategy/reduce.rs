use std::thread;

use crate::error::Result;
use crate::histogram::{Histogram, LocalHistogram};
use crate::partition::{partition, split_mut, WorkRange};
use crate::pixel::Channel;
use crate::sync::CachePadded;
use crate::worker;

/// Worker count at which `Reduction::Auto` switches to the parallel reduction.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 4;

/// Upper bound on reduction threads, independent of the scan worker count.
pub const DEFAULT_MERGE_WORKERS: usize = 4;

/// Sum every private histogram bucket-wise on the calling thread.
pub fn reduce_serial(slots: &[CachePadded<LocalHistogram>], bins: usize) -> Histogram {
    let mut hist = Histogram::zeroed(bins);
    for slot in slots {
        for channel in Channel::ALL {
            let global = hist.counts_mut(channel);
            for (acc, &count) in global.iter_mut().zip(slot.counts(channel)) {
                *acc += count;
            }
        }
    }
    hist
}

/// Sum private histograms with up to `merge_workers` threads.
///
/// Each thread owns a disjoint contiguous slice of bucket indices and writes
/// it directly into the result, so no synchronization is needed beyond the
/// final join.
pub fn reduce_parallel(
    slots: &[CachePadded<LocalHistogram>],
    bins: usize,
    merge_workers: usize,
) -> Result<Histogram> {
    let workers = merge_workers.min(slots.len()).clamp(1, bins.max(1));
    let slices = partition(bins, workers)?;

    let mut hist = Histogram::zeroed(bins);
    let [r, g, b] = hist.channels_mut();
    let parts = split_mut(r, &slices)
        .into_iter()
        .zip(split_mut(g, &slices))
        .zip(split_mut(b, &slices))
        .zip(&slices);

    thread::scope(|s| {
        let jobs = parts.map(|(((r, g), b), &slice)| move || reduce_slice(slots, slice, [r, g, b]));
        worker::run_all(s, "reduce", jobs)
    })?;

    Ok(hist)
}

/// `out[c][j - slice.start] = sum over slots of slot[c][j]` for `j` in `slice`.
fn reduce_slice(slots: &[CachePadded<LocalHistogram>], slice: WorkRange, out: [&mut [u64]; 3]) {
    tracing::debug!(start = slice.start, end = slice.end, "reduce");
    for (channel, dst) in Channel::ALL.into_iter().zip(out) {
        for (j, acc) in slice.as_range().zip(dst.iter_mut()) {
            *acc = slots.iter().map(|slot| slot.counts(channel)[j]).sum();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::histogram::MAX_BINS;

    fn slots(t: usize) -> Vec<CachePadded<LocalHistogram>> {
        (0..t)
            .map(|w| {
                let mut local = LocalHistogram::new();
                let (r, g, b) = local.channels_mut();
                for j in 0..MAX_BINS {
                    r[j] = (w + j) as u64;
                    g[j] = 1;
                    b[j] = (w * j % 5) as u64;
                }
                CachePadded::new(local)
            })
            .collect()
    }

    #[test]
    fn test_parallel_matches_serial() {
        for t in [1, 2, 3, 4, 8, 17] {
            let slots = slots(t);
            let serial = reduce_serial(&slots, MAX_BINS);
            for workers in [1, 2, 4, 7] {
                let parallel = reduce_parallel(&slots, MAX_BINS, workers).unwrap();
                assert_eq!(parallel, serial, "t={t} workers={workers}");
            }
            assert_eq!(serial.counts(Channel::Green)[100], t as u64);
        }
    }

    #[test]
    fn test_reduce_truncates_to_bins() {
        let slots = slots(3);
        let serial = reduce_serial(&slots, 16);
        let parallel = reduce_parallel(&slots, 16, 4).unwrap();
        assert_eq!(serial.bins(), 16);
        assert_eq!(serial, parallel);
        assert_eq!(serial.total(Channel::Green), 48);
    }

    #[test]
    fn test_reduce_empty_slots() {
        let hist = reduce_parallel(&[], 256, 4).unwrap();
        assert_eq!(hist, Histogram::zeroed(256));
    }
}
