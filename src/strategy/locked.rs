use crate::histogram::{Histogram, LocalHistogram};
use crate::pixel::{Channel, CHANNELS};
use crate::sync::{CachePadded, Guarded, RawLock, SpinLock, TicketLock};

use super::SharedHistogram;

type Bucket<L> = CachePadded<Guarded<L, u64>>;

/// One lock-guarded, cache-line-sized cell per bucket per channel.
pub struct LockedHistogram<L: RawLock> {
    channels: [Vec<Bucket<L>>; CHANNELS],
}

pub type SpinlockHistogram = LockedHistogram<SpinLock>;
pub type TicketHistogram = LockedHistogram<TicketLock>;

fn buckets<L: RawLock>(bins: usize) -> Vec<Bucket<L>> {
    (0..bins).map(|_| CachePadded::new(Guarded::new(0))).collect()
}

impl<L: RawLock> SharedHistogram for LockedHistogram<L> {
    fn with_bins(bins: usize) -> Self {
        Self {
            channels: [buckets(bins), buckets(bins), buckets(bins)],
        }
    }

    fn merge(&self, local: &LocalHistogram) {
        for channel in Channel::ALL {
            let shared = &self.channels[channel.index()];
            for (bucket, &count) in shared.iter().zip(local.counts(channel)) {
                if count > 0 {
                    *bucket.lock() += count;
                }
            }
        }
    }

    fn into_histogram(self) -> Histogram {
        Histogram::from_channels(
            self.channels
                .map(|buckets| buckets.into_iter().map(|b| b.into_inner().into_inner()).collect()),
        )
    }
}
