use crate::histogram::{Histogram, LocalHistogram};
use crate::pixel::{Channel, CHANNELS};
use crate::sync::AtomicCounter;

use super::SharedHistogram;

/// Padded atomic counter per bucket per channel, updated with relaxed adds.
pub struct AtomicHistogram {
    channels: [Vec<AtomicCounter>; CHANNELS],
}

fn counters(bins: usize) -> Vec<AtomicCounter> {
    (0..bins).map(|_| AtomicCounter::new(0)).collect()
}

impl SharedHistogram for AtomicHistogram {
    fn with_bins(bins: usize) -> Self {
        Self {
            channels: [counters(bins), counters(bins), counters(bins)],
        }
    }

    fn merge(&self, local: &LocalHistogram) {
        for channel in Channel::ALL {
            let shared = &self.channels[channel.index()];
            for (cell, &count) in shared.iter().zip(local.counts(channel)) {
                if count > 0 {
                    cell.add(count);
                }
            }
        }
    }

    fn into_histogram(self) -> Histogram {
        Histogram::from_channels(
            self.channels
                .map(|cells| cells.into_iter().map(AtomicCounter::into_inner).collect()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concurrent_merge() {
        let hist = AtomicHistogram::with_bins(256);
        let mut local = LocalHistogram::new();
        let (r, g, b) = local.channels_mut();
        r[0] = 1;
        g[128] = 7;
        b[255] = 3;

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| hist.merge(&local));
            }
        });

        let out = hist.into_histogram();
        assert_eq!(out.counts(Channel::Red)[0], 8);
        assert_eq!(out.counts(Channel::Green)[128], 56);
        assert_eq!(out.counts(Channel::Blue)[255], 24);
        assert_eq!(out.total(Channel::Blue), 24);
    }
}
