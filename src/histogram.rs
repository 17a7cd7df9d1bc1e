//! Per-worker and final per-channel histograms.

use serde::Serialize;

use crate::pixel::{Channel, PixelBuffer, CHANNELS};

/// Bucket count of a full 8-bit histogram.
pub const MAX_BINS: usize = 256;

/// Dense per-worker counters, one 256-entry array per channel.
///
/// Always sized for 8-bit samples so the scan loop can index directly with
/// the sample byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalHistogram {
    counts: [[u64; MAX_BINS]; CHANNELS],
}

impl Default for LocalHistogram {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalHistogram {
    pub const fn new() -> Self {
        Self {
            counts: [[0; MAX_BINS]; CHANNELS],
        }
    }

    pub fn counts(&self, channel: Channel) -> &[u64; MAX_BINS] {
        &self.counts[channel.index()]
    }

    /// Mutable access to all three channels at once, in R, G, B order.
    pub fn channels_mut(&mut self) -> (&mut [u64; MAX_BINS], &mut [u64; MAX_BINS], &mut [u64; MAX_BINS]) {
        let [r, g, b] = &mut self.counts;
        (r, g, b)
    }

    pub fn total(&self, channel: Channel) -> u64 {
        self.counts(channel).iter().sum()
    }

    pub fn clear(&mut self) {
        self.counts = [[0; MAX_BINS]; CHANNELS];
    }
}

/// Final histogram of `bins` buckets per channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Histogram {
    bins: usize,
    channels: [Vec<u64>; CHANNELS],
}

impl Histogram {
    pub fn zeroed(bins: usize) -> Self {
        Self {
            bins,
            channels: [vec![0; bins], vec![0; bins], vec![0; bins]],
        }
    }

    pub(crate) fn from_channels(channels: [Vec<u64>; CHANNELS]) -> Self {
        let bins = channels[0].len();
        debug_assert!(channels.iter().all(|c| c.len() == bins));
        Self { bins, channels }
    }

    /// Exact single-threaded count, used as the ground truth for verification.
    pub fn reference(buffer: &PixelBuffer) -> Self {
        let mut hist = Self::zeroed(buffer.bins());
        for channel in Channel::ALL {
            let counts = hist.counts_mut(channel);
            for &v in buffer.channel(channel) {
                counts[v as usize] += 1;
            }
        }
        hist
    }

    pub fn bins(&self) -> usize {
        self.bins
    }

    pub fn counts(&self, channel: Channel) -> &[u64] {
        &self.channels[channel.index()]
    }

    pub fn counts_mut(&mut self, channel: Channel) -> &mut [u64] {
        &mut self.channels[channel.index()]
    }

    pub(crate) fn channels_mut(&mut self) -> &mut [Vec<u64>; CHANNELS] {
        &mut self.channels
    }

    pub fn total(&self, channel: Channel) -> u64 {
        self.counts(channel).iter().sum()
    }

    /// Every channel accounts for exactly `n` pixels.
    pub fn is_conserved(&self, n: usize) -> bool {
        Channel::ALL.iter().all(|&c| self.total(c) == n as u64)
    }
}
