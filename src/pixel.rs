//! Read-only RGB pixel buffer shared by every worker of a run.

use serde::Serialize;

use crate::error::{HistoError, Result};

/// Largest supported depth bound (8-bit samples).
pub const MAX_DEPTH: u32 = 255;

/// Number of color channels. Fixed; there is no alpha or grayscale mode.
pub const CHANNELS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Red = 0,
    Green = 1,
    Blue = 2,
}

impl Channel {
    /// R, G, B order, which is also the output order.
    pub const ALL: [Channel; CHANNELS] = [Channel::Red, Channel::Green, Channel::Blue];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Three planar channels of `xsize * ysize` samples, each `<= depth_bound`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    xsize: u32,
    ysize: u32,
    depth_bound: u32,
    channels: [Vec<u8>; CHANNELS],
}

impl PixelBuffer {
    pub fn new(
        xsize: u32,
        ysize: u32,
        depth_bound: u32,
        r: Vec<u8>,
        g: Vec<u8>,
        b: Vec<u8>,
    ) -> Result<Self> {
        if depth_bound > MAX_DEPTH {
            return Err(HistoError::UnsupportedDepth { depth: depth_bound });
        }
        let n = (xsize as usize)
            .checked_mul(ysize as usize)
            .ok_or_else(|| HistoError::invalid_format(format!("{xsize}x{ysize} image is too large")))?;

        let channels = [r, g, b];
        for (channel, data) in Channel::ALL.iter().zip(&channels) {
            if data.len() != n {
                return Err(HistoError::invalid_format(format!(
                    "{:?} channel has {} samples, expected {}",
                    channel,
                    data.len(),
                    n
                )));
            }
            if let Some(pos) = data.iter().position(|&v| u32::from(v) > depth_bound) {
                return Err(HistoError::invalid_format(format!(
                    "{:?} sample {} at pixel {} exceeds maxrgb {}",
                    channel, data[pos], pos, depth_bound
                )));
            }
        }

        Ok(Self {
            xsize,
            ysize,
            depth_bound,
            channels,
        })
    }

    pub fn xsize(&self) -> u32 {
        self.xsize
    }

    pub fn ysize(&self) -> u32 {
        self.ysize
    }

    pub fn depth_bound(&self) -> u32 {
        self.depth_bound
    }

    /// Histogram length per channel: `depth_bound + 1`.
    pub fn bins(&self) -> usize {
        self.depth_bound as usize + 1
    }

    /// Pixel count `N`.
    pub fn len(&self) -> usize {
        self.channels[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn channel(&self, channel: Channel) -> &[u8] {
        &self.channels[channel.index()]
    }
}
