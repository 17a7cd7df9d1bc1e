//! Deterministic synthetic images for benchmarks and tests.

use clap::ValueEnum;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;

use crate::error::{HistoError, Result};
use crate::pixel::{PixelBuffer, CHANNELS, MAX_DEPTH};

/// Samples generated per RNG stream; chunks are filled in parallel.
const CHUNK: usize = 1 << 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Distribution {
    /// Every bucket equally likely
    #[default]
    Uniform,
    /// ~80% of samples in the lowest 20% of buckets (contention hot spot)
    Skewed,
}

/// Independent seed per (channel, chunk) so parallel filling is deterministic.
fn stream_seed(seed: u64, channel: usize, chunk: usize) -> u64 {
    seed ^ (channel as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ (chunk as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
}

fn fill(chunk: &mut [u8], rng: &mut StdRng, dist: Distribution, depth: u8) {
    match dist {
        Distribution::Uniform => chunk.iter_mut().for_each(|v| *v = rng.gen_range(0..=depth)),
        Distribution::Skewed => {
            let bins = u32::from(depth) + 1;
            let hot = ((bins as f64 * 0.2) as u32).max(1);
            for v in chunk.iter_mut() {
                let sample = if hot == bins || rng.gen_bool(0.8) {
                    rng.gen_range(0..hot)
                } else {
                    rng.gen_range(hot..bins)
                };
                *v = sample as u8;
            }
        }
    }
}

/// Generate an `xsize * ysize` image with samples in `0..=depth`.
pub fn generate(xsize: u32, ysize: u32, depth: u32, dist: Distribution, seed: u64) -> Result<PixelBuffer> {
    if depth > MAX_DEPTH {
        return Err(HistoError::UnsupportedDepth { depth });
    }
    let depth8 = depth as u8;
    let n = (xsize as usize)
        .checked_mul(ysize as usize)
        .ok_or_else(|| HistoError::config(format!("{xsize}x{ysize} image is too large")))?;

    let mut channels: [Vec<u8>; CHANNELS] = [vec![0; n], vec![0; n], vec![0; n]];
    for (c, data) in channels.iter_mut().enumerate() {
        data.par_chunks_mut(CHUNK).enumerate().for_each(|(i, chunk)| {
            let mut rng = StdRng::seed_from_u64(stream_seed(seed, c, i));
            fill(chunk, &mut rng, dist, depth8);
        });
    }

    let [r, g, b] = channels;
    PixelBuffer::new(xsize, ysize, depth, r, g, b)
}
