// THEORY:
// The `Histogram` module summarises an entire frame as two 256-bin frequency
// tables, one per chroma channel. It is the "is the object plausibly here at all"
// layer: before any per-pixel work happens, the scene's chroma distribution is
// compared against the object's, and only then is the much heavier
// back-projection run.
//
// Key architectural principles:
// 1.  **Dense tables**: the bin range is always exactly [0, 255], so a fixed
//     `[u32; 256]` per channel is indexed directly by the chroma value.
// 2.  **Chroma keying**: object images are photographed on a green screen. When
//     building an object histogram, pixels close to the key colour are skipped so
//     the background does not pollute the object's signature.
// 3.  **Degenerate input is data**: a channel that received no pixels normalises
//     to all zeros instead of failing. Callers must tolerate such histograms.
// 4.  **Divergence, not similarity**: `compare` returns a chi-square-like
//     statistic where 0 means identical and 2 means fully disjoint.

use crate::core_modules::frame::frame::Frame;
use crate::core_modules::pixel::pixel::{ManhattanDistance, Pixel};
use serde::{Deserialize, Serialize};

/// Number of bins per chroma channel.
pub const BINS: usize = 256;

/// Background-removal rule for object images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChromaKey {
    /// The background colour to drop.
    pub color: Pixel,
    /// Pixels strictly closer than this (RGB Manhattan distance) are dropped.
    pub max_distance: ManhattanDistance,
}

impl Default for ChromaKey {
    fn default() -> Self {
        Self {
            color: Pixel::GREEN_SCREEN,
            max_distance: 20,
        }
    }
}

impl ChromaKey {
    #[inline]
    pub fn is_keyed_out(&self, pixel: &Pixel) -> bool {
        pixel.manhattan_distance(&self.color) < self.max_distance
    }
}

/// Which kind of image a histogram is being built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistogramMode {
    /// Every pixel contributes.
    Scene,
    /// Pixels matching the chroma key are excluded.
    Object(ChromaKey),
}

/// Raw U/V frequency tables of one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChromaHistogram {
    pub u: [u32; BINS],
    pub v: [u32; BINS],
}

/// U/V tables scaled so each non-empty channel sums to 1.0.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedHistogram {
    pub u: [f64; BINS],
    pub v: [f64; BINS],
}

impl Default for ChromaHistogram {
    fn default() -> Self {
        Self {
            u: [0; BINS],
            v: [0; BINS],
        }
    }
}

impl ChromaHistogram {
    /// Counts the chroma of every contributing pixel of `frame`.
    pub fn build(frame: &Frame, mode: HistogramMode) -> Self {
        let mut histogram = Self::default();
        let mut keyed_out = 0usize;

        for pixel in frame.pixels() {
            if let HistogramMode::Object(key) = mode {
                if key.is_keyed_out(pixel) {
                    keyed_out += 1;
                    continue;
                }
            }
            histogram.accumulate(pixel);
        }

        if keyed_out > 0 {
            log::debug!("chroma key removed {keyed_out} pixels from object histogram");
        }
        histogram
    }

    #[inline]
    fn accumulate(&mut self, pixel: &Pixel) {
        let chroma = pixel.chroma();
        self.u[chroma.u as usize] += 1;
        self.v[chroma.v as usize] += 1;
    }

    /// Number of pixels that contributed to the U channel.
    pub fn u_total(&self) -> u64 {
        self.u.iter().map(|&count| count as u64).sum()
    }

    /// Number of pixels that contributed to the V channel.
    pub fn v_total(&self) -> u64 {
        self.v.iter().map(|&count| count as u64).sum()
    }

    pub fn normalize(&self) -> NormalizedHistogram {
        NormalizedHistogram {
            u: normalize_channel(&self.u, "U"),
            v: normalize_channel(&self.v, "V"),
        }
    }
}

fn normalize_channel(counts: &[u32; BINS], name: &str) -> [f64; BINS] {
    let total: f64 = counts.iter().map(|&count| count as f64).sum();
    let mut normalized = [0.0; BINS];
    if total == 0.0 {
        log::debug!("{name} channel histogram is empty, normalising to zeros");
        return normalized;
    }
    for (bin, &count) in normalized.iter_mut().zip(counts.iter()) {
        *bin = count as f64 / total;
    }
    normalized
}

/// Chi-square-like divergence between two histograms.
///
/// Both inputs are normalised first; bins where both sides are zero are skipped.
/// The result lies in [0, 2]: 0 for identical distributions, 2 for disjoint ones.
pub fn compare(a: &ChromaHistogram, b: &ChromaHistogram) -> f64 {
    let a = a.normalize();
    let b = b.normalize();

    let channels = [(&a.u, &b.u), (&a.v, &b.v)];
    let mut sum = 0.0;
    for (a_channel, b_channel) in channels {
        for (&x, &y) in a_channel.iter().zip(b_channel.iter()) {
            let denominator = x + y;
            if denominator == 0.0 {
                continue;
            }
            sum += (x - y) * (x - y) / denominator;
        }
    }
    sum / 2.0
}
