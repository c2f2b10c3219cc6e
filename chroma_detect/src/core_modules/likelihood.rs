// THEORY:
// Back-projection answers "how likely is each scene pixel to belong to the
// object's colour distribution?". For each pixel the U and V bins are looked up
// in both histograms and turned into a ratio of object frequency over scene
// frequency. Colours that are common on the object but rare in the scene score
// high; colours that cover most of the scene score near zero.
//
// Both counts are Laplace-smoothed (+1) so an empty scene bin never divides by
// zero and rare bins do not explode. The two channel ratios are averaged and
// scaled to an 8-bit intensity, truncated and clamped to [0, 255].

use crate::core_modules::frame::frame::{FRAME_HEIGHT, FRAME_WIDTH, Frame, pixel_index};
use crate::core_modules::histogram::ChromaHistogram;

/// Per-pixel likelihood of object membership, scaled to 0..=255.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikelihoodMap {
    intensities: Vec<u8>,
}

impl LikelihoodMap {
    /// Projects the object histogram onto the scene.
    pub fn back_project(
        scene: &Frame,
        scene_histogram: &ChromaHistogram,
        object_histogram: &ChromaHistogram,
    ) -> Self {
        let intensities = scene
            .pixels()
            .iter()
            .map(|pixel| {
                let chroma = pixel.chroma();
                let u_ratio = smoothed_ratio(
                    object_histogram.u[chroma.u as usize],
                    scene_histogram.u[chroma.u as usize],
                );
                let v_ratio = smoothed_ratio(
                    object_histogram.v[chroma.v as usize],
                    scene_histogram.v[chroma.v as usize],
                );
                ratio_to_intensity((u_ratio + v_ratio) / 2.0)
            })
            .collect();
        Self { intensities }
    }

    #[cfg(test)]
    pub(crate) fn from_intensities(intensities: Vec<u8>) -> Self {
        debug_assert_eq!(
            intensities.len(),
            crate::core_modules::frame::frame::FRAME_PIXELS
        );
        Self { intensities }
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.intensities[pixel_index(x, y)]
    }

    pub fn intensities(&self) -> &[u8] {
        &self.intensities
    }

    pub fn to_gray_image(&self) -> image::GrayImage {
        image::GrayImage::from_raw(FRAME_WIDTH, FRAME_HEIGHT, self.intensities.clone())
            .unwrap_or_else(|| image::GrayImage::new(FRAME_WIDTH, FRAME_HEIGHT))
    }
}

#[inline]
fn smoothed_ratio(object_count: u32, scene_count: u32) -> f64 {
    (object_count as f64 + 1.0) / (scene_count as f64 + 1.0)
}

#[inline]
fn ratio_to_intensity(ratio: f64) -> u8 {
    // Truncate like an integer cast, then clamp.
    ((255.0 * ratio) as i64).clamp(0, 255) as u8
}
