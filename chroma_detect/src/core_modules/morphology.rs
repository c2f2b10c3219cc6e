// THEORY:
// The `Morphology` module turns the soft likelihood map into a clean binary mask.
//
// 1.  **Thresholding**: every pixel at or above the likelihood threshold becomes
//     WHITE, the rest BLACK.
// 2.  **Erosion**: a pixel stays WHITE only if its whole (2K+1)^2 window is WHITE.
//     Thin streaks and small specks of false positives disappear.
// 3.  **Dilation**: a pixel becomes WHITE if anything in its window is WHITE. What
//     survived erosion grows back and nearby fragments merge.
//
// Only pixels at least K away from every edge are computed. The border band of
// width K is never classified as foreground and stays BLACK in every output.
//
// The window test is answered with a summed-area table of the pixels being
// searched for, so the cost per pixel is four lookups regardless of K. The
// per-pixel decision is the same as scanning the full window.

use crate::core_modules::frame::frame::{FRAME_HEIGHT, FRAME_PIXELS, FRAME_WIDTH, pixel_index};
use crate::core_modules::likelihood::LikelihoodMap;

pub const WHITE: u8 = 255;
pub const BLACK: u8 = 0;

/// A two-valued (WHITE/BLACK) image at the working resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMask {
    values: Vec<u8>,
}

impl BinaryMask {
    /// An all-BLACK mask.
    pub fn black() -> Self {
        Self {
            values: vec![BLACK; FRAME_PIXELS],
        }
    }

    /// An all-WHITE mask.
    pub fn white() -> Self {
        Self {
            values: vec![WHITE; FRAME_PIXELS],
        }
    }

    /// Builds a mask from a per-pixel predicate (`true` is WHITE).
    pub fn from_fn(mut is_white: impl FnMut(u32, u32) -> bool) -> Self {
        let mut mask = Self::black();
        for y in 0..FRAME_HEIGHT {
            for x in 0..FRAME_WIDTH {
                if is_white(x, y) {
                    mask.set(x, y, WHITE);
                }
            }
        }
        mask
    }

    /// WHITE where the likelihood is at least `threshold`.
    pub fn threshold(map: &LikelihoodMap, threshold: u8) -> Self {
        let values = map
            .intensities()
            .iter()
            .map(|&intensity| if intensity >= threshold { WHITE } else { BLACK })
            .collect();
        Self { values }
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.values[pixel_index(x, y)]
    }

    #[inline]
    pub fn is_white(&self, x: u32, y: u32) -> bool {
        self.get(x, y) == WHITE
    }

    #[inline]
    fn set(&mut self, x: u32, y: u32, value: u8) {
        self.values[pixel_index(x, y)] = value;
    }

    pub fn white_count(&self) -> usize {
        self.values.iter().filter(|&&value| value == WHITE).count()
    }

    pub fn to_gray_image(&self) -> image::GrayImage {
        image::GrayImage::from_raw(FRAME_WIDTH, FRAME_HEIGHT, self.values.clone())
            .unwrap_or_else(|| image::GrayImage::new(FRAME_WIDTH, FRAME_HEIGHT))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Erode,
    Dilate,
}

/// Shrinks WHITE regions: WHITE only where no BLACK pixel lies in the window.
pub fn erode(mask: &BinaryMask, half_width: u32) -> BinaryMask {
    sweep(mask, half_width, Operation::Erode)
}

/// Grows WHITE regions: WHITE wherever any WHITE pixel lies in the window.
pub fn dilate(mask: &BinaryMask, half_width: u32) -> BinaryMask {
    sweep(mask, half_width, Operation::Dilate)
}

fn sweep(source: &BinaryMask, half_width: u32, operation: Operation) -> BinaryMask {
    let mut result = BinaryMask::black();
    let k = half_width;
    if 2 * k >= FRAME_WIDTH || 2 * k >= FRAME_HEIGHT {
        log::debug!("kernel half-width {k} leaves no interior, mask stays black");
        return result;
    }

    // Erosion looks for any BLACK, dilation for any WHITE.
    let looking_for_white = operation == Operation::Dilate;
    let table = SummedAreaTable::new(source, looking_for_white);

    for y in k..FRAME_HEIGHT - k {
        for x in k..FRAME_WIDTH - k {
            let found = table.window_sum(x - k, y - k, x + k, y + k) > 0;
            let white = match operation {
                Operation::Erode => !found,
                Operation::Dilate => found,
            };
            if white {
                result.set(x, y, WHITE);
            }
        }
    }
    result
}

/// Prefix counts of matching pixels; entry (x, y) covers [0, x) x [0, y).
struct SummedAreaTable {
    sums: Vec<u32>,
    stride: usize,
}

impl SummedAreaTable {
    fn new(mask: &BinaryMask, count_white: bool) -> Self {
        let stride = FRAME_WIDTH as usize + 1;
        let mut sums = vec![0u32; stride * (FRAME_HEIGHT as usize + 1)];
        for y in 0..FRAME_HEIGHT as usize {
            let mut row_sum = 0u32;
            for x in 0..FRAME_WIDTH as usize {
                let is_white = mask.values[y * FRAME_WIDTH as usize + x] == WHITE;
                if is_white == count_white {
                    row_sum += 1;
                }
                sums[(y + 1) * stride + x + 1] = sums[y * stride + x + 1] + row_sum;
            }
        }
        Self { sums, stride }
    }

    /// Matching pixels in the inclusive rectangle [x0, x1] x [y0, y1].
    #[inline]
    fn window_sum(&self, x0: u32, y0: u32, x1: u32, y1: u32) -> u32 {
        let (x0, y0) = (x0 as usize, y0 as usize);
        let (x1, y1) = (x1 as usize + 1, y1 as usize + 1);
        let at = |x: usize, y: usize| self.sums[y * self.stride + x];
        at(x1, y1) + at(x0, y0) - at(x0, y1) - at(x1, y0)
    }
}
