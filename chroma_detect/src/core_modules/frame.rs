// THEORY:
// The `Frame` module is the spatial container of the detector: one full image at
// the single working resolution. Every stage downstream (histograms, the
// likelihood map, masks) is laid out on the same fixed grid, so a `Frame` can
// only be constructed at exactly `FRAME_WIDTH x FRAME_HEIGHT`. That check happens
// once, here, and the algorithmic layers can index without bounds bookkeeping.
//
// Like `Pixel`, a `Frame` is a "dumb" data container: row-major pixels and the
// conversions needed to get image data in and out of it.

pub mod frame {
    use crate::core_modules::pixel::pixel::{Byte, Pixel};
    use crate::error::{DetectionError, Result};

    /// Working width of every image handled by the engine.
    pub const FRAME_WIDTH: u32 = 640;
    /// Working height of every image handled by the engine.
    pub const FRAME_HEIGHT: u32 = 480;
    /// Number of pixels in a frame.
    pub const FRAME_PIXELS: usize = (FRAME_WIDTH * FRAME_HEIGHT) as usize;

    const RGB_CHANNELS: usize = 3;

    /// Flat index of (x, y) in any row-major grid of the working resolution.
    #[inline]
    pub fn pixel_index(x: u32, y: u32) -> usize {
        (y * FRAME_WIDTH + x) as usize
    }

    /// A full-resolution RGB image.
    #[derive(Debug, Clone, PartialEq)]
    pub struct Frame {
        /// A flattened, row-major vector of every pixel.
        pixels: Vec<Pixel>,
    }

    impl Frame {
        /// Wraps an already flattened pixel vector.
        pub fn new(pixels: Vec<Pixel>) -> Result<Self> {
            if pixels.len() != FRAME_PIXELS {
                return Err(DetectionError::frame_size(
                    format!("{FRAME_PIXELS} pixels"),
                    format!("{} pixels", pixels.len()),
                ));
            }
            Ok(Self { pixels })
        }

        /// A frame filled with one colour.
        pub fn filled(pixel: Pixel) -> Self {
            Self {
                pixels: vec![pixel; FRAME_PIXELS],
            }
        }

        /// Builds a frame by evaluating `f(x, y)` for every pixel.
        pub fn from_fn(mut f: impl FnMut(u32, u32) -> Pixel) -> Self {
            let mut pixels = Vec::with_capacity(FRAME_PIXELS);
            for y in 0..FRAME_HEIGHT {
                for x in 0..FRAME_WIDTH {
                    pixels.push(f(x, y));
                }
            }
            Self { pixels }
        }

        /// Interleaved `RGBRGB...` bytes, row-major.
        pub fn from_rgb_bytes(bytes: &[Byte]) -> Result<Self> {
            let expected = FRAME_PIXELS * RGB_CHANNELS;
            if bytes.len() != expected {
                return Err(DetectionError::frame_size(
                    format!("{expected} bytes"),
                    format!("{} bytes", bytes.len()),
                ));
            }
            let pixels = bytes
                .chunks_exact(RGB_CHANNELS)
                .map(|rgb| Pixel::new(rgb[0], rgb[1], rgb[2]))
                .collect();
            Ok(Self { pixels })
        }

        pub fn from_rgb_image(image: &image::RgbImage) -> Result<Self> {
            let (width, height) = image.dimensions();
            if (width, height) != (FRAME_WIDTH, FRAME_HEIGHT) {
                return Err(DetectionError::frame_size(
                    format!("{FRAME_WIDTH}x{FRAME_HEIGHT}"),
                    format!("{width}x{height}"),
                ));
            }
            Self::from_rgb_bytes(image.as_raw())
        }

        pub fn to_rgb_image(&self) -> image::RgbImage {
            let mut bytes = Vec::with_capacity(FRAME_PIXELS * RGB_CHANNELS);
            for pixel in &self.pixels {
                bytes.extend_from_slice(&[pixel.red, pixel.green, pixel.blue]);
            }
            // The buffer length always matches the working resolution.
            image::RgbImage::from_raw(FRAME_WIDTH, FRAME_HEIGHT, bytes)
                .unwrap_or_else(|| image::RgbImage::new(FRAME_WIDTH, FRAME_HEIGHT))
        }

        #[inline]
        pub fn get(&self, x: u32, y: u32) -> Pixel {
            self.pixels[pixel_index(x, y)]
        }

        pub fn pixels(&self) -> &[Pixel] {
            &self.pixels
        }
    }
}

#[cfg(test)]
mod tests {
    use super::frame::*;
    use crate::core_modules::pixel::pixel::Pixel;
    use crate::error::DetectionError;

    #[test]
    fn rejects_wrong_pixel_count() {
        let result = Frame::new(vec![Pixel::default(); 10]);
        assert!(matches!(result, Err(DetectionError::FrameSize { .. })));
    }

    #[test]
    fn rgb_bytes_are_read_row_major() {
        let mut bytes = vec![0u8; FRAME_PIXELS * 3];
        // Pixel (x = 1, y = 2).
        let offset = pixel_index(1, 2) * 3;
        bytes[offset..offset + 3].copy_from_slice(&[9, 8, 7]);

        let frame = Frame::from_rgb_bytes(&bytes).expect("valid buffer");
        assert_eq!(frame.get(1, 2), Pixel::new(9, 8, 7));
        assert_eq!(frame.get(2, 1), Pixel::default());
    }

    #[test]
    fn rgb_image_round_trips_through_frame() {
        let frame = Frame::from_fn(|x, y| Pixel::new((x % 256) as u8, (y % 256) as u8, 42));
        let image = frame.to_rgb_image();
        assert_eq!(image.get_pixel(300, 200).0, [(300 % 256) as u8, 200, 42]);
        assert_eq!(Frame::from_rgb_image(&image).expect("same size"), frame);
    }

    #[test]
    fn rejects_images_at_other_resolutions() {
        let image = image::RgbImage::new(320, 240);
        assert!(Frame::from_rgb_image(&image).is_err());
    }
}
