// THEORY (Colour-Space Conversion):
// The `Pixel` module is the most fundamental unit of the detector. It is a "dumb"
// data container for a single RGB pixel plus the one transform every other layer
// depends on: the luma/chroma split (Y, U, V). Histograms, back-projection and the
// chroma-key filter all work in U/V, so brightness (Y) never influences a match.
//
// The coefficients are the fixed BT.601 studio-swing constants with +16/+128
// offsets. Results are truncated toward zero, never rounded, so every downstream
// bin index is reproducible bit for bit. For any 8-bit input the offsets keep
// Y in [16, 235] and U, V in [16, 239], which is why the outputs fit a `u8`
// without clamping.
//
// Key principles:
// 1) Single-pixel scope: nothing here reads neighbours.
// 2) No error conditions: every 8-bit triple is a valid input.

pub mod pixel {
    use serde::{Deserialize, Serialize};

    pub type Byte = u8;
    pub type Channel = Byte;
    pub type Luma = u8;
    pub type ChromaChannel = u8;
    pub type ManhattanDistance = u32;

    /// A "dumb" data container representing a single RGB pixel.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Pixel {
        /// The red channel value (0-255).
        pub red: Channel,
        /// The green channel value (0-255).
        pub green: Channel,
        /// The blue channel value (0-255).
        pub blue: Channel,
    }

    /// The luma/chroma decomposition of one pixel.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Chroma {
        pub y: Luma,
        pub u: ChromaChannel,
        pub v: ChromaChannel,
    }

    /// Converts an RGB triple to (Y, U, V).
    ///
    /// - Evaluated in f64 and truncated toward zero (integer-cast semantics).
    /// - Never clamps: the constant offsets already keep every channel in range.
    #[inline]
    pub fn rgb_to_chroma(red: Channel, green: Channel, blue: Channel) -> Chroma {
        let r = red as f64;
        let g = green as f64;
        let b = blue as f64;

        let y = 0.257 * r + 0.504 * g + 0.098 * b + 16.0;
        let u = -0.148 * r - 0.291 * g + 0.439 * b + 128.0;
        let v = 0.439 * r - 0.368 * g - 0.071 * b + 128.0;

        Chroma {
            y: y as Luma,
            u: u as ChromaChannel,
            v: v as ChromaChannel,
        }
    }

    impl Pixel {
        pub const fn new(red: Channel, green: Channel, blue: Channel) -> Self {
            Pixel { red, green, blue }
        }

        /// Pure green, the default chroma-key background of object images.
        pub const GREEN_SCREEN: Pixel = Pixel::new(0, 255, 0);

        pub fn chroma(&self) -> Chroma {
            rgb_to_chroma(self.red, self.green, self.blue)
        }

        /// Sum of absolute per-channel differences (L1 distance in RGB).
        pub fn manhattan_distance(&self, other: &Pixel) -> ManhattanDistance {
            self.red.abs_diff(other.red) as ManhattanDistance
                + self.green.abs_diff(other.green) as ManhattanDistance
                + self.blue.abs_diff(other.blue) as ManhattanDistance
        }
    }

    impl From<[Byte; 3]> for Pixel {
        fn from(bytes: [Byte; 3]) -> Self {
            Pixel::new(bytes[0], bytes[1], bytes[2])
        }
    }

    impl From<image::Rgb<Byte>> for Pixel {
        fn from(rgb: image::Rgb<Byte>) -> Self {
            Pixel::from(rgb.0)
        }
    }

    impl From<Pixel> for image::Rgb<Byte> {
        fn from(pixel: Pixel) -> Self {
            image::Rgb([pixel.red, pixel.green, pixel.blue])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::pixel::*;

    #[test]
    fn black_and_white_hit_the_offset_ends() {
        let black = rgb_to_chroma(0, 0, 0);
        assert_eq!(
            black,
            Chroma {
                y: 16,
                u: 128,
                v: 128,
            }
        );

        let white = rgb_to_chroma(255, 255, 255);
        assert_eq!(white.y, 235);
        // The U and V coefficient rows each sum to zero, up to float error.
        assert!((127..=128).contains(&white.u));
        assert!((127..=128).contains(&white.v));
    }

    #[test]
    fn conversion_truncates_instead_of_rounding() {
        // u = -0.148*200 - 0.291*30 + 0.439*30 + 128 = 102.84
        // v = 0.439*200 - 0.368*30 - 0.071*30 + 128 = 202.63
        let c = rgb_to_chroma(200, 30, 30);
        assert_eq!(c.u, 102);
        assert_eq!(c.v, 202);
    }

    #[test]
    fn chroma_stays_inside_studio_range_for_all_inputs() {
        let mut values: Vec<u8> = (0..=255).step_by(5).collect();
        values.push(255);
        for &r in &values {
            for &g in &values {
                for &b in &values {
                    let c = rgb_to_chroma(r, g, b);
                    assert!((16..=235).contains(&c.y), "y={} for {r},{g},{b}", c.y);
                    assert!((16..=240).contains(&c.u), "u={} for {r},{g},{b}", c.u);
                    assert!((16..=240).contains(&c.v), "v={} for {r},{g},{b}", c.v);
                }
            }
        }
    }

    #[test]
    fn manhattan_distance_sums_channel_gaps() {
        let a = Pixel::new(10, 240, 5);
        assert_eq!(a.manhattan_distance(&Pixel::GREEN_SCREEN), 10 + 15 + 5);
        assert_eq!(Pixel::GREEN_SCREEN.manhattan_distance(&Pixel::GREEN_SCREEN), 0);
    }
}

// -----------------------------------------------------------------------------
// Glossary: Luma/Chroma Terms
//
// - Luma (Y): Weighted brightness. Carried along for completeness but ignored by
//   every matching stage.
//
// - Chroma (U, V): Blue-difference and red-difference channels. Two pixels of the
//   same paint under different light tend to keep similar U/V while Y moves.
//
// - Chroma key: A reference colour (pure green by default) marking background
//   pixels of an object image that must not contribute to its histogram.
