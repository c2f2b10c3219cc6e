//! Reading scene and object images into engine frames.
//!
//! `.rgb` files are headerless planar dumps at the working resolution: every red
//! byte in row-major order, then every green byte, then every blue byte. Anything
//! else is decoded by the `image` crate and must already be 640x480.

use std::path::Path;

use anyhow::Context;
use chroma_detect::core_modules::frame::frame::FRAME_PIXELS;
use chroma_detect::{FRAME_HEIGHT, FRAME_WIDTH, Frame, Pixel};

pub fn load_frame(path: &Path) -> anyhow::Result<Frame> {
    match path.extension().and_then(|os_str| os_str.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("rgb") => {
            let bytes = std::fs::read(path).with_context(|| format!("reading {path:?}"))?;
            planar_to_frame(&bytes).with_context(|| format!("decoding raw planar {path:?}"))
        }
        _ => {
            let image = image::open(path)
                .with_context(|| format!("decoding {path:?}"))?
                .to_rgb8();
            Ok(Frame::from_rgb_image(&image)?)
        }
    }
}

/// Interprets `bytes` as three consecutive colour planes.
pub fn planar_to_frame(bytes: &[u8]) -> anyhow::Result<Frame> {
    let expected = FRAME_PIXELS * 3;
    anyhow::ensure!(
        bytes.len() == expected,
        "expected {expected} bytes for a {FRAME_WIDTH}x{FRAME_HEIGHT} planar image, got {}",
        bytes.len()
    );

    let (red, rest) = bytes.split_at(FRAME_PIXELS);
    let (green, blue) = rest.split_at(FRAME_PIXELS);
    let pixels = red
        .iter()
        .zip(green)
        .zip(blue)
        .map(|((&r, &g), &b)| Pixel::new(r, g, b))
        .collect();
    Ok(Frame::new(pixels)?)
}

/// The label shown for an image: its file name.
pub fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
