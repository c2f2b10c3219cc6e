//! Drawing detections onto a copy of the scene.

use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use anyhow::Context;
use chroma_detect::{BoundingBox, Detection, Frame};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;

const BOX_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
const LABEL_SCALE: f32 = 13.0;
const LABEL_OFFSET_X: i32 = 30;
const LABEL_OFFSET_Y: i32 = 20;

pub fn load_font(path: &Path) -> anyhow::Result<FontVec> {
    let bytes = std::fs::read(path).with_context(|| format!("reading font {path:?}"))?;
    FontVec::try_from_vec(bytes).with_context(|| format!("parsing font {path:?}"))
}

/// Blue outlines for every box; labels too when a font is available.
pub fn annotate(scene: &Frame, detections: &[Detection], font: Option<&FontVec>) -> RgbImage {
    let mut image = scene.to_rgb_image();
    for detection in detections {
        draw_hollow_rect_mut(&mut image, outline(&detection.bounding_box), BOX_COLOR);

        if let Some(font) = font {
            let (x, y) = label_origin(&detection.bounding_box);
            draw_text_mut(
                &mut image,
                BOX_COLOR,
                x,
                y,
                PxScale::from(LABEL_SCALE),
                font,
                &detection.label,
            );
        }
    }
    image
}

/// Box widths and heights are spans, so the outline covers both end pixels.
fn outline(b: &BoundingBox) -> Rect {
    Rect::at(b.x as i32, b.y as i32).of_size(b.width + 1, b.height + 1)
}

/// Top-left corner of the label text. Its baseline sits `LABEL_OFFSET_Y` above
/// the bottom edge, inside the box.
fn label_origin(b: &BoundingBox) -> (i32, i32) {
    let baseline = (b.y + b.height) as i32 - LABEL_OFFSET_Y;
    (b.x as i32 + LABEL_OFFSET_X, baseline - LABEL_SCALE as i32)
}
