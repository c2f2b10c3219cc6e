use chroma_detect::{Frame, Pixel};

pub const BACKGROUND: Pixel = Pixel::new(100, 100, 100);
pub const RED: Pixel = Pixel::new(200, 30, 30);
pub const BLUE: Pixel = Pixel::new(20, 40, 220);

/// Half-open pixel rectangle `[x0, x1) x [y0, y1)`.
#[derive(Debug, Clone, Copy)]
pub struct Patch {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
    pub color: Pixel,
}

impl Patch {
    pub const fn new(x0: u32, y0: u32, x1: u32, y1: u32, color: Pixel) -> Self {
        Self {
            x0,
            y0,
            x1,
            y1,
            color,
        }
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        (self.x0..self.x1).contains(&x) && (self.y0..self.y1).contains(&y)
    }
}

/// A uniform background with solid patches painted on top, later patches win.
pub fn scene_with_patches(background: Pixel, patches: &[Patch]) -> Frame {
    Frame::from_fn(|x, y| {
        patches
            .iter()
            .rev()
            .find(|patch| patch.contains(x, y))
            .map_or(background, |patch| patch.color)
    })
}

/// An object photo: a centred block of `color` on the green-screen background.
pub fn keyed_object(color: Pixel) -> Frame {
    scene_with_patches(
        Pixel::GREEN_SCREEN,
        &[Patch::new(220, 140, 420, 340, color)],
    )
}
