// THEORY:
// `BoundingBox` and `Detection` are the only values that leave the engine. A box
// is the axis-aligned rectangle enclosing one connected foreground region of the
// cleaned mask; a detection pairs it with the label of the object image that
// produced it. Both are plain, immutable data containers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An axis-aligned rectangle in scene pixel coordinates.
///
/// `width` and `height` are the coordinate spans of the region
/// (`max - min`), always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}) {}x{}", self.x, self.y, self.width, self.height)
    }
}

/// A bounding box tagged with the object it was found for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    pub bounding_box: BoundingBox,
    pub label: String,
}
