// THEORY:
// The `BlobDetector` is the last stage of the detector. It takes the cleaned binary
// mask and turns every spatially coherent foreground region into a bounding box.
//
// Key architectural principles & algorithm steps:
// 1.  **Seeding**: the mask is scanned in row-major order. Any pixel that has not
//     been visited yet and whose intensity exceeds the detection threshold starts
//     a new region.
// 2.  **Region Growing**: from the seed, the region is flooded through its four
//     direct neighbours (no diagonals). The pending pixels live on an explicit
//     LIFO stack rather than the call stack, because a single region can cover
//     almost the whole frame.
// 3.  **Edge policy**: a popped position that is out of bounds, already visited or
//     not bright enough simply ends that branch. Only pixels that pass are marked
//     visited, so a dark pixel can be looked at again from another region.
// 4.  **Aggregation**: the min/max x and y of the flooded pixels give the box. A
//     region only one pixel wide or tall has a zero span and is dropped.
// 5.  **Stateless Utility**: `extract_regions` keeps nothing between calls; the
//     visited grid is allocated per call.

use crate::core_modules::bounding_box::BoundingBox;
use crate::core_modules::frame::frame::{FRAME_HEIGHT, FRAME_PIXELS, FRAME_WIDTH, pixel_index};
use crate::core_modules::morphology::BinaryMask;

pub mod blob_detector {
    use super::*; // Make structs from parent module available.

    /// Finds the bounding boxes of all 4-connected regions brighter than `threshold`.
    pub fn extract_regions(mask: &BinaryMask, threshold: u8) -> Vec<BoundingBox> {
        let mut visited = vec![false; FRAME_PIXELS];
        let mut boxes = Vec::new();
        let mut discarded = 0usize;

        for y in 0..FRAME_HEIGHT {
            for x in 0..FRAME_WIDTH {
                if visited[pixel_index(x, y)] || mask.get(x, y) <= threshold {
                    continue;
                }
                match flood_region((x, y), mask, threshold, &mut visited) {
                    Some(bounding_box) => boxes.push(bounding_box),
                    None => discarded += 1,
                }
            }
        }

        log::debug!(
            "extracted {} regions, discarded {discarded} degenerate ones",
            boxes.len()
        );
        boxes
    }

    /// Floods one region from `seed` and returns its box, if it has area.
    fn flood_region(
        seed: (u32, u32),
        mask: &BinaryMask,
        threshold: u8,
        visited: &mut [bool],
    ) -> Option<BoundingBox> {
        let (mut min_x, mut min_y) = seed;
        let (mut max_x, mut max_y) = seed;

        let mut stack: Vec<(i64, i64)> = vec![(seed.0 as i64, seed.1 as i64)];
        while let Some((x, y)) = stack.pop() {
            if x < 0 || y < 0 || x >= FRAME_WIDTH as i64 || y >= FRAME_HEIGHT as i64 {
                continue;
            }
            let (ux, uy) = (x as u32, y as u32);
            let index = pixel_index(ux, uy);
            if visited[index] || mask.get(ux, uy) <= threshold {
                continue;
            }

            visited[index] = true;
            min_x = min_x.min(ux);
            max_x = max_x.max(ux);
            min_y = min_y.min(uy);
            max_y = max_y.max(uy);

            // Check all 4 direct neighbors (not diagonals).
            stack.extend_from_slice(&[(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)]);
        }

        let width = max_x - min_x;
        let height = max_y - min_y;
        if width == 0 || height == 0 {
            return None;
        }
        Some(BoundingBox {
            x: min_x,
            y: min_y,
            width,
            height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::blob_detector::extract_regions;
    use super::*;

    const THRESHOLD: u8 = 5;

    fn rect(x0: u32, y0: u32, x1: u32, y1: u32) -> impl Fn(u32, u32) -> bool {
        move |x, y| (x0..x1).contains(&x) && (y0..y1).contains(&y)
    }

    #[test]
    fn empty_mask_has_no_regions() {
        assert!(extract_regions(&BinaryMask::black(), THRESHOLD).is_empty());
    }

    #[test]
    fn one_rectangle_gives_its_span() {
        let mask = BinaryMask::from_fn(rect(10, 20, 60, 45));
        let boxes = extract_regions(&mask, THRESHOLD);
        assert_eq!(
            boxes,
            vec![BoundingBox {
                x: 10,
                y: 20,
                width: 49,
                height: 24,
            }]
        );
    }

    #[test]
    fn regions_are_reported_in_row_major_seed_order() {
        let lower_left = rect(5, 300, 50, 340);
        let upper_right = rect(500, 10, 600, 90);
        let mask = BinaryMask::from_fn(|x, y| lower_left(x, y) || upper_right(x, y));
        let boxes = extract_regions(&mask, THRESHOLD);
        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[0].x, 500);
        assert_eq!(boxes[1].x, 5);
    }

    #[test]
    fn diagonal_contact_does_not_connect() {
        let a = rect(100, 100, 110, 110);
        let b = rect(110, 110, 120, 120);
        let mask = BinaryMask::from_fn(|x, y| a(x, y) || b(x, y));
        assert_eq!(extract_regions(&mask, THRESHOLD).len(), 2);
    }

    #[test]
    fn lines_and_single_pixels_are_discarded() {
        let mask = BinaryMask::from_fn(|x, y| {
            (y == 50 && (10..200).contains(&x)) // horizontal line
                || (x == 300 && (10..200).contains(&y)) // vertical line
                || (x == 400 && y == 400) // lone pixel
        });
        assert!(extract_regions(&mask, THRESHOLD).is_empty());
    }

    #[test]
    fn l_shape_is_one_region_with_full_span() {
        let vertical = rect(200, 100, 210, 300);
        let horizontal = rect(200, 290, 400, 300);
        let mask = BinaryMask::from_fn(|x, y| vertical(x, y) || horizontal(x, y));
        assert_eq!(
            extract_regions(&mask, THRESHOLD),
            vec![BoundingBox {
                x: 200,
                y: 100,
                width: 199,
                height: 199,
            }]
        );
    }

    #[test]
    fn full_frame_region_does_not_overflow_the_stack() {
        let boxes = extract_regions(&BinaryMask::white(), THRESHOLD);
        assert_eq!(
            boxes,
            vec![BoundingBox {
                x: 0,
                y: 0,
                width: FRAME_WIDTH - 1,
                height: FRAME_HEIGHT - 1,
            }]
        );
    }

    #[test]
    fn extraction_is_repeatable() {
        let a = rect(20, 20, 80, 90);
        let b = rect(300, 100, 420, 260);
        let mask = BinaryMask::from_fn(|x, y| a(x, y) || b(x, y));
        assert_eq!(extract_regions(&mask, THRESHOLD), extract_regions(&mask, THRESHOLD));
    }
}
