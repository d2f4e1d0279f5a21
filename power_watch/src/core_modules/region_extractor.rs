// THEORY:
// The region extractor is the spatial grouping layer. It turns the binary change
// mask into a short list of `Blob`s, one per outer connected region of motion.
//
// Algorithm:
// 1.  **Exterior Flood**: Background pixels reachable from the image border
//     (4-connected) are marked as "outside". Any background pixel that is not
//     reachable is a hole enclosed by motion.
// 2.  **Hole Filling**: A pixel is "solid" if it is foreground or a hole. This
//     is what makes the extractor report outer boundaries only: a region lying
//     inside another region's hole becomes part of the enclosing region instead
//     of being reported on its own.
// 3.  **Region Growing**: Solid pixels are grouped 8-connected with an
//     iterative flood fill, collecting the bounding box and pixel count.
// 4.  **Noise Filter**: Regions covering fewer than `min_area` pixels are sensor
//     noise or reflections and are dropped.
//
// This is a stateless utility: one mask in, one list out. The order of the
// returned blobs carries no meaning.

use crate::core_modules::blob::{Blob, Rect};
use image::GrayImage;

pub mod region_extractor {
    use super::*;

    const NEIGHBOURS_4: [(i64, i64); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];
    const NEIGHBOURS_8: [(i64, i64); 8] = [
        (-1, -1),
        (0, -1),
        (1, -1),
        (-1, 0),
        (1, 0),
        (-1, 1),
        (0, 1),
        (1, 1),
    ];

    /// Finds every outer region of non-zero pixels in `mask` whose area is at
    /// least `min_area`.
    pub fn find_regions(mask: &GrayImage, min_area: u32) -> Vec<Blob> {
        let (width, height) = mask.dimensions();
        let (w, h) = (width as usize, height as usize);
        if w == 0 || h == 0 {
            return Vec::new();
        }

        let foreground: Vec<bool> = mask.pixels().map(|p| p[0] != 0).collect();

        // --- 1. Exterior Flood ---
        let mut outside = vec![false; w * h];
        let mut queue: Vec<(usize, usize)> = Vec::new();
        let border = (0..w)
            .flat_map(|x| [(x, 0), (x, h - 1)])
            .chain((0..h).flat_map(|y| [(0, y), (w - 1, y)]));
        for (x, y) in border {
            let index = y * w + x;
            if !foreground[index] && !outside[index] {
                outside[index] = true;
                queue.push((x, y));
            }
        }
        while let Some((x, y)) = queue.pop() {
            for (nx, ny) in neighbours(x, y, w, h, &NEIGHBOURS_4) {
                let index = ny * w + nx;
                if !foreground[index] && !outside[index] {
                    outside[index] = true;
                    queue.push((nx, ny));
                }
            }
        }

        // --- 2 & 3. Hole Filling and Region Growing ---
        // Every pixel that is not outside is solid.
        let mut visited = outside;
        let mut blobs = Vec::new();
        for start in 0..w * h {
            if visited[start] {
                continue;
            }
            visited[start] = true;
            queue.push((start % w, start / w));

            let (mut min_x, mut min_y, mut max_x, mut max_y) = (usize::MAX, usize::MAX, 0, 0);
            let mut area = 0u32;
            while let Some((x, y)) = queue.pop() {
                area += 1;
                min_x = min_x.min(x);
                min_y = min_y.min(y);
                max_x = max_x.max(x);
                max_y = max_y.max(y);

                for (nx, ny) in neighbours(x, y, w, h, &NEIGHBOURS_8) {
                    let index = ny * w + nx;
                    if !visited[index] {
                        visited[index] = true;
                        queue.push((nx, ny));
                    }
                }
            }

            // --- 4. Noise Filter ---
            if area >= min_area {
                blobs.push(Blob {
                    rect: Rect::new(min_x as u32, min_y as u32, max_x as u32 + 1, max_y as u32 + 1),
                    area,
                });
            }
        }

        blobs
    }

    fn neighbours<'a>(
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        offsets: &'a [(i64, i64)],
    ) -> impl Iterator<Item = (usize, usize)> + 'a {
        offsets.iter().filter_map(move |(dx, dy)| {
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;
            if nx >= 0 && ny >= 0 && (nx as usize) < width && (ny as usize) < height {
                Some((nx as usize, ny as usize))
            } else {
                None
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::region_extractor::*;
    use super::*;
    use image::Luma;

    fn fill(mask: &mut GrayImage, x0: u32, y0: u32, x1: u32, y1: u32, value: u8) {
        for y in y0..y1 {
            for x in x0..x1 {
                mask.put_pixel(x, y, Luma([value]));
            }
        }
    }

    fn sorted(mut blobs: Vec<Blob>) -> Vec<Blob> {
        blobs.sort_by_key(|b| (b.rect.x0, b.rect.y0));
        blobs
    }

    #[test]
    fn empty_mask_has_no_regions() {
        assert!(find_regions(&GrayImage::new(64, 48), 0).is_empty());
        assert!(find_regions(&GrayImage::new(0, 0), 0).is_empty());
    }

    #[test]
    fn single_square_reports_extent_and_area() {
        let mut mask = GrayImage::new(100, 100);
        fill(&mut mask, 10, 20, 40, 50, 255);
        let blobs = find_regions(&mask, 500);
        assert_eq!(
            blobs,
            vec![Blob {
                rect: Rect::new(10, 20, 40, 50),
                area: 900
            }]
        );
    }

    #[test]
    fn small_regions_are_dropped() {
        let mut mask = GrayImage::new(100, 100);
        fill(&mut mask, 0, 0, 10, 10, 255);
        fill(&mut mask, 50, 50, 80, 80, 255);
        let blobs = find_regions(&mask, 500);
        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].rect, Rect::new(50, 50, 80, 80));
        // The threshold itself is kept.
        assert_eq!(find_regions(&mask, 100).len(), 2);
    }

    #[test]
    fn diagonal_pixels_join_one_region() {
        let mut mask = GrayImage::new(10, 10);
        for i in 0..10 {
            mask.put_pixel(i, i, Luma([255]));
        }
        let blobs = find_regions(&mask, 1);
        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].rect, Rect::new(0, 0, 10, 10));
        assert_eq!(blobs[0].area, 10);
    }

    #[test]
    fn nested_region_is_absorbed_by_its_enclosure() {
        let mut mask = GrayImage::new(100, 100);
        // A ring from 10..90 with a wall 5 pixels thick ...
        fill(&mut mask, 10, 10, 90, 90, 255);
        fill(&mut mask, 15, 15, 85, 85, 0);
        // ... and an island in its hole.
        fill(&mut mask, 40, 40, 60, 60, 255);
        let blobs = find_regions(&mask, 1);
        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].rect, Rect::new(10, 10, 90, 90));
        assert_eq!(blobs[0].area, 80 * 80);
    }

    #[test]
    fn separate_regions_are_all_reported() {
        let mut mask = GrayImage::new(200, 100);
        fill(&mut mask, 0, 0, 30, 30, 255);
        fill(&mut mask, 100, 50, 140, 100, 255);
        let blobs = sorted(find_regions(&mask, 500));
        assert_eq!(blobs.len(), 2);
        assert_eq!(blobs[0].rect, Rect::new(0, 0, 30, 30));
        assert_eq!(blobs[1].rect, Rect::new(100, 50, 140, 100));
        assert_eq!(blobs[1].area, 2000);
    }

    #[test]
    fn hole_touching_the_border_is_not_filled() {
        let mut mask = GrayImage::new(50, 50);
        // A "U" shape open towards the bottom edge.
        fill(&mut mask, 10, 10, 40, 15, 255);
        fill(&mut mask, 10, 15, 15, 50, 255);
        fill(&mut mask, 35, 15, 40, 50, 255);
        let blobs = find_regions(&mask, 1);
        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].area, 30 * 5 + 2 * 5 * 35);
    }
}
