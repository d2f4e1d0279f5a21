// THEORY:
// The `blob` module holds the two plain geometric values that flow between the
// stages of the pipeline. A `Rect` is an axis-aligned box in frame pixel
// coordinates (y grows downward). A `Blob` is one region of motion found in a
// single frame: its bounding `Rect` plus the number of pixels it actually
// covers, which is what the noise filter looks at.
//
// Both are "dumb" `Copy` data containers. They are produced fresh every frame
// and carry no memory of earlier frames.

/// An axis-aligned rectangle `{x0, y0, x1, y1}` with `x1 >= x0` and `y1 >= y0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl Rect {
    /// Builds a rectangle from any two opposite corners.
    pub fn new(x0: u32, y0: u32, x1: u32, y1: u32) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }

    /// Boundary-inclusive intersection test: rectangles that only share an
    /// edge or a corner still overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x0 <= other.x1 && self.y0 <= other.y1 && self.x1 >= other.x0 && self.y1 >= other.y0
    }
}

/// A single connected region of motion detected in one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blob {
    /// Bounding box of the region, as `x0 + width`, `y0 + height`.
    pub rect: Rect,
    /// Pixels enclosed by the region's outer boundary, holes included.
    /// Usually far smaller than the bounding box area for diagonal strokes.
    pub area: u32,
}
