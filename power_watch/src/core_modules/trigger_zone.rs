// THEORY:
// The trigger zone is the strip of the frame the meter's marker sweeps through
// once per revolution. It is placed by fractions of the frame size because the
// frame size is only known once the camera delivers its first image.
//
// Per frame the question is a single boolean: does any surviving blob touch the
// zone? The scan stops at the first hit and reads the blobs without mutating
// anything, so the answer does not depend on the order regions were found in.

use crate::config::ZoneLayout;
use crate::core_modules::blob::{Blob, Rect};

pub mod trigger_zone {
    use super::*;

    /// Places the zone inside a `frame_width` x `frame_height` frame.
    pub fn zone_for(layout: &ZoneLayout, frame_width: u32, frame_height: u32) -> Rect {
        let x0 = (frame_width as f32 * layout.left) as u32;
        let y0 = (frame_height as f32 * layout.top) as u32;
        let x1 = x0 + (frame_width as f32 * layout.width) as u32;
        let y1 = y0 + (frame_height as f32 * layout.height) as u32;
        Rect::new(x0, y0, x1.min(frame_width), y1.min(frame_height))
    }

    /// True when at least one blob overlaps the zone.
    pub fn is_triggered(zone: &Rect, blobs: &[Blob]) -> bool {
        blobs.iter().any(|blob| blob.rect.overlaps(zone))
    }
}
