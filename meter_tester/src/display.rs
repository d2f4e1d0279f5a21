// Display sinks render a tick's result on top of the captured frame: motion
// regions in green and the trigger zone in red while triggered, blue otherwise.

use anyhow::{Context, Result};
use image::{GrayImage, Rgb, RgbImage};
use power_watch::TickReport;
use power_watch::core_modules::blob::Rect;
use std::path::PathBuf;

pub const REGION_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
pub const ZONE_TRIGGERED_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
pub const ZONE_IDLE_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
const LINE_THICKNESS: u32 = 2;

/// What the tick loop should do after a frame has been shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkControl {
    Continue,
    Stop,
}

pub trait DisplaySink {
    fn show(&mut self, frame: &RgbImage, mask: Option<&GrayImage>, report: &TickReport) -> Result<SinkControl>;
}

/// Copy of `frame` with the regions and trigger zone drawn on it.
pub fn annotate(frame: &RgbImage, report: &TickReport) -> RgbImage {
    let mut annotated = frame.clone();
    for region in &report.regions {
        draw_outline(&mut annotated, &region.rect, REGION_COLOR);
    }
    let zone_color = if report.triggered {
        ZONE_TRIGGERED_COLOR
    } else {
        ZONE_IDLE_COLOR
    };
    draw_outline(&mut annotated, &report.zone, zone_color);
    annotated
}

/// Draws the border of `rect`, corners inclusive, clipped to the image.
pub fn draw_outline(image: &mut RgbImage, rect: &Rect, color: Rgb<u8>) {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 || rect.x0 >= width || rect.y0 >= height {
        return;
    }
    let x1 = rect.x1.min(width - 1);
    let y1 = rect.y1.min(height - 1);

    for t in 0..LINE_THICKNESS {
        for x in rect.x0..=x1 {
            for y in [rect.y0 + t, rect.y1.saturating_sub(t)] {
                if y < height {
                    image.put_pixel(x, y, color);
                }
            }
        }
        for y in rect.y0..=y1 {
            for x in [rect.x0 + t, rect.x1.saturating_sub(t)] {
                if x < width {
                    image.put_pixel(x, y, color);
                }
            }
        }
    }
}

/// Writes every annotated frame as `frame_NNNNNN.png` into a directory.
pub struct PngSink {
    dir: PathBuf,
    written: u64,
}

impl PngSink {
    pub fn create(dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&dir).with_context(|| format!("creating output directory {}", dir.display()))?;
        Ok(Self { dir, written: 0 })
    }
}

impl DisplaySink for PngSink {
    fn show(&mut self, frame: &RgbImage, _mask: Option<&GrayImage>, report: &TickReport) -> Result<SinkControl> {
        let path = self.dir.join(format!("frame_{:06}.png", self.written));
        annotate(frame, report)
            .save(&path)
            .with_context(|| format!("writing {}", path.display()))?;
        self.written += 1;
        Ok(SinkControl::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use power_watch::core_modules::blob::Blob;
    use power_watch::{PowerReading, RevolutionState};

    fn report(triggered: bool, regions: Vec<Blob>) -> TickReport {
        TickReport {
            triggered,
            regions,
            zone: Rect::new(10, 10, 30, 20),
            state: RevolutionState::Init,
            power: PowerReading::default(),
            revolution: None,
        }
    }

    #[test]
    fn zone_color_follows_trigger() {
        let frame = RgbImage::new(40, 40);
        let idle = annotate(&frame, &report(false, Vec::new()));
        assert_eq!(idle.get_pixel(10, 15), &ZONE_IDLE_COLOR);
        let hot = annotate(&frame, &report(true, Vec::new()));
        assert_eq!(hot.get_pixel(30, 15), &ZONE_TRIGGERED_COLOR);
        // Interior stays untouched.
        assert_eq!(hot.get_pixel(20, 15), &Rgb([0, 0, 0]));
    }

    #[test]
    fn regions_are_outlined_and_clipped() {
        let frame = RgbImage::new(40, 40);
        let region = Blob {
            rect: Rect::new(0, 30, 60, 60),
            area: 900,
        };
        let annotated = annotate(&frame, &report(false, vec![region]));
        assert_eq!(annotated.get_pixel(0, 35), &REGION_COLOR);
        assert_eq!(annotated.get_pixel(25, 30), &REGION_COLOR);
        assert_eq!(annotated.get_pixel(25, 35), &Rgb([0, 0, 0]));
    }

    #[test]
    fn png_sink_numbers_its_frames() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut sink = PngSink::create(dir.path().join("out")).expect("sink");
        let frame = RgbImage::new(40, 40);
        for _ in 0..2 {
            assert_eq!(
                sink.show(&frame, None, &report(false, Vec::new())).expect("write"),
                SinkControl::Continue
            );
        }
        assert!(dir.path().join("out/frame_000000.png").is_file());
        assert!(dir.path().join("out/frame_000001.png").is_file());
    }
}
