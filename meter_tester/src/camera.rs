// Live capture and on-screen preview through OpenCV. Only built with the
// `camera` feature.
//
// Preview keys: ESC quits, `v` cycles between the annotated camera image and
// the raw change mask.

use crate::display::{DisplaySink, SinkControl, annotate};
use crate::frame_source::FrameSource;
use anyhow::{Context, Result, bail};
use image::{DynamicImage, GrayImage, RgbImage};
use opencv::{
    core::Mat,
    highgui, imgproc,
    prelude::*,
    videoio::{self, VideoCapture},
};
use power_watch::TickReport;

const WINDOW: &str = "preview";
const KEY_ESCAPE: i32 = 27;
const KEY_CYCLE_VIEW: i32 = 'v' as i32;
const KEY_WAIT_MS: i32 = 20;

pub struct CameraSource {
    capture: VideoCapture,
    frame: Mat,
}

impl CameraSource {
    pub fn open(index: i32) -> Result<Self> {
        let capture = VideoCapture::new(index, videoio::CAP_ANY)?;
        if !capture.is_opened()? {
            bail!("could not open camera {index}");
        }
        log::info!(
            "camera {index} opened at {}x{}",
            capture.get(videoio::CAP_PROP_FRAME_WIDTH)?,
            capture.get(videoio::CAP_PROP_FRAME_HEIGHT)?
        );
        Ok(Self {
            capture,
            frame: Mat::default(),
        })
    }
}

impl FrameSource for CameraSource {
    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        if !self.capture.read(&mut self.frame)? || self.frame.empty() {
            return Ok(None);
        }
        let mut rgb = Mat::default();
        imgproc::cvt_color(&self.frame, &mut rgb, imgproc::COLOR_BGR2RGB, 0)?;
        let (width, height) = (rgb.cols() as u32, rgb.rows() as u32);
        let data = rgb.data_bytes()?.to_vec();
        let image = RgbImage::from_raw(width, height, data).context("camera frame buffer does not match its size")?;
        Ok(Some(image))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Annotated,
    Mask,
}

impl View {
    fn next(self) -> Self {
        match self {
            View::Annotated => View::Mask,
            View::Mask => View::Annotated,
        }
    }
}

pub struct PreviewWindow {
    view: View,
}

impl PreviewWindow {
    pub fn open() -> Result<Self> {
        highgui::named_window(WINDOW, highgui::WINDOW_AUTOSIZE)?;
        Ok(Self { view: View::Annotated })
    }
}

impl DisplaySink for PreviewWindow {
    fn show(&mut self, frame: &RgbImage, mask: Option<&GrayImage>, report: &TickReport) -> Result<SinkControl> {
        let image = match (self.view, mask) {
            (View::Mask, Some(mask)) => DynamicImage::ImageLuma8(mask.clone()).to_rgb8(),
            _ => annotate(frame, report),
        };

        let bgr: Vec<u8> = image.pixels().flat_map(|p| [p[2], p[1], p[0]]).collect();
        let flat = Mat::from_slice(&bgr)?;
        let shaped = flat.reshape(3, image.height() as i32)?.try_clone()?;
        highgui::imshow(WINDOW, &shaped)?;

        match highgui::wait_key(KEY_WAIT_MS)? {
            KEY_ESCAPE => Ok(SinkControl::Stop),
            KEY_CYCLE_VIEW => {
                self.view = self.view.next();
                log::info!("preview now showing {:?}", self.view);
                Ok(SinkControl::Continue)
            }
            _ => Ok(SinkControl::Continue),
        }
    }
}

impl Drop for PreviewWindow {
    fn drop(&mut self) {
        let _ = highgui::destroy_window(WINDOW);
    }
}
