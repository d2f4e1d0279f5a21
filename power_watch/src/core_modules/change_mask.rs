// THEORY:
// The `ChangeDetector` is the temporal layer of the meter watcher. It remembers
// exactly one reference frame and, for every new frame, answers "which pixels
// changed?" as a binary mask (0 or 255).
//
// Steps per frame:
// 1.  **Smoothing**: The frame is blurred with a large Gaussian. This is noise
//     suppression, not cosmetics: sensor grain and mains flicker move single
//     pixels by a few levels, and the blur averages that away before it can
//     cross the threshold.
// 2.  **Differencing**: Absolute difference against the blurred reference,
//     thresholded to a binary mask.
// 3.  **Dilation**: A few 3x3 max passes close the gaps along a moving edge so
//     the marker shows up as one region instead of a spray of specks.
// 4.  **Advance**: The blurred frame becomes the next reference.
//
// The first frame of a session has nothing to compare against. It only seeds
// the reference and yields an empty mask, so the seed tick can never report
// motion.

use crate::error::{PowerWatchError, Result};
use image::{GrayImage, Luma, imageops};

const MASK_ON: u8 = 255;

/// Frame-to-frame change detector holding the smoothed reference frame.
pub struct ChangeDetector {
    /// The blurred previous frame. `None` until the first frame arrives.
    reference: Option<GrayImage>,
    /// Gaussian sigma derived from the configured kernel size. `None` disables smoothing.
    sigma: Option<f32>,
    threshold: u8,
    dilate_iterations: u32,
}

impl ChangeDetector {
    /// `kernel_size` must be odd; the caller validates it through `MeterConfig`.
    pub fn new(kernel_size: u32, threshold: u8, dilate_iterations: u32) -> Self {
        Self {
            reference: None,
            sigma: sigma_for_kernel(kernel_size),
            threshold,
            dilate_iterations,
        }
    }

    /// Size of the frames this detector has locked onto, if any.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.reference.as_ref().map(|r| r.dimensions())
    }

    /// Compares `frame` against the reference and returns the change mask.
    ///
    /// A frame with no pixels, or whose size differs from the reference, is
    /// rejected and the reference is left as it was.
    pub fn update(&mut self, frame: &GrayImage) -> Result<GrayImage> {
        let (width, height) = frame.dimensions();
        if width == 0 || height == 0 {
            return Err(PowerWatchError::EmptyFrame { width, height });
        }
        if let Some(expected) = self.dimensions() {
            if frame.dimensions() != expected {
                return Err(PowerWatchError::DimensionMismatch {
                    expected,
                    found: frame.dimensions(),
                });
            }
        }

        let smoothed = match self.sigma {
            Some(sigma) => imageops::blur(frame, sigma),
            None => frame.clone(),
        };

        let mask = match &self.reference {
            Some(reference) => {
                let thresholded = threshold_difference(reference, &smoothed, self.threshold);
                dilate(thresholded, self.dilate_iterations)
            }
            None => GrayImage::new(frame.width(), frame.height()),
        };

        self.reference = Some(smoothed);
        Ok(mask)
    }
}

/// Maps an odd kernel size to the Gaussian sigma that kernel would be built
/// for: `0.3 * ((k - 1) / 2 - 1) + 0.8`. A 1x1 kernel means no smoothing.
fn sigma_for_kernel(kernel_size: u32) -> Option<f32> {
    if kernel_size <= 1 {
        return None;
    }
    let half = (kernel_size - 1) as f32 * 0.5;
    Some(0.3 * (half - 1.0) + 0.8)
}

fn threshold_difference(reference: &GrayImage, current: &GrayImage, threshold: u8) -> GrayImage {
    let mut mask = GrayImage::new(current.width(), current.height());
    for ((out, before), after) in mask.pixels_mut().zip(reference.pixels()).zip(current.pixels()) {
        if before[0].abs_diff(after[0]) > threshold {
            *out = Luma([MASK_ON]);
        }
    }
    mask
}

/// Dilation with a 3x3 square element, done as a horizontal then a vertical
/// max pass. Pixels outside the frame never contribute.
fn dilate(mut mask: GrayImage, iterations: u32) -> GrayImage {
    let (width, height) = mask.dimensions();
    if width == 0 || height == 0 {
        return mask;
    }

    for _ in 0..iterations {
        let mut horizontal = GrayImage::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let lo = x.saturating_sub(1);
                let hi = (x + 1).min(width - 1);
                let value = (lo..=hi).map(|nx| mask.get_pixel(nx, y)[0]).max().unwrap_or(0);
                horizontal.put_pixel(x, y, Luma([value]));
            }
        }

        let mut vertical = GrayImage::new(width, height);
        for y in 0..height {
            let lo = y.saturating_sub(1);
            let hi = (y + 1).min(height - 1);
            for x in 0..width {
                let value = (lo..=hi).map(|ny| horizontal.get_pixel(x, ny)[0]).max().unwrap_or(0);
                vertical.put_pixel(x, y, Luma([value]));
            }
        }
        mask = vertical;
    }
    mask
}
