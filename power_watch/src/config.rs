// THEORY:
// Every tunable of the meter watcher lives in one immutable `MeterConfig` value
// that is handed to `PowerWatch::new` and never mutated afterwards. The numbers
// are calibration data for one particular meter and camera placement: the
// change threshold and blur size decide what counts as motion, the minimum blob
// area decides what counts as a real object, the debounce interval decides what
// counts as the marker having left the zone, and the watt-hours constant turns
// revolutions into energy.
//
// The struct deserializes from JSON with every field optional, so a config file
// only has to name the values that differ from the defaults.

use crate::error::{PowerWatchError, Result};
use serde::Deserialize;
use std::time::Duration;

/// Placement of the trigger zone as fractions of the frame size.
///
/// The zone has to be derived from the frame because the frame size is only
/// known once the first frame has arrived.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ZoneLayout {
    /// Left edge, as a fraction of the frame width.
    pub left: f32,
    /// Top edge, as a fraction of the frame height.
    pub top: f32,
    /// Zone width, as a fraction of the frame width.
    pub width: f32,
    /// Zone height, as a fraction of the frame height.
    pub height: f32,
}

impl Default for ZoneLayout {
    /// Middle half horizontally, one quarter tall, starting at mid-height.
    fn default() -> Self {
        Self {
            left: 0.25,
            top: 0.5,
            width: 0.5,
            height: 0.25,
        }
    }
}

impl ZoneLayout {
    fn validate(&self) -> Result<()> {
        let fractions = [self.left, self.top, self.width, self.height];
        if fractions.iter().any(|f| !f.is_finite() || *f < 0.0 || *f > 1.0) {
            return Err(PowerWatchError::InvalidConfig(format!(
                "trigger zone fractions must lie in [0, 1], got {self:?}"
            )));
        }
        if self.left + self.width > 1.0 || self.top + self.height > 1.0 {
            return Err(PowerWatchError::InvalidConfig(format!(
                "trigger zone extends past the frame: {self:?}"
            )));
        }
        Ok(())
    }
}

/// Configuration for the `PowerWatch` pipeline.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MeterConfig {
    /// Minimum absolute intensity difference (0-255) for a pixel to count as changed.
    pub change_threshold: u8,
    /// Side length of the Gaussian smoothing kernel. Must be odd; 1 disables smoothing.
    pub blur_kernel_size: u32,
    /// Number of 3x3 dilation passes applied to the thresholded difference.
    pub dilate_iterations: u32,
    /// Regions enclosing fewer pixels than this are treated as noise.
    pub min_blob_area: u32,
    /// How long the trigger zone must stay clear before the marker counts as gone.
    pub min_inside_time_secs: f64,
    /// Energy represented by one revolution of the meter disk.
    pub watt_hours_per_revolution: f64,
    pub trigger_zone: ZoneLayout,
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            change_threshold: 30,
            blur_kernel_size: 25,
            dilate_iterations: 2,
            min_blob_area: 500,
            min_inside_time_secs: 1.0,
            watt_hours_per_revolution: 7.2,
            trigger_zone: ZoneLayout::default(),
        }
    }
}

impl MeterConfig {
    /// Rejects values that would make the pipeline silently compute nonsense.
    pub fn validate(&self) -> Result<()> {
        if self.blur_kernel_size == 0 || self.blur_kernel_size % 2 == 0 {
            return Err(PowerWatchError::InvalidConfig(format!(
                "blur_kernel_size must be a positive odd number, got {}",
                self.blur_kernel_size
            )));
        }
        if Duration::try_from_secs_f64(self.min_inside_time_secs).is_err() {
            return Err(PowerWatchError::InvalidConfig(format!(
                "min_inside_time_secs must be a finite, non-negative number of seconds, got {}",
                self.min_inside_time_secs
            )));
        }
        if !self.watt_hours_per_revolution.is_finite() || self.watt_hours_per_revolution <= 0.0 {
            return Err(PowerWatchError::InvalidConfig(format!(
                "watt_hours_per_revolution must be positive, got {}",
                self.watt_hours_per_revolution
            )));
        }
        self.trigger_zone.validate()
    }

    /// The debounce interval as a `Duration`. Falls back to zero for values
    /// `validate` would have rejected.
    pub fn min_inside_time(&self) -> Duration {
        Duration::try_from_secs_f64(self.min_inside_time_secs).unwrap_or(Duration::ZERO)
    }
}
