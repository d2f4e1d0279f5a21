// THEORY:
// The `pipeline` module is the top-level API of the meter watcher. It owns every
// piece of mutable session state (the reference frame, the revolution state, the
// power reading) in a single `PowerWatch` value and exposes one operation,
// `tick`, which the caller invokes once per captured frame.
//
// A tick runs the whole stack synchronously:
//   change mask -> regions -> trigger zone overlap -> revolution state -> power
// and returns everything a display or logger might want about that frame.
// `tick` takes `&mut self`, so two ticks on one session can never interleave.

use crate::config::MeterConfig;
use crate::core_modules::blob::{Blob, Rect};
use crate::core_modules::change_mask::ChangeDetector;
use crate::core_modules::power_estimator::PowerEstimator;
use crate::core_modules::region_extractor::region_extractor;
use crate::core_modules::revolution::RevolutionTracker;
use crate::core_modules::trigger_zone::trigger_zone;
use crate::error::Result;
use image::GrayImage;
use log::debug;
use std::time::Duration;

// Re-export key data structures for the public API.
pub use crate::core_modules::power_estimator::PowerReading;
pub use crate::core_modules::revolution::{RevolutionEvent, RevolutionState};

/// A single grayscale camera frame.
pub type Frame = GrayImage;

/// Everything the pipeline derived from one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// Whether any motion region touched the trigger zone this frame.
    pub triggered: bool,
    /// Motion regions that survived the area filter, in no particular order.
    pub regions: Vec<Blob>,
    /// The trigger zone for this frame's dimensions.
    pub zone: Rect,
    /// Revolution state after this frame.
    pub state: RevolutionState,
    /// Power reading after this frame.
    pub power: PowerReading,
    /// Set when this frame completed a revolution.
    pub revolution: Option<RevolutionEvent>,
}

/// The main session object for watching one meter.
pub struct PowerWatch {
    config: MeterConfig,
    change_detector: ChangeDetector,
    revolution_tracker: RevolutionTracker,
    power_estimator: PowerEstimator,
    last_mask: Option<GrayImage>,
}

impl PowerWatch {
    pub fn new(config: MeterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            change_detector: ChangeDetector::new(
                config.blur_kernel_size,
                config.change_threshold,
                config.dilate_iterations,
            ),
            revolution_tracker: RevolutionTracker::new(config.min_inside_time()),
            power_estimator: PowerEstimator::new(config.watt_hours_per_revolution),
            last_mask: None,
            config,
        })
    }

    /// Processes one frame captured at session time `now`.
    ///
    /// An empty frame (`EmptyFrame`) or one whose size differs from the first
    /// frame (`DimensionMismatch`) is rejected and leaves the session untouched.
    pub fn tick(&mut self, frame: &Frame, now: Duration) -> Result<TickReport> {
        // Stage 1: Temporal change detection
        let mask = self.change_detector.update(frame)?;

        // Stage 2: Spatial grouping
        let regions = region_extractor::find_regions(&mask, self.config.min_blob_area);

        // Stage 3: Trigger zone
        let zone = trigger_zone::zone_for(&self.config.trigger_zone, frame.width(), frame.height());
        let triggered = trigger_zone::is_triggered(&zone, &regions);

        // Stage 4: Revolution counting and power
        let revolution = self.revolution_tracker.update(triggered, now);
        if let Some(event) = revolution {
            debug!("revolution event at {:?}", event.at);
            self.power_estimator.record(event.at);
        }

        self.last_mask = Some(mask);
        Ok(TickReport {
            triggered,
            regions,
            zone,
            state: self.revolution_tracker.state(),
            power: self.power_estimator.reading(),
            revolution,
        })
    }

    pub fn config(&self) -> &MeterConfig {
        &self.config
    }

    pub fn state(&self) -> RevolutionState {
        self.revolution_tracker.state()
    }

    pub fn power(&self) -> PowerReading {
        self.power_estimator.reading()
    }

    /// Energy in watt-hours represented by the revolutions counted so far.
    pub fn energy_wh(&self) -> f64 {
        self.power_estimator.energy_wh()
    }

    /// The change mask computed by the most recent successful tick.
    pub fn last_mask(&self) -> Option<&GrayImage> {
        self.last_mask.as_ref()
    }
}
