// The tick loop: pull a frame, stamp it, run it through the session, hand the
// result to the sinks. Stops on end of stream, on a sink asking to stop, or
// when the stop flag flips (Ctrl-C).
//
// Frames the session rejects (wrong size or no pixels) and files the source
// cannot decode are skipped and counted, never fatal.

use crate::display::{DisplaySink, SinkControl};
use crate::frame_source::FrameSource;
use anyhow::Result;
use log::{debug, info, warn};
use power_watch::clock::Clock;
use power_watch::{PowerReading, PowerWatch, PowerWatchError};
use tokio::sync::watch;

/// Totals for one run, logged when the loop ends.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub skipped: u64,
    pub power: PowerReading,
    pub energy_wh: f64,
}

pub fn run(
    session: &mut PowerWatch,
    source: &mut dyn FrameSource,
    clock: &mut dyn Clock,
    sinks: &mut [Box<dyn DisplaySink>],
    stop: &watch::Receiver<bool>,
) -> Result<RunSummary> {
    let mut frames = 0;
    let mut skipped = 0;

    'frames: loop {
        if *stop.borrow() {
            info!("stop requested after {frames} frames");
            break;
        }
        let Some(frame) = source.next_frame()? else {
            info!("frame source finished after {frames} frames");
            break;
        };
        let gray = image::imageops::grayscale(&frame);
        let now = clock.now();

        let report = match session.tick(&gray, now) {
            Ok(report) => report,
            Err(err @ (PowerWatchError::DimensionMismatch { .. } | PowerWatchError::EmptyFrame { .. })) => {
                warn!("skipping frame at {now:?}: {err}");
                skipped += 1;
                continue;
            }
            Err(err) => return Err(err.into()),
        };
        frames += 1;

        debug!(
            "t={now:.2?} triggered={} regions={} state={:?}",
            report.triggered,
            report.regions.len(),
            report.state
        );
        if let (Some(_), Some(watts)) = (report.revolution, report.power.watts) {
            info!("{watts:.1} W (revolution {})", report.power.revolutions);
        }

        for sink in sinks.iter_mut() {
            if sink.show(&frame, session.last_mask(), &report)? == SinkControl::Stop {
                info!("display closed after {frames} frames");
                break 'frames;
            }
        }
    }

    Ok(RunSummary {
        frames,
        skipped: skipped + source.skipped(),
        power: session.power(),
        energy_wh: session.energy_wh(),
    })
}
