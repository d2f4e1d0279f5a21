// meter_tester: drives the power_watch pipeline from a directory of recorded
// frames or, with the `camera` feature, from a live camera with a preview
// window. Logging goes through env_logger (RUST_LOG, default `info`).
//
// The tick loop is blocking and runs on tokio's blocking pool; the async side
// only waits for Ctrl-C and flips a watch channel the loop checks between
// frames.

mod args;
#[cfg(feature = "camera")]
mod camera;
mod display;
mod frame_source;
mod runner;

use anyhow::{Context, Result, anyhow, bail};
use args::Args;
use clap::Parser;
use display::{DisplaySink, PngSink};
use frame_source::{DirectorySource, FrameSource};
use log::info;
use power_watch::clock::{Clock, FrameRateClock};
use power_watch::{MeterConfig, PowerWatch};
use std::path::Path;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_config(args.config.as_deref(), args.watt_hours_per_rev)?;
    info!(
        "meter calibrated at {} Wh/rev, debounce {}s, min blob area {} px",
        config.watt_hours_per_revolution, config.min_inside_time_secs, config.min_blob_area
    );
    let session = PowerWatch::new(config).context("invalid meter configuration")?;

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, finishing current frame");
            let _ = stop_tx.send(true);
        }
    });

    let summary = tokio::task::spawn_blocking(move || run_from_args(args, session, stop_rx))
        .await
        .context("tick loop panicked")??;

    match summary.power.watts {
        Some(watts) => info!(
            "processed {} frames ({} skipped), {} revolutions, {:.2} Wh, last reading {watts:.1} W",
            summary.frames, summary.skipped, summary.power.revolutions, summary.energy_wh
        ),
        None => info!(
            "processed {} frames ({} skipped), {} revolutions, not enough revolutions for a power reading",
            summary.frames, summary.skipped, summary.power.revolutions
        ),
    }
    Ok(())
}

fn load_config(path: Option<&Path>, watt_hours_per_rev: Option<f64>) -> Result<MeterConfig> {
    let mut config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?
        }
        None => MeterConfig::default(),
    };
    if let Some(wh) = watt_hours_per_rev {
        config.watt_hours_per_revolution = wh;
    }
    Ok(config)
}

fn run_from_args(args: Args, mut session: PowerWatch, stop: watch::Receiver<bool>) -> Result<runner::RunSummary> {
    let mut sinks: Vec<Box<dyn DisplaySink>> = Vec::new();
    if let Some(dir) = args.output.clone() {
        sinks.push(Box::new(PngSink::create(dir)?));
    }

    let (mut source, mut clock): (Box<dyn FrameSource>, Box<dyn Clock>) = match (&args.frames, args.camera) {
        (Some(dir), _) => {
            let clock = FrameRateClock::new(args.fps).ok_or_else(|| anyhow!("--fps must be positive, got {}", args.fps))?;
            let source: Box<dyn FrameSource> = Box::new(DirectorySource::open(dir)?);
            let clock: Box<dyn Clock> = Box::new(clock);
            (source, clock)
        }
        (None, Some(index)) => open_camera(index, &mut sinks)?,
        (None, None) => bail!("no frame source given"),
    };

    runner::run(&mut session, source.as_mut(), clock.as_mut(), &mut sinks, &stop)
}

#[cfg(feature = "camera")]
fn open_camera(index: i32, sinks: &mut Vec<Box<dyn DisplaySink>>) -> Result<(Box<dyn FrameSource>, Box<dyn Clock>)> {
    sinks.push(Box::new(camera::PreviewWindow::open()?));
    let source: Box<dyn FrameSource> = Box::new(camera::CameraSource::open(index)?);
    let clock: Box<dyn Clock> = Box::new(power_watch::clock::MonotonicClock::new());
    Ok((source, clock))
}

#[cfg(not(feature = "camera"))]
fn open_camera(_index: i32, _sinks: &mut Vec<Box<dyn DisplaySink>>) -> Result<(Box<dyn FrameSource>, Box<dyn Clock>)> {
    Err(anyhow!("meter_tester was built without the `camera` feature"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_a_config_file() {
        let config = load_config(None, None).expect("defaults");
        assert_eq!(config, MeterConfig::default());
    }

    #[test]
    fn config_file_and_override_combine() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("meter.json");
        std::fs::write(&path, r#"{ "min_blob_area": 800, "watt_hours_per_revolution": 3.0 }"#).expect("write");
        let config = load_config(Some(&path), Some(1.25)).expect("config");
        assert_eq!(config.min_blob_area, 800);
        assert_eq!(config.watt_hours_per_revolution, 1.25);
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("meter.json");
        std::fs::write(&path, "{ not json").expect("write");
        assert!(load_config(Some(&path), None).is_err());
    }
}
