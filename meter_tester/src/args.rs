use clap::{ArgGroup, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Meter tester: drives power_watch from recorded frames or a live camera",
    long_about = "Feeds frames through the power_watch pipeline, logs every revolution and \
                  power estimate, and optionally writes annotated frames for inspection."
)]
#[command(group(ArgGroup::new("source").required(true).args(["frames", "camera"])))]
pub struct Args {
    /// Directory of still frames, processed in file name order
    #[arg(long, value_name = "DIR")]
    pub frames: Option<PathBuf>,

    /// Camera index for live capture (requires the `camera` feature)
    #[arg(long, value_name = "INDEX")]
    pub camera: Option<i32>,

    /// Frame rate used to timestamp recorded frames
    #[arg(long, default_value_t = 10.0)]
    pub fps: f64,

    /// JSON file with meter calibration and detection settings
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override the meter's watt-hours per revolution
    #[arg(long, value_name = "WH")]
    pub watt_hours_per_rev: Option<f64>,

    /// Directory to write annotated PNG frames into
    #[arg(long, value_name = "DIR")]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_source_with_defaults() {
        let args = Args::try_parse_from(["meter_tester", "--frames", "clips/meter"]).expect("valid args");
        assert_eq!(args.frames, Some(PathBuf::from("clips/meter")));
        assert_eq!(args.fps, 10.0);
        assert!(args.camera.is_none());
    }

    #[test]
    fn a_source_is_required() {
        assert!(Args::try_parse_from(["meter_tester", "--fps", "5"]).is_err());
    }

    #[test]
    fn sources_are_exclusive() {
        assert!(Args::try_parse_from(["meter_tester", "--frames", "a", "--camera", "0"]).is_err());
    }
}
