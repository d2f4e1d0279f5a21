// THEORY:
// One revolution of the meter disk is a fixed amount of energy, so the time
// between two consecutive revolutions gives the average power over that
// interval:
//
//     watts = watt_hours_per_revolution * 3600 / seconds_between_revolutions
//
// The estimate is deliberately instantaneous. It is neither smoothed nor
// averaged across revolutions; it is simply the latest interval.
//
// A non-positive interval (duplicate event, clock stepped backwards) cannot be
// turned into a power value. Such an event produces no estimate and leaves the
// last known reading alone, but it still becomes the anchor for the next
// interval so the estimator recovers on the following revolution.

use log::{info, warn};
use std::time::Duration;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Snapshot of the estimator's output.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PowerReading {
    /// Last known power draw. `None` until two revolutions have been timed.
    pub watts: Option<f64>,
    /// Session time of the most recent revolution event.
    pub last_revolution: Option<Duration>,
    /// Revolution events seen this session.
    pub revolutions: u64,
}

/// Turns revolution timestamps into power readings.
pub struct PowerEstimator {
    watt_hours_per_revolution: f64,
    reading: PowerReading,
}

impl PowerEstimator {
    pub fn new(watt_hours_per_revolution: f64) -> Self {
        Self {
            watt_hours_per_revolution,
            reading: PowerReading::default(),
        }
    }

    pub fn reading(&self) -> PowerReading {
        self.reading
    }

    /// Energy accounted for by the revolutions counted so far.
    pub fn energy_wh(&self) -> f64 {
        self.reading.revolutions as f64 * self.watt_hours_per_revolution
    }

    /// Records a revolution at `at` and returns the fresh estimate, if one
    /// could be computed.
    pub fn record(&mut self, at: Duration) -> Option<f64> {
        let previous = self.reading.last_revolution.replace(at);
        self.reading.revolutions += 1;

        let previous = previous?;
        let elapsed = match at.checked_sub(previous) {
            Some(elapsed) if !elapsed.is_zero() => elapsed,
            _ => {
                warn!(
                    "revolution at {at:?} is not after the previous one at {previous:?}, keeping last reading"
                );
                return None;
            }
        };

        let watts = self.watt_hours_per_revolution * SECONDS_PER_HOUR / elapsed.as_secs_f64();
        info!("revolution {} after {elapsed:.2?}: {watts:.1} W", self.reading.revolutions);
        self.reading.watts = Some(watts);
        Some(watts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_revolution_has_no_power() {
        let mut estimator = PowerEstimator::new(7.2);
        assert_eq!(estimator.record(Duration::from_secs(5)), None);
        let reading = estimator.reading();
        assert_eq!(reading.watts, None);
        assert_eq!(reading.last_revolution, Some(Duration::from_secs(5)));
        assert_eq!(reading.revolutions, 1);
    }

    #[test]
    fn one_revolution_per_hour_at_7_2_wh_is_7_2_watts() {
        let mut estimator = PowerEstimator::new(7.2);
        estimator.record(Duration::from_secs(100));
        assert_eq!(estimator.record(Duration::from_secs(3700)), Some(7.2));
        assert_eq!(estimator.reading().watts, Some(7.2));
    }

    #[test]
    fn each_estimate_uses_only_the_latest_interval() {
        let mut estimator = PowerEstimator::new(7.2);
        estimator.record(Duration::from_secs(0));
        assert_eq!(estimator.record(Duration::from_secs(36)), Some(720.0));
        assert_eq!(estimator.record(Duration::from_secs(54)), Some(1440.0));
        assert_eq!(estimator.reading().revolutions, 3);
    }

    #[test]
    fn duplicate_or_backwards_event_keeps_last_power() {
        let mut estimator = PowerEstimator::new(7.2);
        estimator.record(Duration::from_secs(10));
        estimator.record(Duration::from_secs(46));
        assert_eq!(estimator.reading().watts, Some(720.0));

        assert_eq!(estimator.record(Duration::from_secs(46)), None);
        assert_eq!(estimator.reading().watts, Some(720.0));

        assert_eq!(estimator.record(Duration::from_secs(20)), None);
        assert_eq!(estimator.reading().watts, Some(720.0));
        assert_eq!(estimator.reading().last_revolution, Some(Duration::from_secs(20)));

        // Recovers on the next well-ordered interval.
        assert_eq!(estimator.record(Duration::from_secs(56)), Some(720.0));
    }

    #[test]
    fn energy_counts_every_revolution() {
        let mut estimator = PowerEstimator::new(2.5);
        for second in [1, 2, 3, 4] {
            estimator.record(Duration::from_secs(second));
        }
        assert_eq!(estimator.energy_wh(), 10.0);
    }
}
