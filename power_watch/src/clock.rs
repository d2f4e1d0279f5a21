// THEORY:
// The pipeline never reads the time itself; every tick is handed a session
// timestamp, which keeps the core deterministic and testable. A `Clock` is the
// caller-side source of those timestamps, measured as elapsed time since the
// session started.
//
// A live camera wants real monotonic time. A recorded sequence of frames has no
// meaningful wall time at all, so it gets a clock that advances by one frame
// interval per call instead.

use std::time::{Duration, Instant};

/// Source of session timestamps, read once per tick.
pub trait Clock {
    fn now(&mut self) -> Duration;
}

/// Elapsed monotonic time since the clock was created.
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&mut self) -> Duration {
        self.start.elapsed()
    }
}

/// Synthetic clock for recorded footage: the n-th call returns `n / fps`.
pub struct FrameRateClock {
    frame_interval: Duration,
    frames: u32,
}

impl FrameRateClock {
    /// Returns `None` for a frame rate that is not a positive, finite number.
    pub fn new(fps: f64) -> Option<Self> {
        if !fps.is_finite() || fps <= 0.0 {
            return None;
        }
        let frame_interval = Duration::try_from_secs_f64(1.0 / fps).ok()?;
        Some(Self {
            frame_interval,
            frames: 0,
        })
    }
}

impl Clock for FrameRateClock {
    fn now(&mut self) -> Duration {
        let now = self.frame_interval * self.frames;
        self.frames += 1;
        now
    }
}
