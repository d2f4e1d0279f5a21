// THEORY:
// The `RevolutionTracker` adds memory to the per-frame "triggered" boolean. The
// meter's marker sweeps through the trigger zone once per revolution, but a
// single pass lights the zone for several consecutive frames and noise can
// flicker the overlap on and off while it does. The tracker turns that noisy
// stream into one event per physical pass.
//
// States:
// - **Init**: nothing seen yet. The first trigger moves to `In` without counting,
//   because the disk could have been anywhere when the session started.
// - **In**: the marker is (or recently was) in the zone. Every triggered frame
//   re-arms the debounce timer; only when the zone has stayed clear for longer
//   than `min_inside_time` does the tracker move to `Out`.
// - **Out**: the marker has fully left. The next trigger moves back to `In` and
//   is the one and only place a revolution is counted.
//
// There is no terminal state. Time is whatever the caller passes in; a clock
// that steps backwards simply reads as "no time has passed".

use log::debug;
use std::time::Duration;

/// Where the meter's marker is relative to the trigger zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevolutionState {
    Init,
    Out,
    In,
}

/// Emitted when the marker re-enters the zone after having fully left it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevolutionEvent {
    /// Session time of the frame that re-entered the zone.
    pub at: Duration,
}

/// Debounced state machine counting marker passes through the trigger zone.
pub struct RevolutionTracker {
    state: RevolutionState,
    /// Last time the zone was seen triggered while `In`.
    last_inside: Duration,
    min_inside_time: Duration,
}

impl RevolutionTracker {
    pub fn new(min_inside_time: Duration) -> Self {
        Self {
            state: RevolutionState::Init,
            last_inside: Duration::ZERO,
            min_inside_time,
        }
    }

    pub fn state(&self) -> RevolutionState {
        self.state
    }

    /// Advances the machine by one frame.
    pub fn update(&mut self, triggered: bool, now: Duration) -> Option<RevolutionEvent> {
        match (self.state, triggered) {
            (RevolutionState::Init, true) => {
                debug!("marker seen for the first time at {now:?}, entering zone");
                self.state = RevolutionState::In;
                self.last_inside = now;
                None
            }
            (RevolutionState::In, true) => {
                self.last_inside = now;
                None
            }
            (RevolutionState::In, false) => {
                // Elapsed time saturates at zero. A backwards clock step of D
                // therefore holds the tracker in `In` for roughly D more, and no
                // revolution can be counted until the clock catches up.
                if now.saturating_sub(self.last_inside) > self.min_inside_time {
                    debug!("zone clear since {:?}, marker left at {now:?}", self.last_inside);
                    self.state = RevolutionState::Out;
                }
                None
            }
            (RevolutionState::Out, true) => {
                self.state = RevolutionState::In;
                self.last_inside = now;
                Some(RevolutionEvent { at: now })
            }
            (RevolutionState::Init, false) | (RevolutionState::Out, false) => None,
        }
    }
}
