//! Clock values supplied by the host loop.

use serde::{Deserialize, Serialize};

/// Timestamp of something that has not happened yet.
///
/// Elapsed time measured from `NEVER` is infinite, so a transition that was
/// never taken is never cooling down.
pub const NEVER: f64 = f64::NEG_INFINITY;

/// The two clocks of one simulation step, in seconds.
///
/// `time` is the simulation clock (affected by pausing and time scaling) and
/// drives activation timestamps, exit times and cooldowns. `unscaled` is the
/// real clock; the machine only stamps it on taken transitions.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameTime {
    /// Simulation clock.
    pub time: f64,
    /// Unscaled clock.
    pub unscaled: f64,
}

impl FrameTime {
    pub fn new(time: f64, unscaled: f64) -> Self {
        Self { time, unscaled }
    }

    /// A frame where both clocks read the same value.
    pub fn at(time: f64) -> Self {
        Self::new(time, time)
    }

    /// The clocks before the first frame.
    pub fn never() -> Self {
        Self::new(NEVER, NEVER)
    }

    /// True if either clock runs backwards relative to `previous`.
    pub fn precedes(&self, previous: &FrameTime) -> bool {
        self.time < previous.time || self.unscaled < previous.unscaled
    }
}

/// Seconds elapsed between `since` and `now`.
pub fn elapsed(now: f64, since: f64) -> f64 {
    now - since
}
