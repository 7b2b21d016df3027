//! Directed edges between states.

use super::clock::{elapsed, FrameTime, NEVER};
use super::guard::{Guard, GuardMode};
use super::state::{Callback, StateId};
use std::fmt;

/// An outgoing edge of a state.
///
/// The source is implicit: a transition is stored in the transition list of
/// the state it leaves. Besides its guard, a transition carries a cooldown
/// measured on the simulation clock from the moment it was last taken.
pub struct Transition {
    target: StateId,
    guard: Guard,
    cooldown: f64,
    last_taken: f64,
    last_taken_unscaled: f64,
    on_taken: Option<Callback>,
}

impl Transition {
    /// Create a never-taken transition with no cooldown.
    pub fn new(target: StateId, guard: Guard) -> Self {
        Self {
            target,
            guard,
            cooldown: 0.0,
            last_taken: NEVER,
            last_taken_unscaled: NEVER,
            on_taken: None,
        }
    }

    pub fn with_cooldown(mut self, cooldown: f64) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_on_taken(mut self, on_taken: Option<Callback>) -> Self {
        self.on_taken = on_taken;
        self
    }

    pub fn target(&self) -> StateId {
        self.target
    }

    pub fn guard(&self) -> &Guard {
        &self.guard
    }

    pub fn mode(&self) -> GuardMode {
        self.guard.mode()
    }

    pub fn cooldown(&self) -> f64 {
        self.cooldown
    }

    /// Simulation time this transition was last taken, or [`NEVER`].
    pub fn last_taken(&self) -> f64 {
        self.last_taken
    }

    /// Unscaled time this transition was last taken, or [`NEVER`].
    pub fn last_taken_unscaled(&self) -> f64 {
        self.last_taken_unscaled
    }

    /// True while the cooldown since the last take has not elapsed.
    pub fn is_cooling_down(&self, now: f64) -> bool {
        elapsed(now, self.last_taken) < self.cooldown
    }

    /// Evaluate the transition for a source entered at `entered_at`.
    ///
    /// The cooldown is tested first; a cooling-down signal transition leaves
    /// its trigger raised.
    pub fn is_passable(&self, now: f64, entered_at: f64) -> bool {
        !self.is_cooling_down(now) && self.guard.check(now, entered_at)
    }

    /// Fire the taken notification, then stamp both clocks.
    pub(crate) fn take(&mut self, frame: FrameTime) {
        if let Some(on_taken) = &self.on_taken {
            on_taken();
        }
        self.last_taken = frame.time;
        self.last_taken_unscaled = frame.unscaled;
    }

    pub(crate) fn restore_stamps(&mut self, last_taken: f64, last_taken_unscaled: f64) {
        self.last_taken = last_taken;
        self.last_taken_unscaled = last_taken_unscaled;
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("target", &self.target)
            .field("guard", &self.guard)
            .field("cooldown", &self.cooldown)
            .field("last_taken", &self.last_taken)
            .field("last_taken_unscaled", &self.last_taken_unscaled)
            .field("on_taken", &self.on_taken.is_some())
            .finish()
    }
}
