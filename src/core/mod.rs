//! Core building blocks of the hierarchy.
//!
//! This module contains the data types the machine is made of:
//! - States with their lifecycle callbacks
//! - Transitions and the guards gating them
//! - Edge-latched triggers
//! - Clock values and the transition log
//!
//! The recursion over scopes lives in [`crate::runtime`].

mod clock;
mod guard;
mod history;
mod state;
mod transition;
mod trigger;

pub use clock::{elapsed, FrameTime, NEVER};
pub use guard::{Condition, Guard, GuardMode};
pub use history::{
    TransitionEffect, TransitionKind, TransitionLog, TransitionRecord, DEFAULT_LOG_CAPACITY,
};
pub use state::{Callback, Callbacks, ScopeId, State, StateId};
pub use transition::Transition;
pub use trigger::{Trigger, DAMAGE_RECEIVED};
