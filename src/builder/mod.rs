//! Builder API for ergonomic state machine construction.
//!
//! This module provides fluent builders and macros for declaring a hierarchy
//! by name and validating it into a [`StateMachine`](crate::runtime::StateMachine).

pub mod error;
pub mod machine;
pub mod macros;
pub mod state;
pub mod transition;
mod validate;

pub use error::{BuildError, TopologyError};
pub use machine::StateMachineBuilder;
pub use state::StateBuilder;
pub use transition::{TransitionBuilder, TransitionDecl};

use transition::GuardDecl;

fn declare(from: impl Into<String>, to: impl Into<String>, guard: GuardDecl) -> TransitionDecl {
    TransitionDecl {
        from: from.into(),
        to: to.into(),
        guard,
        cooldown: 0.0,
        on_taken: None,
    }
}

/// Create a transition taken once `from` has been active for `exit_time`
/// seconds.
///
/// # Example
///
/// ```
/// use strata::builder::{timed_transition, StateBuilder, StateMachineBuilder};
///
/// let machine = StateMachineBuilder::new()
///     .state(StateBuilder::new("Windup").initial())
///     .state("Strike")
///     .add_transition(timed_transition("Windup", "Strike", 0.4))
///     .build();
///
/// assert!(machine.is_ok());
/// ```
pub fn timed_transition(
    from: impl Into<String>,
    to: impl Into<String>,
    exit_time: f64,
) -> TransitionDecl {
    declare(from, to, GuardDecl::Time(exit_time))
}

/// Create a transition with a condition callback.
///
/// # Example
///
/// ```
/// use strata::builder::guarded_transition;
/// use strata::core::GuardMode;
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use std::sync::Arc;
///
/// let sees_player = Arc::new(AtomicBool::new(false));
/// let probe = Arc::clone(&sees_player);
/// let transition = guarded_transition("Patrol", "Chase", move || probe.load(Ordering::Relaxed));
///
/// assert_eq!(transition.mode(), GuardMode::Condition);
/// ```
pub fn guarded_transition<F>(
    from: impl Into<String>,
    to: impl Into<String>,
    guard: F,
) -> TransitionDecl
where
    F: Fn() -> bool + Send + Sync + 'static,
{
    declare(from, to, GuardDecl::Condition(Box::new(guard)))
}

/// Create a transition taken once per raise of the signal named `signal`.
pub fn signal_transition(
    from: impl Into<String>,
    to: impl Into<String>,
    signal: impl Into<String>,
) -> TransitionDecl {
    declare(from, to, GuardDecl::Signal(signal.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FrameTime, GuardMode, DAMAGE_RECEIVED};

    #[test]
    fn timed_transition_builds() {
        let transition = timed_transition("Windup", "Strike", 0.5);

        assert_eq!(transition.from(), "Windup");
        assert_eq!(transition.to(), "Strike");
        assert_eq!(transition.mode(), GuardMode::Time);
        assert_eq!(transition.cooldown(), 0.0);
    }

    #[test]
    fn helper_transitions_drive_a_machine() {
        let mut machine = StateMachineBuilder::new()
            .state(StateBuilder::new("Idle").initial())
            .state("Alert")
            .state("Flinch")
            .transitions([
                signal_transition("Idle", "Flinch", DAMAGE_RECEIVED),
                guarded_transition("Idle", "Alert", || false),
                timed_transition("Flinch", "Idle", 0.25),
            ])
            .build()
            .unwrap();

        machine.tick(FrameTime::at(0.0));
        machine.request_signal(DAMAGE_RECEIVED);
        machine.tick(FrameTime::at(0.5));
        assert_eq!(machine.current_state_name(), Some("Flinch"));

        machine.tick(FrameTime::at(0.75));
        assert_eq!(machine.current_state_name(), Some("Idle"));
    }
}
