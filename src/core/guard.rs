//! Guards gating transitions.
//!
//! A guard is one of three modes: a minimum time spent in the source state, a
//! condition callback, or a trigger that must have been raised.

use super::clock::elapsed;
use super::trigger::Trigger;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Condition callback of a [`Guard::Condition`].
pub type Condition = Box<dyn Fn() -> bool + Send + Sync>;

/// Discriminant of a [`Guard`], for reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardMode {
    Time,
    Condition,
    Signal,
}

/// Predicate that decides whether a transition may fire.
///
/// # Example
///
/// ```rust
/// use strata::core::{Guard, Trigger};
///
/// let settle = Guard::after(0.5);
/// assert!(!settle.check(1.25, 1.0));
/// assert!(settle.check(1.5, 1.0));
///
/// let hit = Trigger::new();
/// let on_hit = Guard::on(hit.clone());
/// hit.set();
/// assert!(on_hit.check(0.0, 0.0));
/// assert!(!on_hit.check(0.0, 0.0));
/// ```
pub enum Guard {
    /// Passes once the source state has been active for `exit_time` seconds.
    Time { exit_time: f64 },
    /// Passes while the callback returns true.
    Condition(Condition),
    /// Passes once per raise of the trigger.
    Signal(Trigger),
}

impl Guard {
    /// Time guard.
    pub fn after(exit_time: f64) -> Self {
        Guard::Time { exit_time }
    }

    /// Condition guard.
    pub fn when<F>(condition: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        Guard::Condition(Box::new(condition))
    }

    /// Signal guard.
    pub fn on(trigger: Trigger) -> Self {
        Guard::Signal(trigger)
    }

    pub fn mode(&self) -> GuardMode {
        match self {
            Guard::Time { .. } => GuardMode::Time,
            Guard::Condition(_) => GuardMode::Condition,
            Guard::Signal(_) => GuardMode::Signal,
        }
    }

    /// Evaluate the guard at simulation time `now` for a source state that
    /// was entered at `entered_at`.
    ///
    /// A signal guard consumes its trigger when it passes.
    pub fn check(&self, now: f64, entered_at: f64) -> bool {
        match self {
            Guard::Time { exit_time } => elapsed(now, entered_at) >= *exit_time,
            Guard::Condition(condition) => condition(),
            Guard::Signal(trigger) => trigger.get(),
        }
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Guard::Time { exit_time } => f
                .debug_struct("Time")
                .field("exit_time", exit_time)
                .finish(),
            Guard::Condition(_) => f.write_str("Condition(..)"),
            Guard::Signal(trigger) => f.debug_tuple("Signal").field(&trigger.peek()).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn time_guard_passes_exactly_at_exit_time() {
        let guard = Guard::after(2.0);

        assert!(!guard.check(11.999, 10.0));
        assert!(guard.check(12.0, 10.0));
        assert!(guard.check(15.0, 10.0));
    }

    #[test]
    fn zero_exit_time_passes_immediately() {
        let guard = Guard::after(0.0);
        assert!(guard.check(3.0, 3.0));
    }

    #[test]
    fn condition_guard_follows_callback() {
        let flag = Arc::new(AtomicBool::new(false));
        let observed = Arc::clone(&flag);
        let guard = Guard::when(move || observed.load(Ordering::Relaxed));

        assert!(!guard.check(0.0, 0.0));
        flag.store(true, Ordering::Relaxed);
        assert!(guard.check(0.0, 0.0));
        assert!(guard.check(0.0, 0.0));
    }

    #[test]
    fn signal_guard_consumes_trigger() {
        let trigger = Trigger::new();
        let guard = Guard::on(trigger.clone());

        assert!(!guard.check(0.0, 0.0));
        trigger.set();
        assert!(guard.check(0.0, 0.0));
        assert!(!guard.check(0.0, 0.0));
        assert!(!trigger.peek());
    }

    #[test]
    fn mode_matches_variant() {
        assert_eq!(Guard::after(1.0).mode(), GuardMode::Time);
        assert_eq!(Guard::when(|| true).mode(), GuardMode::Condition);
        assert_eq!(Guard::on(Trigger::new()).mode(), GuardMode::Signal);
    }
}
