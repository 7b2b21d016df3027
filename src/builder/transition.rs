//! Builder for constructing state transitions.

use crate::builder::error::BuildError;
use crate::builder::state::boxed;
use crate::core::{Callback, Condition, GuardMode, Trigger};

/// Guard as declared, before signal names are resolved.
pub(crate) enum GuardDecl {
    Time(f64),
    Condition(Condition),
    Signal(String),
    Trigger(Trigger),
}

impl GuardDecl {
    fn mode(&self) -> GuardMode {
        match self {
            GuardDecl::Time(_) => GuardMode::Time,
            GuardDecl::Condition(_) => GuardMode::Condition,
            GuardDecl::Signal(_) | GuardDecl::Trigger(_) => GuardMode::Signal,
        }
    }
}

/// A complete transition declaration, referring to states by name.
///
/// Names are resolved when the machine is built.
pub struct TransitionDecl {
    pub(crate) from: String,
    pub(crate) to: String,
    pub(crate) guard: GuardDecl,
    pub(crate) cooldown: f64,
    pub(crate) on_taken: Option<Callback>,
}

impl TransitionDecl {
    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn mode(&self) -> GuardMode {
        self.guard.mode()
    }

    pub fn cooldown(&self) -> f64 {
        self.cooldown
    }
}

/// Builder for constructing transitions with a fluent API.
///
/// A transition needs a source, a target and exactly one guard; setting a
/// second guard replaces the first.
#[derive(Default)]
pub struct TransitionBuilder {
    from: Option<String>,
    to: Option<String>,
    guard: Option<GuardDecl>,
    cooldown: f64,
    on_taken: Option<Callback>,
}

impl TransitionBuilder {
    /// Create a new transition builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the source state (required).
    pub fn from(mut self, state: impl Into<String>) -> Self {
        self.from = Some(state.into());
        self
    }

    /// Set the target state (required).
    pub fn to(mut self, state: impl Into<String>) -> Self {
        self.to = Some(state.into());
        self
    }

    /// Pass once the source has been active for `exit_time` seconds.
    pub fn after(mut self, exit_time: f64) -> Self {
        self.guard = Some(GuardDecl::Time(exit_time));
        self
    }

    /// Pass while `condition` returns true.
    pub fn when<F>(mut self, condition: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.guard = Some(GuardDecl::Condition(Box::new(condition)));
        self
    }

    /// Pass once per raise of the machine's signal named `signal`.
    pub fn on_signal(mut self, signal: impl Into<String>) -> Self {
        self.guard = Some(GuardDecl::Signal(signal.into()));
        self
    }

    /// Pass once per raise of `trigger`.
    pub fn on_trigger(mut self, trigger: Trigger) -> Self {
        self.guard = Some(GuardDecl::Trigger(trigger));
        self
    }

    /// Minimum simulation time between two takes.
    pub fn cooldown(mut self, seconds: f64) -> Self {
        self.cooldown = seconds;
        self
    }

    /// Run `callback` each time the transition is taken, before any state is
    /// exited.
    pub fn on_taken<F>(mut self, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_taken = Some(boxed(callback));
        self
    }

    /// Build the transition declaration.
    pub fn build(self) -> Result<TransitionDecl, BuildError> {
        let from = self.from.ok_or(BuildError::MissingFromState)?;
        let to = self.to.ok_or(BuildError::MissingToState)?;
        let guard = self.guard.ok_or(BuildError::MissingGuard)?;

        Ok(TransitionDecl {
            from,
            to,
            guard,
            cooldown: self.cooldown,
            on_taken: self.on_taken,
        })
    }
}
