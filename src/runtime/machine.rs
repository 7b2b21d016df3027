//! The state machine driving a hierarchy of scopes.

use crate::core::{
    elapsed, FrameTime, ScopeId, State, StateId, TransitionEffect, TransitionKind, TransitionLog,
    TransitionRecord, Trigger, NEVER,
};
use crate::runtime::config::EngineConfig;
use crate::runtime::error::EngineError;
use crate::runtime::requests::TransitionRequests;
use crate::runtime::scope::{Scope, Tree};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Lifecycle of the machine itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Built but never entered.
    Uninitialized,
    /// Every active composite level has an active member.
    Running,
}

/// What happened during one tick.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TickReport {
    /// The machine was entered for the first time by this tick.
    pub started: bool,
    /// The guarded transition taken this tick, if any.
    pub taken: Option<TransitionRecord>,
    /// Transitions requested by callbacks and executed this tick.
    pub directed: Vec<TransitionRecord>,
}

impl TickReport {
    /// True if any transition changed the active chain. Requests for a
    /// state that was already active do not count.
    pub fn transitioned(&self) -> bool {
        self.taken
            .iter()
            .chain(&self.directed)
            .any(|record| record.effect == TransitionEffect::Applied)
    }
}

/// A hierarchical state machine.
///
/// The topology (states, scopes, transitions, callbacks) is fixed when the
/// machine is built with [`crate::builder::StateMachineBuilder`]. What changes
/// from tick to tick is the activation state: the current member of every
/// scope, activation timestamps, transition stamps and trigger flags.
///
/// Each [`tick`](Self::tick) runs the during callbacks along the active chain,
/// then looks for the first passable transition, scanning outer levels before
/// inner ones, and takes at most one. Moving to a target exits and re-enters
/// only the states below the point where the active chain and the target's
/// ancestry diverge.
///
/// # Example
///
/// ```rust
/// use strata::builder::{StateBuilder, StateMachineBuilder, TransitionBuilder};
/// use strata::core::FrameTime;
///
/// let mut machine = StateMachineBuilder::new()
///     .state(StateBuilder::new("Idle").initial())
///     .state(StateBuilder::new("Patrol"))
///     .transition(TransitionBuilder::new().from("Idle").to("Patrol").after(2.0))
///     .unwrap()
///     .build()
///     .unwrap();
///
/// machine.tick(FrameTime::at(0.0));
/// assert_eq!(machine.current_state_name(), Some("Idle"));
///
/// machine.tick(FrameTime::at(2.0));
/// assert!(machine.is_state_active("Patrol"));
/// ```
#[derive(Debug)]
pub struct StateMachine {
    tree: Tree,
    names: HashMap<String, StateId>,
    triggers: BTreeMap<String, Trigger>,
    requests: TransitionRequests,
    config: EngineConfig,
    phase: Phase,
    frame: FrameTime,
    history: TransitionLog,
}

impl StateMachine {
    pub(crate) fn new(
        tree: Tree,
        triggers: BTreeMap<String, Trigger>,
        requests: TransitionRequests,
        config: EngineConfig,
    ) -> Self {
        let names = tree
            .states()
            .iter()
            .enumerate()
            .map(|(index, state)| (state.name().to_string(), StateId(index)))
            .collect();
        let history = TransitionLog::new(config.log_capacity);
        Self {
            tree,
            names,
            triggers,
            requests,
            config,
            phase: Phase::Uninitialized,
            frame: FrameTime::never(),
            history,
        }
    }

    /// Enter the machine through the default (or remembered) chain.
    ///
    /// Returns false if the machine was already running.
    pub fn start(&mut self, frame: FrameTime) -> bool {
        if self.is_running() {
            return false;
        }
        self.advance_clock(frame);
        self.activate();
        true
    }

    /// Advance the machine by one step.
    ///
    /// The first tick starts the machine. Then the during callbacks run
    /// outermost first, the first passable transition (if any) fires its
    /// notification, is stamped and executed, and finally the transitions
    /// queued on [`requests`](Self::requests) are executed in order. Requests
    /// queued while those run wait for the next tick.
    pub fn tick(&mut self, frame: FrameTime) -> TickReport {
        self.advance_clock(frame);

        let mut report = TickReport::default();
        if !self.is_running() {
            self.activate();
            report.started = true;
        }

        self.tree.update_scope(ScopeId::ROOT);

        if let Some((source, index)) = self.tree.check_scope(ScopeId::ROOT, self.frame.time) {
            report.taken = Some(self.take(source, index));
        }

        for name in self.requests.drain() {
            match self.names.get(&name).copied() {
                Some(target) => report
                    .directed
                    .push(self.execute(target, TransitionKind::Directed)),
                None => {
                    tracing::warn!(state = %name, "ignoring transition request for unknown state")
                }
            }
        }

        report
    }

    /// Move to `state` immediately, outside of a tick.
    pub fn transition_to(
        &mut self,
        state: impl AsRef<str>,
    ) -> Result<TransitionEffect, EngineError> {
        let name = state.as_ref();
        let target = self
            .state_id(name)
            .ok_or_else(|| EngineError::UnknownState(name.to_string()))?;
        if !self.is_running() {
            return Err(EngineError::NotStarted);
        }
        Ok(self.execute(target, TransitionKind::Directed).effect)
    }

    /// Raise the named trigger. Returns false if no trigger has that name.
    pub fn request_signal(&self, signal: impl AsRef<str>) -> bool {
        match self.triggers.get(signal.as_ref()) {
            Some(trigger) => {
                trigger.set();
                true
            }
            None => false,
        }
    }

    /// Handle of the named trigger.
    pub fn trigger(&self, signal: impl AsRef<str>) -> Option<Trigger> {
        self.triggers.get(signal.as_ref()).cloned()
    }

    /// Names of all registered triggers, sorted.
    pub fn signal_names(&self) -> impl Iterator<Item = &str> {
        self.triggers.keys().map(String::as_str)
    }

    /// Handle of the queue callbacks use to request transitions.
    pub fn requests(&self) -> TransitionRequests {
        self.requests.clone()
    }

    /// True if `state` is on the active chain. Unknown names are inactive.
    pub fn is_state_active(&self, state: impl AsRef<str>) -> bool {
        self.state_id(state.as_ref())
            .is_some_and(|id| self.tree.is_active(id))
    }

    /// True if `state` is what its scope would resume on the next plain
    /// enter: the scope's current member, or its default when nothing was
    /// entered yet. Unknown names are not remembered.
    pub fn is_state_remembered(&self, state: impl AsRef<str>) -> bool {
        self.state_id(state.as_ref())
            .is_some_and(|id| self.tree.is_remembered(id))
    }

    /// Unscaled time the transition from `from` to `to` was last taken.
    ///
    /// Returns [`NEVER`] if there is no such transition or it was never
    /// taken.
    pub fn transition_last_time(&self, from: impl AsRef<str>, to: impl AsRef<str>) -> f64 {
        let (Some(from), Some(to)) = (self.state_id(from.as_ref()), self.state_id(to.as_ref()))
        else {
            return NEVER;
        };
        self.tree
            .state(from)
            .transitions()
            .iter()
            .find(|transition| transition.target() == to)
            .map_or(NEVER, |transition| transition.last_taken_unscaled())
    }

    /// Name of the innermost active state.
    pub fn current_state_name(&self) -> Option<&str> {
        self.tree
            .active_leaf()
            .map(|leaf| self.tree.state(leaf).name())
    }

    /// Simulation time spent in the innermost active state.
    pub fn time_in_current_state(&self) -> Option<f64> {
        self.tree
            .active_leaf()
            .map(|leaf| elapsed(self.frame.time, self.tree.state(leaf).enter_time()))
    }

    /// Simulation time spent in `state`, if it is active.
    pub fn time_in_state(&self, state: impl AsRef<str>) -> Option<f64> {
        let id = self.state_id(state.as_ref())?;
        self.tree
            .is_active(id)
            .then(|| elapsed(self.frame.time, self.tree.state(id).enter_time()))
    }

    /// Names along the active chain, outermost first.
    pub fn active_path(&self) -> Vec<&str> {
        self.tree
            .active_chain()
            .into_iter()
            .map(|id| self.tree.state(id).name())
            .collect()
    }

    /// Names of all states in declaration order.
    pub fn state_names(&self) -> impl Iterator<Item = &str> {
        self.tree.states().iter().map(State::name)
    }

    pub fn state_id(&self, state: &str) -> Option<StateId> {
        self.names.get(state).copied()
    }

    pub fn state(&self, state: impl AsRef<str>) -> Option<&State> {
        self.state_id(state.as_ref()).map(|id| self.tree.state(id))
    }

    /// The scope that owns `state` as a member.
    pub fn scope_of(&self, state: impl AsRef<str>) -> Option<&Scope> {
        self.state(state)
            .map(|state| self.tree.scope(state.scope()))
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    /// Simulation time of the latest frame.
    pub fn now(&self) -> f64 {
        self.frame.time
    }

    pub fn frame(&self) -> FrameTime {
        self.frame
    }

    /// Log of executed transitions.
    pub fn history(&self) -> &TransitionLog {
        &self.history
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub(crate) fn tree(&self) -> &Tree {
        &self.tree
    }

    pub(crate) fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    pub(crate) fn triggers(&self) -> &BTreeMap<String, Trigger> {
        &self.triggers
    }

    pub(crate) fn restore_runtime(
        &mut self,
        phase: Phase,
        frame: FrameTime,
        history: TransitionLog,
    ) {
        self.phase = phase;
        self.frame = frame;
        self.history = history;
    }

    fn advance_clock(&mut self, frame: FrameTime) {
        if self.config.warn_on_clock_regression && self.is_running() && frame.precedes(&self.frame)
        {
            tracing::warn!(
                previous = self.frame.time,
                time = frame.time,
                previous_unscaled = self.frame.unscaled,
                unscaled = frame.unscaled,
                "clock ran backwards"
            );
        }
        self.frame = frame;
    }

    fn activate(&mut self) {
        tracing::debug!(now = self.frame.time, "starting state machine");
        self.phase = Phase::Running;
        self.tree.enter_scope(ScopeId::ROOT, self.frame.time);
    }

    fn take(&mut self, source: StateId, index: usize) -> TransitionRecord {
        let frame = self.frame;
        let transition = &mut self.tree.state_mut(source).transitions_mut()[index];
        let target = transition.target();
        transition.take(frame);
        self.execute(target, TransitionKind::Guarded)
    }

    fn execute(&mut self, target: StateId, kind: TransitionKind) -> TransitionRecord {
        let from = self.current_state_name().unwrap_or_default().to_string();
        let mut path = self.tree.path_to(target);
        let effect = self
            .tree
            .transition_scope(ScopeId::ROOT, &mut path, self.frame.time);
        let to = self.tree.state(target).name().to_string();

        match effect {
            TransitionEffect::Applied => {
                tracing::debug!(%from, %to, ?kind, now = self.frame.time, "transition");
            }
            TransitionEffect::AlreadyActive => {
                tracing::debug!(%from, %to, ?kind, "transition target already active");
            }
        }

        let record = TransitionRecord {
            from,
            to,
            kind,
            effect,
            time: self.frame.time,
            unscaled: self.frame.unscaled,
        };
        self.history.record(record.clone());
        record
    }
}
