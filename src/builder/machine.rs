//! Builder for constructing state machines.

use crate::builder::error::{BuildError, TopologyError};
use crate::builder::state::StateBuilder;
use crate::builder::transition::{GuardDecl, TransitionBuilder, TransitionDecl};
use crate::builder::validate::{validate, Layout};
use crate::core::{Guard, ScopeId, State, StateId, Transition, Trigger, DAMAGE_RECEIVED};
use crate::runtime::{EngineConfig, Scope, StateMachine, TransitionRequests, Tree};
use std::collections::BTreeMap;

/// Builder for constructing state machines with a fluent API.
///
/// States and transitions refer to each other by name and may be declared in
/// any order. [`build`](Self::build) validates the whole topology, resolves
/// every name to an index and returns a machine that never looks names up
/// while ticking.
///
/// Every machine owns a [`DAMAGE_RECEIVED`] signal in addition to the signals
/// registered here.
pub struct StateMachineBuilder {
    states: Vec<StateBuilder>,
    transitions: Vec<TransitionDecl>,
    signals: BTreeMap<String, Trigger>,
    requests: TransitionRequests,
    config: EngineConfig,
}

impl StateMachineBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            transitions: Vec::new(),
            signals: BTreeMap::from([(DAMAGE_RECEIVED.to_string(), Trigger::new())]),
            requests: TransitionRequests::new(),
            config: EngineConfig::default(),
        }
    }

    /// Declare a state.
    pub fn state(mut self, state: impl Into<StateBuilder>) -> Self {
        self.states.push(state.into());
        self
    }

    /// Declare several states at once.
    pub fn states(mut self, states: impl IntoIterator<Item = StateBuilder>) -> Self {
        self.states.extend(states);
        self
    }

    /// Add a transition using a builder.
    /// Returns an error if the builder is incomplete.
    pub fn transition(mut self, builder: TransitionBuilder) -> Result<Self, BuildError> {
        let transition = builder.build()?;
        self.transitions.push(transition);
        Ok(self)
    }

    /// Add a pre-built transition.
    pub fn add_transition(mut self, transition: TransitionDecl) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Add multiple transitions at once.
    pub fn transitions(mut self, transitions: impl IntoIterator<Item = TransitionDecl>) -> Self {
        self.transitions.extend(transitions);
        self
    }

    /// Register a fresh signal named `name`.
    pub fn signal(self, name: impl Into<String>) -> Self {
        self.trigger(name, Trigger::new())
    }

    /// Register `trigger` as the signal named `name`, replacing any previous
    /// signal of that name.
    pub fn trigger(mut self, name: impl Into<String>, trigger: Trigger) -> Self {
        self.signals.insert(name.into(), trigger);
        self
    }

    /// Use `requests` as the machine's directed-request queue.
    pub fn requests(mut self, requests: TransitionRequests) -> Self {
        self.requests = requests;
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the state machine.
    /// Returns every topology problem found if the declaration is invalid.
    pub fn build(self) -> Result<StateMachine, BuildError> {
        let result = self.assemble();
        if let Err(error) = &result {
            for problem in error.topology_errors() {
                tracing::error!(%problem, "invalid state machine topology");
            }
        }
        result
    }

    fn assemble(self) -> Result<StateMachine, BuildError> {
        let layout = validate(&self.states, &self.transitions, &self.signals)
            .map_err(BuildError::InvalidTopology)?;

        let composite = layout.has_children();
        let mut scopes = vec![Scope::new(None)];
        let child_scopes: Vec<Option<ScopeId>> = composite
            .iter()
            .enumerate()
            .map(|(position, is_composite)| {
                is_composite.then(|| {
                    scopes.push(Scope::new(Some(StateId(position))));
                    ScopeId(scopes.len() - 1)
                })
            })
            .collect();

        let mut states = Vec::with_capacity(self.states.len());
        for (position, declared) in self.states.into_iter().enumerate() {
            let parent = layout.parents[position];
            let scope = parent
                .and_then(|parent| child_scopes[parent])
                .unwrap_or(ScopeId::ROOT);
            let id = StateId(position);

            scopes[scope.0].push_member(id);
            if declared.initial {
                scopes[scope.0].set_default(id);
            }
            states.push(State::new(
                declared.name,
                parent.map(StateId),
                scope,
                child_scopes[position],
                declared.callbacks,
            ));
        }

        let transition_count = self.transitions.len();
        for declared in self.transitions {
            let (source, transition) = resolve_transition(declared, &layout, &self.signals)?;
            states[source].push_transition(transition);
        }

        tracing::debug!(
            states = states.len(),
            scopes = scopes.len(),
            transitions = transition_count,
            "built state machine"
        );

        Ok(StateMachine::new(
            Tree::new(states, scopes),
            self.signals,
            self.requests,
            self.config,
        ))
    }
}

fn resolve_transition(
    declared: TransitionDecl,
    layout: &Layout,
    signals: &BTreeMap<String, Trigger>,
) -> Result<(usize, Transition), BuildError> {
    let unresolved = |error: TopologyError| BuildError::InvalidTopology(vec![error]);
    let source = layout.index.get(&declared.from).copied().ok_or_else(|| {
        unresolved(TopologyError::UnknownSource {
            from: declared.from.clone(),
            to: declared.to.clone(),
        })
    })?;
    let target = layout.index.get(&declared.to).copied().ok_or_else(|| {
        unresolved(TopologyError::UnknownTarget {
            from: declared.from.clone(),
            to: declared.to.clone(),
        })
    })?;

    let guard = match declared.guard {
        GuardDecl::Time(exit_time) => Guard::after(exit_time),
        GuardDecl::Condition(condition) => Guard::Condition(condition),
        GuardDecl::Trigger(trigger) => Guard::on(trigger),
        GuardDecl::Signal(signal) => {
            let trigger = signals.get(&signal).cloned().ok_or_else(|| {
                unresolved(TopologyError::UnknownSignal {
                    from: declared.from.clone(),
                    to: declared.to.clone(),
                    signal: signal.clone(),
                })
            })?;
            Guard::on(trigger)
        }
    };

    let transition = Transition::new(StateId(target), guard)
        .with_cooldown(declared.cooldown)
        .with_on_taken(declared.on_taken);
    Ok((source, transition))
}

impl Default for StateMachineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
