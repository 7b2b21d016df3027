//! Nodes of the state hierarchy.
//!
//! A state owns its lifecycle callbacks and its outgoing transitions. The
//! links to its parent, its owning scope and its child scope are indices
//! resolved once when the machine is built.

use super::clock::NEVER;
use super::transition::Transition;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle or notification callback.
pub type Callback = Box<dyn Fn() + Send + Sync>;

/// Index of a state in the machine's registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateId(pub usize);

/// Index of a scope. The root scope is always `ScopeId(0)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScopeId(pub usize);

impl ScopeId {
    pub const ROOT: ScopeId = ScopeId(0);
}

/// Optional enter, during and exit callbacks of a state.
#[derive(Default)]
pub struct Callbacks {
    pub on_enter: Option<Callback>,
    pub on_during: Option<Callback>,
    pub on_exit: Option<Callback>,
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_enter", &self.on_enter.is_some())
            .field("on_during", &self.on_during.is_some())
            .field("on_exit", &self.on_exit.is_some())
            .finish()
    }
}

/// A state of the hierarchy.
///
/// A state is composite when it owns a child scope. Entering and exiting the
/// child scope is driven by the machine; the methods here only touch the
/// state itself.
#[derive(Debug)]
pub struct State {
    name: String,
    parent: Option<StateId>,
    scope: ScopeId,
    child: Option<ScopeId>,
    transitions: Vec<Transition>,
    callbacks: Callbacks,
    enter_time: f64,
}

impl State {
    pub(crate) fn new(
        name: String,
        parent: Option<StateId>,
        scope: ScopeId,
        child: Option<ScopeId>,
        callbacks: Callbacks,
    ) -> Self {
        Self {
            name,
            parent,
            scope,
            child,
            transitions: Vec::new(),
            callbacks,
            enter_time: NEVER,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<StateId> {
        self.parent
    }

    /// The scope this state is a member of.
    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    /// The scope of this state's children, if composite.
    pub fn child(&self) -> Option<ScopeId> {
        self.child
    }

    pub fn is_composite(&self) -> bool {
        self.child.is_some()
    }

    /// Outgoing transitions in priority order.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub(crate) fn transitions_mut(&mut self) -> &mut [Transition] {
        &mut self.transitions
    }

    pub(crate) fn push_transition(&mut self, transition: Transition) {
        self.transitions.push(transition);
    }

    /// Simulation time of the most recent activation, or [`NEVER`].
    pub fn enter_time(&self) -> f64 {
        self.enter_time
    }

    pub(crate) fn set_enter_time(&mut self, enter_time: f64) {
        self.enter_time = enter_time;
    }

    /// Stamp the activation time and run `on_enter`. Children are untouched.
    pub(crate) fn enter_self(&mut self, now: f64) {
        self.enter_time = now;
        if let Some(on_enter) = &self.callbacks.on_enter {
            on_enter();
        }
    }

    pub(crate) fn during(&self) {
        if let Some(on_during) = &self.callbacks.on_during {
            on_during();
        }
    }

    pub(crate) fn exit_self(&self) {
        if let Some(on_exit) = &self.callbacks.on_exit {
            on_exit();
        }
    }
}
