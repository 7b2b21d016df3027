//! Scopes and the recursion over them.
//!
//! A scope is the set of mutually exclusive siblings under one parent (or
//! under the root). Its `current` member is the active one while the scope is
//! active and the remembered one afterwards: exiting never clears it, so the
//! next plain enter resumes the last active member. Only entry along a
//! transition path reassigns it.
//!
//! Enter runs outside-in, exit runs inside-out, and the guard check scans
//! outer levels before inner ones.

use crate::core::{ScopeId, State, StateId, TransitionEffect};

/// Mutually exclusive siblings sharing one parent.
#[derive(Clone, Debug)]
pub struct Scope {
    owner: Option<StateId>,
    members: Vec<StateId>,
    current: Option<StateId>,
    default: Option<StateId>,
}

impl Scope {
    pub(crate) fn new(owner: Option<StateId>) -> Self {
        Self {
            owner,
            members: Vec::new(),
            current: None,
            default: None,
        }
    }

    /// The composite state owning this scope, `None` for the root scope.
    pub fn owner(&self) -> Option<StateId> {
        self.owner
    }

    pub fn members(&self) -> &[StateId] {
        &self.members
    }

    /// Active member, or the remembered one while the scope is inactive.
    pub fn current(&self) -> Option<StateId> {
        self.current
    }

    pub fn default(&self) -> Option<StateId> {
        self.default
    }

    /// The member the next plain enter activates.
    pub fn resume_target(&self) -> Option<StateId> {
        self.current.or(self.default)
    }

    pub(crate) fn push_member(&mut self, member: StateId) {
        self.members.push(member);
    }

    pub(crate) fn set_default(&mut self, default: StateId) {
        self.default = Some(default);
    }

    pub(crate) fn set_current(&mut self, current: Option<StateId>) {
        self.current = current;
    }
}

/// Every state and scope of a machine, addressed by index.
#[derive(Debug)]
pub(crate) struct Tree {
    states: Vec<State>,
    scopes: Vec<Scope>,
}

impl Tree {
    pub(crate) fn new(states: Vec<State>, scopes: Vec<Scope>) -> Self {
        Self { states, scopes }
    }

    pub(crate) fn state(&self, id: StateId) -> &State {
        &self.states[id.0]
    }

    pub(crate) fn state_mut(&mut self, id: StateId) -> &mut State {
        &mut self.states[id.0]
    }

    pub(crate) fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    pub(crate) fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.0]
    }

    pub(crate) fn states(&self) -> &[State] {
        &self.states
    }

    pub(crate) fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    /// Enter the scope's remembered member, or its default.
    pub(crate) fn enter_scope(&mut self, scope: ScopeId, now: f64) {
        let Some(member) = self.scope(scope).resume_target() else {
            tracing::error!(
                scope = scope.0,
                owner = self.owner_name(scope),
                "scope has no default state; leaving it inactive"
            );
            return;
        };
        self.scope_mut(scope).set_current(Some(member));
        self.enter_state(member, now);
    }

    /// Enter a state and, recursively, its child scope.
    pub(crate) fn enter_state(&mut self, id: StateId, now: f64) {
        tracing::trace!(state = self.state(id).name(), now, "enter");
        self.state_mut(id).enter_self(now);
        if let Some(child) = self.state(id).child() {
            self.enter_scope(child, now);
        }
    }

    /// Run the during callbacks along the active chain, outermost first.
    pub(crate) fn update_scope(&self, scope: ScopeId) {
        let Some(current) = self.scope(scope).current() else {
            return;
        };
        let state = self.state(current);
        state.during();
        if let Some(child) = state.child() {
            self.update_scope(child);
        }
    }

    /// Exit the scope's active chain, innermost first. `current` is kept as
    /// history.
    pub(crate) fn exit_scope(&self, scope: ScopeId) {
        if let Some(current) = self.scope(scope).current() {
            self.exit_state(current);
        }
    }

    fn exit_state(&self, id: StateId) {
        let state = self.state(id);
        if let Some(child) = state.child() {
            self.exit_scope(child);
        }
        tracing::trace!(state = state.name(), "exit");
        state.exit_self();
    }

    /// Find the first passable transition on the active chain.
    ///
    /// The current member's own transitions are scanned in declaration order
    /// before its child scope is consulted, so an ancestor's transition always
    /// wins over a descendant's. Returns the source state and the index of
    /// the transition in its list.
    pub(crate) fn check_scope(&self, scope: ScopeId, now: f64) -> Option<(StateId, usize)> {
        let current = self.scope(scope).current()?;
        let state = self.state(current);
        let entered_at = state.enter_time();
        if let Some(index) = state
            .transitions()
            .iter()
            .position(|transition| transition.is_passable(now, entered_at))
        {
            return Some((current, index));
        }
        state.child().and_then(|child| self.check_scope(child, now))
    }

    /// Move the scope onto `path`, a stack whose top is the next state to
    /// match in this scope and whose bottom is the target.
    ///
    /// States shared by the active chain and the path are consumed without
    /// being exited or entered. At the first level where they differ, the
    /// active chain is exited and the rest of the path is entered.
    pub(crate) fn transition_scope(
        &mut self,
        scope: ScopeId,
        path: &mut Vec<StateId>,
        now: f64,
    ) -> TransitionEffect {
        let Some(&next) = path.last() else {
            return TransitionEffect::AlreadyActive;
        };
        debug_assert_eq!(
            self.state(next).scope(),
            scope,
            "transition path left the scope hierarchy"
        );

        if self.scope(scope).current() == Some(next) {
            path.pop();
            match self.state(next).child() {
                Some(child) if !path.is_empty() => self.transition_scope(child, path, now),
                _ => TransitionEffect::AlreadyActive,
            }
        } else {
            self.exit_scope(scope);
            self.enter_path(scope, path, now);
            TransitionEffect::Applied
        }
    }

    fn enter_path(&mut self, scope: ScopeId, path: &mut Vec<StateId>, now: f64) {
        let Some(next) = path.pop() else {
            return;
        };
        self.scope_mut(scope).set_current(Some(next));
        tracing::trace!(state = self.state(next).name(), now, "enter");
        self.state_mut(next).enter_self(now);

        if let Some(child) = self.state(next).child() {
            if path.is_empty() {
                self.enter_scope(child, now);
            } else {
                self.enter_path(child, path, now);
            }
        }
    }

    /// Path from `target` up to its root-most ancestor. The last element is
    /// the root-most ancestor, so popping walks downwards.
    pub(crate) fn path_to(&self, target: StateId) -> Vec<StateId> {
        let mut path = vec![target];
        let mut cursor = self.state(target).parent();
        while let Some(ancestor) = cursor {
            path.push(ancestor);
            cursor = self.state(ancestor).parent();
        }
        path
    }

    /// Active states from the root downwards.
    pub(crate) fn active_chain(&self) -> Vec<StateId> {
        let mut chain = Vec::new();
        let mut scope = Some(ScopeId::ROOT);
        while let Some(id) = scope {
            let Some(current) = self.scope(id).current() else {
                break;
            };
            chain.push(current);
            scope = self.state(current).child();
        }
        chain
    }

    pub(crate) fn active_leaf(&self) -> Option<StateId> {
        self.active_chain().last().copied()
    }

    pub(crate) fn is_active(&self, id: StateId) -> bool {
        self.active_chain().contains(&id)
    }

    pub(crate) fn is_remembered(&self, id: StateId) -> bool {
        self.scope(self.state(id).scope()).resume_target() == Some(id)
    }

    fn owner_name(&self, scope: ScopeId) -> &str {
        self.scope(scope)
            .owner()
            .map_or("<root>", |owner| self.state(owner).name())
    }
}
