//! Topology validation.
//!
//! Checks are accumulated with `Validation` so a broken topology reports
//! every problem of a stage at once. Stages run in order because later
//! checks need the earlier ones to hold: names must be unique before parents
//! can be resolved, and parent links must be acyclic before ancestry can be
//! walked.

use crate::builder::error::TopologyError;
use crate::builder::state::StateBuilder;
use crate::builder::transition::{GuardDecl, TransitionDecl};
use crate::core::Trigger;
use std::collections::{BTreeMap, HashMap, HashSet};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Check = Validation<(), NonEmptyVec<TopologyError>>;

/// Resolved name table of a valid topology.
#[derive(Debug)]
pub(crate) struct Layout {
    pub(crate) index: HashMap<String, usize>,
    pub(crate) parents: Vec<Option<usize>>,
}

impl Layout {
    /// True if `ancestor` is a strict ancestor of `state`.
    pub(crate) fn is_ancestor(&self, ancestor: usize, state: usize) -> bool {
        let mut cursor = self.parents[state];
        while let Some(parent) = cursor {
            if parent == ancestor {
                return true;
            }
            cursor = self.parents[parent];
        }
        false
    }

    pub(crate) fn has_children(&self) -> Vec<bool> {
        let mut composite = vec![false; self.parents.len()];
        for parent in self.parents.iter().flatten() {
            composite[*parent] = true;
        }
        composite
    }
}

/// Validate a declared topology.
pub(crate) fn validate(
    states: &[StateBuilder],
    transitions: &[TransitionDecl],
    signals: &BTreeMap<String, Trigger>,
) -> Result<Layout, Vec<TopologyError>> {
    check_names(states)?;
    let layout = resolve(states);
    check_acyclic(states, &layout)?;
    check_scopes(states, &layout)?;
    check_transitions(transitions, signals, &layout)?;
    Ok(layout)
}

fn check(ok: bool, error: impl FnOnce() -> TopologyError) -> Check {
    if ok {
        Validation::success(())
    } else {
        Validation::fail(error())
    }
}

fn collect(checks: Vec<Check>) -> Result<(), Vec<TopologyError>> {
    match Validation::all_vec(checks) {
        Validation::Success(_) => Ok(()),
        Validation::Failure(errors) => Err(errors.iter().cloned().collect()),
    }
}

fn check_names(states: &[StateBuilder]) -> Result<(), Vec<TopologyError>> {
    if states.is_empty() {
        return Err(vec![TopologyError::Empty]);
    }

    let declared: HashSet<&str> = states.iter().map(|state| state.name.as_str()).collect();
    let mut seen = HashSet::new();
    let mut checks = Vec::new();

    for state in states {
        checks.push(check(seen.insert(state.name.as_str()), || {
            TopologyError::DuplicateState(state.name.clone())
        }));
        if let Some(parent) = &state.parent {
            checks.push(check(declared.contains(parent.as_str()), || {
                TopologyError::UnknownParent {
                    state: state.name.clone(),
                    parent: parent.clone(),
                }
            }));
        }
    }

    collect(checks)
}

fn resolve(states: &[StateBuilder]) -> Layout {
    let index: HashMap<String, usize> = states
        .iter()
        .enumerate()
        .map(|(position, state)| (state.name.clone(), position))
        .collect();
    let parents = states
        .iter()
        .map(|state| {
            state
                .parent
                .as_ref()
                .and_then(|parent| index.get(parent).copied())
        })
        .collect();
    Layout { index, parents }
}

fn check_acyclic(states: &[StateBuilder], layout: &Layout) -> Result<(), Vec<TopologyError>> {
    let limit = states.len();
    let checks = states
        .iter()
        .enumerate()
        .map(|(position, state)| {
            // States hanging below a cycle never meet themselves; the cycle's
            // members are reported instead.
            let mut cursor = layout.parents[position];
            let mut in_cycle = false;
            for _ in 0..limit {
                match cursor {
                    Some(parent) if parent == position => {
                        in_cycle = true;
                        break;
                    }
                    Some(parent) => cursor = layout.parents[parent],
                    None => break,
                }
            }
            check(!in_cycle, || TopologyError::ParentCycle(state.name.clone()))
        })
        .collect();
    collect(checks)
}

fn check_scopes(states: &[StateBuilder], layout: &Layout) -> Result<(), Vec<TopologyError>> {
    let composite = layout.has_children();
    let scope_name = |owner: Option<usize>| {
        owner.map_or_else(|| "<root>".to_string(), |owner| states[owner].name.clone())
    };

    // Scope owners in declaration order: the root first, then composites.
    let owners = std::iter::once(None).chain(
        composite
            .iter()
            .enumerate()
            .filter(|(_, is_composite)| **is_composite)
            .map(|(position, _)| Some(position)),
    );

    let checks = owners
        .map(|owner| {
            let initials: Vec<&StateBuilder> = states
                .iter()
                .zip(&layout.parents)
                .filter(|(state, parent)| **parent == owner && state.initial)
                .map(|(state, _)| state)
                .collect();
            match initials.as_slice() {
                [] => Validation::fail(TopologyError::MissingDefault {
                    scope: scope_name(owner),
                }),
                [_] => Validation::success(()),
                [first, second, ..] => Validation::fail(TopologyError::MultipleDefaults {
                    scope: scope_name(owner),
                    first: first.name.clone(),
                    second: second.name.clone(),
                }),
            }
        })
        .collect();
    collect(checks)
}

fn check_transitions(
    transitions: &[TransitionDecl],
    signals: &BTreeMap<String, Trigger>,
    layout: &Layout,
) -> Result<(), Vec<TopologyError>> {
    let mut checks: Vec<Check> = Vec::new();

    for transition in transitions {
        let from = transition.from.clone();
        let to = transition.to.clone();
        let source = layout.index.get(&transition.from).copied();
        let target = layout.index.get(&transition.to).copied();

        checks.push(check(source.is_some(), || TopologyError::UnknownSource {
            from: from.clone(),
            to: to.clone(),
        }));
        checks.push(check(target.is_some(), || TopologyError::UnknownTarget {
            from: from.clone(),
            to: to.clone(),
        }));

        if let (Some(source), Some(target)) = (source, target) {
            if source == target {
                checks.push(Validation::fail(TopologyError::SelfTransition {
                    from: from.clone(),
                    to: to.clone(),
                }));
            } else {
                let related =
                    layout.is_ancestor(source, target) || layout.is_ancestor(target, source);
                checks.push(check(!related, || TopologyError::HierarchicalTransition {
                    from: from.clone(),
                    to: to.clone(),
                }));
            }
        }

        if let GuardDecl::Signal(signal) = &transition.guard {
            checks.push(check(signals.contains_key(signal), || {
                TopologyError::UnknownSignal {
                    from: from.clone(),
                    to: to.clone(),
                    signal: signal.clone(),
                }
            }));
        }
        if let GuardDecl::Time(exit_time) = transition.guard {
            checks.push(check(is_duration(exit_time), || {
                TopologyError::InvalidTiming {
                    from: from.clone(),
                    to: to.clone(),
                    field: "exit time",
                    value: exit_time,
                }
            }));
        }
        checks.push(check(is_duration(transition.cooldown), || {
            TopologyError::InvalidTiming {
                from: from.clone(),
                to: to.clone(),
                field: "cooldown",
                value: transition.cooldown,
            }
        }));
    }

    collect(checks)
}

fn is_duration(seconds: f64) -> bool {
    seconds >= 0.0
}
