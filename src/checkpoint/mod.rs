//! Snapshots of a machine's activation state.
//!
//! A snapshot captures everything that changes while a machine ticks: the
//! current member of every scope, activation times, transition stamps, raised
//! signals, the clocks and the transition log. It does not capture the
//! topology or any callback. Restoring therefore needs a machine built from
//! the same declaration, and it runs no callbacks.
//!
//! Timestamps that were never set are stored as `None` so that every encoding
//! can represent them.

use crate::core::{FrameTime, ScopeId, StateId, TransitionLog, NEVER};
use crate::runtime::{Phase, StateMachine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub mod error;

pub use error::CheckpointError;

/// Version identifier for snapshot format
pub const SNAPSHOT_VERSION: u32 = 1;

/// Current member of one scope.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScopeSnapshot {
    /// Owning composite state, `None` for the root scope.
    pub owner: Option<String>,
    pub current: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub name: String,
    pub entered_at: Option<f64>,
}

/// Stamps of the `index`-th transition of state `from`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionSnapshot {
    pub from: String,
    pub to: String,
    pub index: usize,
    pub last_taken: Option<f64>,
    pub last_taken_unscaled: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignalSnapshot {
    pub name: String,
    pub raised: bool,
}

/// Serializable snapshot of a machine's activation state.
/// Does NOT include callbacks or guards (not serializable).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snapshot {
    /// Snapshot format version
    pub version: u32,

    /// Unique snapshot identifier
    pub id: String,

    /// Wall-clock time the snapshot was taken
    pub timestamp: DateTime<Utc>,

    pub phase: Phase,

    /// Simulation clock of the latest frame
    pub time: Option<f64>,

    /// Unscaled clock of the latest frame
    pub unscaled: Option<f64>,

    pub scopes: Vec<ScopeSnapshot>,
    pub states: Vec<StateSnapshot>,
    pub transitions: Vec<TransitionSnapshot>,
    pub signals: Vec<SignalSnapshot>,

    /// Transition log at the time of the snapshot
    pub history: TransitionLog,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string(self).map_err(|e| CheckpointError::Encode(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        let snapshot: Snapshot =
            serde_json::from_str(json).map_err(|e| CheckpointError::Decode(e.to_string()))?;
        snapshot.check_version()?;
        Ok(snapshot)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::Encode(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let snapshot: Snapshot =
            bincode::deserialize(bytes).map_err(|e| CheckpointError::Decode(e.to_string()))?;
        snapshot.check_version()?;
        Ok(snapshot)
    }

    fn check_version(&self) -> Result<(), CheckpointError> {
        if self.version == SNAPSHOT_VERSION {
            Ok(())
        } else {
            Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: SNAPSHOT_VERSION,
            })
        }
    }
}

fn stored(timestamp: f64) -> Option<f64> {
    timestamp.is_finite().then_some(timestamp)
}

fn loaded(timestamp: Option<f64>) -> f64 {
    timestamp.unwrap_or(NEVER)
}

/// Restoration plan, fully resolved before anything is mutated.
struct Plan {
    currents: Vec<(ScopeId, Option<StateId>)>,
    enter_times: Vec<(StateId, f64)>,
    stamps: Vec<(StateId, usize, f64, f64)>,
    signals: Vec<(String, bool)>,
}

impl StateMachine {
    /// Capture the activation state.
    pub fn snapshot(&self) -> Snapshot {
        let tree = self.tree();
        let name = |id: StateId| tree.state(id).name().to_string();

        let scopes = tree
            .scopes()
            .iter()
            .map(|scope| ScopeSnapshot {
                owner: scope.owner().map(name),
                current: scope.current().map(name),
            })
            .collect();

        let states = tree
            .states()
            .iter()
            .map(|state| StateSnapshot {
                name: state.name().to_string(),
                entered_at: stored(state.enter_time()),
            })
            .collect();

        let transitions = tree
            .states()
            .iter()
            .flat_map(|state| {
                state
                    .transitions()
                    .iter()
                    .enumerate()
                    .map(move |(index, transition)| (state, index, transition))
            })
            .map(|(state, index, transition)| TransitionSnapshot {
                from: state.name().to_string(),
                to: name(transition.target()),
                index,
                last_taken: stored(transition.last_taken()),
                last_taken_unscaled: stored(transition.last_taken_unscaled()),
            })
            .collect();

        let signals = self
            .triggers()
            .iter()
            .map(|(name, trigger)| SignalSnapshot {
                name: name.clone(),
                raised: trigger.peek(),
            })
            .collect();

        let frame = self.frame();
        Snapshot {
            version: SNAPSHOT_VERSION,
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            phase: self.phase(),
            time: stored(frame.time),
            unscaled: stored(frame.unscaled),
            scopes,
            states,
            transitions,
            signals,
            history: self.history().clone(),
        }
    }

    /// Overwrite the activation state with `snapshot`.
    ///
    /// Fails without modifying the machine if the snapshot names states,
    /// scopes, transitions or signals this machine does not have, or if a
    /// running snapshot leaves an active level without a current member.
    /// The restored log is bounded by this machine's configured capacity.
    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<(), CheckpointError> {
        snapshot.check_version()?;
        let plan = self.plan(snapshot)?;

        let tree = self.tree_mut();
        for (scope, current) in plan.currents {
            tree.scope_mut(scope).set_current(current);
        }
        for (state, enter_time) in plan.enter_times {
            tree.state_mut(state).set_enter_time(enter_time);
        }
        for (state, index, last_taken, last_taken_unscaled) in plan.stamps {
            tree.state_mut(state).transitions_mut()[index]
                .restore_stamps(last_taken, last_taken_unscaled);
        }
        for (name, raised) in plan.signals {
            if let Some(trigger) = self.trigger(&name) {
                if raised {
                    trigger.set();
                } else {
                    trigger.reset();
                }
            }
        }

        let frame = FrameTime::new(loaded(snapshot.time), loaded(snapshot.unscaled));
        let history = snapshot.history.with_capacity(self.config().log_capacity);
        self.restore_runtime(snapshot.phase, frame, history);
        tracing::debug!(id = %snapshot.id, phase = ?snapshot.phase, "restored snapshot");
        Ok(())
    }

    fn plan(&self, snapshot: &Snapshot) -> Result<Plan, CheckpointError> {
        let tree = self.tree();
        let mut problems = Vec::new();
        let mut plan = Plan {
            currents: Vec::new(),
            enter_times: Vec::new(),
            stamps: Vec::new(),
            signals: Vec::new(),
        };

        if snapshot.scopes.len() != tree.scopes().len() {
            problems.push(format!(
                "snapshot has {} scopes, machine has {}",
                snapshot.scopes.len(),
                tree.scopes().len()
            ));
        }
        if snapshot.states.len() != tree.states().len() {
            problems.push(format!(
                "snapshot has {} states, machine has {}",
                snapshot.states.len(),
                tree.states().len()
            ));
        }

        for scope in &snapshot.scopes {
            let id = match &scope.owner {
                None => Some(ScopeId::ROOT),
                Some(owner) => self.state(owner).and_then(|state| state.child()),
            };
            let Some(id) = id else {
                problems.push(format!(
                    "no scope owned by '{}'",
                    scope.owner.as_deref().unwrap_or_default()
                ));
                continue;
            };
            let current = match &scope.current {
                None => None,
                Some(current) => match self.state_id(current) {
                    Some(member) if tree.scope(id).members().contains(&member) => Some(member),
                    _ => {
                        problems.push(format!("'{current}' is not a member of its scope"));
                        continue;
                    }
                },
            };
            plan.currents.push((id, current));
        }

        for state in &snapshot.states {
            match self.state_id(&state.name) {
                Some(id) => plan.enter_times.push((id, loaded(state.entered_at))),
                None => problems.push(format!("unknown state '{}'", state.name)),
            }
        }

        for stamp in &snapshot.transitions {
            let matching = self.state_id(&stamp.from).filter(|source| {
                let transitions = tree.state(*source).transitions();
                transitions
                    .get(stamp.index)
                    .is_some_and(|transition| tree.state(transition.target()).name() == stamp.to)
            });
            match matching {
                Some(source) => plan.stamps.push((
                    source,
                    stamp.index,
                    loaded(stamp.last_taken),
                    loaded(stamp.last_taken_unscaled),
                )),
                None => problems.push(format!(
                    "no transition #{} from '{}' to '{}'",
                    stamp.index, stamp.from, stamp.to
                )),
            }
        }

        for signal in &snapshot.signals {
            if self.trigger(&signal.name).is_some() {
                plan.signals.push((signal.name.clone(), signal.raised));
            } else {
                problems.push(format!("unknown signal '{}'", signal.name));
            }
        }

        if snapshot.phase == Phase::Running {
            let currents: HashMap<ScopeId, Option<StateId>> =
                plan.currents.iter().copied().collect();
            let mut scope = Some(ScopeId::ROOT);
            while let Some(id) = scope {
                match currents.get(&id).copied().flatten() {
                    Some(current) => scope = tree.state(current).child(),
                    None => {
                        let owner = tree
                            .scope(id)
                            .owner()
                            .map_or("<root>", |owner| tree.state(owner).name());
                        problems.push(format!(
                            "running snapshot has no active member in the scope of '{owner}'"
                        ));
                        break;
                    }
                }
            }
        }

        if problems.is_empty() {
            Ok(plan)
        } else {
            Err(CheckpointError::TopologyMismatch(problems))
        }
    }
}
