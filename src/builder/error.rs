//! Build errors for state machine and transition builders.

use thiserror::Error;

/// Errors that can occur when building state machines and transitions.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BuildError {
    #[error("Transition source state not specified. Call .from(state)")]
    MissingFromState,

    #[error("Transition target state not specified. Call .to(state)")]
    MissingToState,

    #[error(
        "Transition guard not specified. Call .after(), .when(), .on_signal() or .on_trigger()"
    )]
    MissingGuard,

    #[error("Invalid topology ({} problem(s)): {}", .0.len(), describe(.0))]
    InvalidTopology(Vec<TopologyError>),
}

impl BuildError {
    /// Topology problems carried by this error, empty for incomplete builders.
    pub fn topology_errors(&self) -> &[TopologyError] {
        match self {
            BuildError::InvalidTopology(errors) => errors,
            _ => &[],
        }
    }
}

/// A single inconsistency in a declared hierarchy.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TopologyError {
    #[error("No states declared")]
    Empty,

    #[error("State '{0}' is declared more than once")]
    DuplicateState(String),

    #[error("State '{state}' names unknown parent '{parent}'")]
    UnknownParent { state: String, parent: String },

    #[error("State '{0}' is its own ancestor")]
    ParentCycle(String),

    #[error("Scope '{scope}' has no initial state")]
    MissingDefault { scope: String },

    #[error("Scope '{scope}' has several initial states: '{first}' and '{second}'")]
    MultipleDefaults {
        scope: String,
        first: String,
        second: String,
    },

    #[error("Transition from unknown state '{from}' to '{to}'")]
    UnknownSource { from: String, to: String },

    #[error("Transition from '{from}' to unknown state '{to}'")]
    UnknownTarget { from: String, to: String },

    #[error("Transition from '{from}' to '{to}' targets its own state")]
    SelfTransition { from: String, to: String },

    #[error("Transition from '{from}' to '{to}' crosses its own ancestry")]
    HierarchicalTransition { from: String, to: String },

    #[error("Transition from '{from}' to '{to}' waits on unknown signal '{signal}'")]
    UnknownSignal {
        from: String,
        to: String,
        signal: String,
    },

    #[error("Transition from '{from}' to '{to}' has invalid {field} {value}")]
    InvalidTiming {
        from: String,
        to: String,
        field: &'static str,
        value: f64,
    },
}

fn describe(errors: &[TopologyError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
