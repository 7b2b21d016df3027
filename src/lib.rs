//! Strata: a hierarchical finite state machine engine
//!
//! A machine is a tree of named states. Composite states own a child scope
//! whose members are mutually exclusive, and every scope remembers its last
//! active member. The machine is driven by an external clock: each
//! [`tick`](runtime::StateMachine::tick) runs the during callbacks of the
//! active chain, then takes at most one guarded transition, searching from
//! the outermost scope inwards.
//!
//! # Core Concepts
//!
//! - **Trigger**: A shared edge-triggered flag, consumed when a signal
//!   transition reads it
//! - **Guard**: Time, condition or signal gate on a transition
//! - **Scope**: The members of a composite state and the one currently active
//! - **Re-entry**: Transitions exit and re-enter only below the common
//!   ancestor of source and target
//!
//! # Example
//!
//! ```rust
//! use strata::{FrameTime, StateBuilder, StateMachineBuilder, TransitionBuilder, DAMAGE_RECEIVED};
//!
//! let mut machine = StateMachineBuilder::new()
//!     .state(StateBuilder::new("Grounded").initial())
//!     .state(StateBuilder::new("Idle").parent("Grounded").initial())
//!     .state(StateBuilder::new("Run").parent("Grounded"))
//!     .state("Stagger")
//!     .transition(TransitionBuilder::new().from("Idle").to("Run").after(0.5))
//!     .unwrap()
//!     .transition(
//!         TransitionBuilder::new()
//!             .from("Grounded")
//!             .to("Stagger")
//!             .on_signal(DAMAGE_RECEIVED),
//!     )
//!     .unwrap()
//!     .transition(TransitionBuilder::new().from("Stagger").to("Grounded").after(1.0))
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! machine.tick(FrameTime::at(0.0));
//! assert_eq!(machine.active_path(), vec!["Grounded", "Idle"]);
//!
//! machine.tick(FrameTime::at(0.5));
//! assert_eq!(machine.current_state_name(), Some("Run"));
//!
//! machine.request_signal(DAMAGE_RECEIVED);
//! machine.tick(FrameTime::at(0.6));
//! assert!(machine.is_state_active("Stagger"));
//! assert!(machine.is_state_remembered("Run"));
//!
//! // Grounded resumes its remembered member.
//! machine.tick(FrameTime::at(1.6));
//! assert_eq!(machine.active_path(), vec!["Grounded", "Run"]);
//! ```

pub mod builder;
pub mod checkpoint;
pub mod core;
pub mod runtime;

// Re-export commonly used types
pub use builder::{BuildError, StateBuilder, StateMachineBuilder, TransitionBuilder};
pub use checkpoint::{CheckpointError, Snapshot};
pub use core::{FrameTime, GuardMode, TransitionEffect, Trigger, DAMAGE_RECEIVED, NEVER};
pub use runtime::{EngineConfig, EngineError, StateMachine, TickReport, TransitionRequests};
