//! The running state machine.
//!
//! This module holds the tick-driven side of the crate: the machine that owns
//! the hierarchy, the scope recursion it delegates to, the queue callbacks use
//! to request transitions and the settings applied at build time.
//!
//! Everything here runs synchronously on the caller's thread. Callbacks are
//! invoked in place and must not call back into the machine; they raise
//! triggers or queue requests instead.

mod config;
mod error;
mod machine;
mod requests;
mod scope;

pub use config::EngineConfig;
pub use error::EngineError;
pub use machine::{Phase, StateMachine, TickReport};
pub use requests::TransitionRequests;
pub use scope::Scope;

pub(crate) use scope::Tree;
