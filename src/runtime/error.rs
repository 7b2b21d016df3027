//! Errors of directed operations on a running machine.

use thiserror::Error;

/// Errors returned by directed transition requests.
///
/// Queries never fail; they answer unknown names with a neutral value.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    #[error("Unknown state '{0}'")]
    UnknownState(String),

    #[error("State machine has not been started. Call .start() or .tick() first")]
    NotStarted,
}
