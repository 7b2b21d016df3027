//! Runtime settings of a state machine.

use crate::core::DEFAULT_LOG_CAPACITY;
use serde::{Deserialize, Serialize};

/// Settings applied when a machine is built.
///
/// Every field has a default, so a partial JSON object is a valid config.
///
/// # Example
///
/// ```rust
/// use strata::runtime::EngineConfig;
///
/// let config: EngineConfig = serde_json::from_str(r#"{ "log_capacity": 8 }"#).unwrap();
/// assert_eq!(config.log_capacity, 8);
/// assert!(config.warn_on_clock_regression);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of executed transitions kept in the machine's log.
    pub log_capacity: usize,

    /// Log a warning when a tick's clocks run backwards.
    pub warn_on_clock_regression: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_capacity: DEFAULT_LOG_CAPACITY,
            warn_on_clock_regression: true,
        }
    }
}
