//! Edge-latched signals usable as transition guards.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Name of the damage signal every state machine owns.
pub const DAMAGE_RECEIVED: &str = "damage_received";

/// A consume-once boolean signal.
///
/// `set` raises the flag; `get` reads it and clears it in the same step, so a
/// raised trigger is observed by exactly one read. Raising an already raised
/// trigger has no further effect: no count is kept.
///
/// Triggers are handles. Cloning shares the flag, which lets a callback keep a
/// clone and raise the signal the machine is guarding on.
///
/// # Example
///
/// ```rust
/// use strata::core::Trigger;
///
/// let jump = Trigger::new();
/// let pressed = jump.clone();
///
/// pressed.set();
/// pressed.set();
///
/// assert!(jump.get());
/// assert!(!jump.get());
/// ```
#[derive(Clone, Debug, Default)]
pub struct Trigger {
    flag: Arc<AtomicBool>,
}

impl Trigger {
    /// Create a lowered trigger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the trigger.
    pub fn set(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Read the trigger and lower it.
    pub fn get(&self) -> bool {
        self.flag.swap(false, Ordering::Relaxed)
    }

    /// Read the trigger without consuming it.
    pub fn peek(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Lower the trigger without reading it.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::Relaxed);
    }

    /// True if both handles share one flag.
    pub fn same_as(&self, other: &Trigger) -> bool {
        Arc::ptr_eq(&self.flag, &other.flag)
    }
}
