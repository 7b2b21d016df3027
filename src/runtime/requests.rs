//! Queue of directed transitions raised from callbacks.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

/// Cloneable handle for requesting transitions by state name.
///
/// Callbacks cannot mutate the machine that is running them. They push the
/// name of the state they want onto this queue instead, and the machine
/// executes the requests in order at the end of the current tick.
///
/// # Example
///
/// ```rust
/// use strata::runtime::TransitionRequests;
///
/// let requests = TransitionRequests::new();
/// let from_callback = requests.clone();
///
/// from_callback.request("Stunned");
///
/// assert_eq!(requests.len(), 1);
/// assert_eq!(requests.drain(), vec!["Stunned".to_string()]);
/// assert!(requests.is_empty());
/// ```
#[derive(Clone, Debug, Default)]
pub struct TransitionRequests {
    queue: Arc<Mutex<VecDeque<String>>>,
}

impl TransitionRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a transition to `state`.
    pub fn request(&self, state: impl Into<String>) {
        self.lock().push_back(state.into());
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Take every pending request, oldest first.
    pub fn drain(&self) -> Vec<String> {
        self.lock().drain(..).collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<String>> {
        // A panicking callback cannot leave the queue half-written.
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
