//! Builder for declaring states.

use crate::core::{Callback, Callbacks};

/// Declaration of one state.
///
/// A state without a parent is a member of the root scope. A state becomes
/// composite as soon as another state names it as parent. Each scope needs
/// exactly one state marked [`initial`](Self::initial).
pub struct StateBuilder {
    pub(crate) name: String,
    pub(crate) parent: Option<String>,
    pub(crate) initial: bool,
    pub(crate) callbacks: Callbacks,
}

impl StateBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            initial: false,
            callbacks: Callbacks::default(),
        }
    }

    /// Nest this state under `parent`.
    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Make this state the default of its scope.
    pub fn initial(mut self) -> Self {
        self.initial = true;
        self
    }

    pub fn on_enter<F>(mut self, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.callbacks.on_enter = Some(boxed(callback));
        self
    }

    pub fn on_during<F>(mut self, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.callbacks.on_during = Some(boxed(callback));
        self
    }

    pub fn on_exit<F>(mut self, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.callbacks.on_exit = Some(boxed(callback));
        self
    }
}

impl From<&str> for StateBuilder {
    fn from(name: &str) -> Self {
        StateBuilder::new(name)
    }
}

impl From<String> for StateBuilder {
    fn from(name: String) -> Self {
        StateBuilder::new(name)
    }
}

pub(crate) fn boxed<F>(callback: F) -> Callback
where
    F: Fn() + Send + Sync + 'static,
{
    Box::new(callback)
}
