//! View state machine with a single-slot history.
//!
//! Every forward transition first copies the current view and selection into the
//! history slot; [`Navigation::go_back`] restores from that slot without clearing
//! it, so a second `go_back` changes nothing.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::model::{Instance, View};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Navigation {
    current_view: View,
    previous_view: View,
    current_instance: Option<Arc<Instance>>,
    previous_instance: Option<Arc<Instance>>,
}

impl Navigation {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn current_view(&self) -> View {
        self.current_view
    }

    #[must_use]
    pub const fn previous_view(&self) -> View {
        self.previous_view
    }

    pub fn current_instance(&self) -> Option<&Arc<Instance>> {
        self.current_instance.as_ref()
    }

    /// Reference identity, not name equality: two instances may share a name.
    pub fn is_current(&self, instance: &Arc<Instance>) -> bool {
        self.current_instance
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, instance))
    }

    pub fn select_instance(&mut self, instance: Arc<Instance>) {
        self.remember();
        self.current_view = View::Instance;
        self.current_instance = Some(instance);
    }

    pub fn navigate_to_settings(&mut self) {
        self.remember();
        self.current_view = View::Settings;
    }

    pub fn navigate_to_welcome(&mut self) {
        self.remember();
        self.current_view = View::Welcome;
        self.current_instance = None;
    }

    pub fn go_back(&mut self) {
        self.current_view = self.previous_view;
        self.current_instance.clone_from(&self.previous_instance);
    }

    /// Whether `go_back` would change anything.
    pub fn can_go_back(&self) -> bool {
        self.current_view != self.previous_view
            || !same_instance(
                self.current_instance.as_ref(),
                self.previous_instance.as_ref(),
            )
    }

    fn remember(&mut self) {
        self.previous_view = self.current_view;
        self.previous_instance.clone_from(&self.current_instance);
    }
}

fn same_instance(a: Option<&Arc<Instance>>, b: Option<&Arc<Instance>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}
