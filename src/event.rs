use std::sync::Arc;

use crate::model::Instance;

/// Synchronous UI intents. Anything that needs the backend goes through
/// [`crate::store::InstanceStore`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    SelectInstance(Arc<Instance>),
    NavigateToSettings,
    NavigateToWelcome,
    GoBack,

    // Modal
    ToggleAddInstanceModal,
    OpenAddInstanceModal,
    CloseAddInstanceModal,
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SelectInstance(_) => "select_instance",
            Self::NavigateToSettings => "navigate_to_settings",
            Self::NavigateToWelcome => "navigate_to_welcome",
            Self::GoBack => "go_back",
            Self::ToggleAddInstanceModal => "toggle_add_instance_modal",
            Self::OpenAddInstanceModal => "open_add_instance_modal",
            Self::CloseAddInstanceModal => "close_add_instance_modal",
        }
    }

    #[must_use]
    pub const fn is_navigation(&self) -> bool {
        matches!(
            self,
            Self::SelectInstance(_) | Self::NavigateToSettings | Self::NavigateToWelcome | Self::GoBack
        )
    }
}
