use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};

use crate::event::Event;
use crate::navigation::Navigation;

wire_enum! {
    /// Runtime flavour an instance boots with.
    pub enum Loader {
        Vanilla,
        Fabric,
        Forge,
        Quilt,
        NeoForge,
    }
}

/// A configured runtime profile, exactly as the backend stores it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Instance {
    pub name: String,
    pub loader: Loader,
    pub version: String,
    pub custom_args: Vec<String>,
    pub downloaded: bool,
}

impl Instance {
    /// A freshly configured instance has nothing downloaded yet.
    pub fn new(name: impl Into<String>, loader: Loader, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            loader,
            version: version.into(),
            custom_args: Vec::new(),
            downloaded: false,
        }
    }

    #[must_use]
    pub fn with_custom_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.custom_args = args.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_downloaded(mut self, downloaded: bool) -> Self {
        self.downloaded = downloaded;
        self
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} {})", self.name, self.loader, self.version)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    #[default]
    Welcome,
    Instance,
    Settings,
}

impl View {
    pub const ALL: [Self; 3] = [Self::Welcome, Self::Instance, Self::Settings];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::Instance => "instance",
            Self::Settings => "settings",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client-side application state. Instances are shared through `Arc` so the
/// navigation selection points into the collection instead of holding a copy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Model {
    pub instances: Vec<Arc<Instance>>,
    pub navigation: Navigation,
    pub is_add_instance_modal_open: bool,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, event: Event) {
        match event {
            Event::SelectInstance(instance) => self.navigation.select_instance(instance),
            Event::NavigateToSettings => self.navigation.navigate_to_settings(),
            Event::NavigateToWelcome => self.navigation.navigate_to_welcome(),
            Event::GoBack => self.navigation.go_back(),
            Event::ToggleAddInstanceModal => {
                self.is_add_instance_modal_open = !self.is_add_instance_modal_open;
            }
            Event::OpenAddInstanceModal => self.is_add_instance_modal_open = true,
            Event::CloseAddInstanceModal => self.is_add_instance_modal_open = false,
        }
    }

    /// Replaces the whole collection, keeping the backend's order.
    pub fn replace_instances(&mut self, instances: Vec<Instance>) -> usize {
        self.instances = instances.into_iter().map(Arc::new).collect();
        self.instances.len()
    }

    // No uniqueness check: the backend decides whether two instances may share a name.
    pub fn push_instance(&mut self, instance: Instance) -> Arc<Instance> {
        let instance = Arc::new(instance);
        self.instances.push(Arc::clone(&instance));
        instance
    }

    pub fn find_instance(&self, name: &str) -> Option<Arc<Instance>> {
        self.instances.iter().find(|i| i.name == name).cloned()
    }

    pub fn current_view(&self) -> View {
        self.navigation.current_view()
    }

    pub fn current_instance(&self) -> Option<&Arc<Instance>> {
        self.navigation.current_instance()
    }

    pub fn view(&self) -> ViewModel {
        let summarize = |instance: &Arc<Instance>| InstanceSummary {
            name: instance.name.clone(),
            loader: instance.loader,
            version: instance.version.clone(),
            downloaded: instance.downloaded,
            is_current: self.navigation.is_current(instance),
        };

        ViewModel {
            view: self.navigation.current_view(),
            previous_view: self.navigation.previous_view(),
            can_go_back: self.navigation.can_go_back(),
            instances: self.instances.iter().map(summarize).collect(),
            current_instance: self.navigation.current_instance().map(summarize),
            is_add_instance_modal_open: self.is_add_instance_modal_open,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceSummary {
    pub name: String,
    pub loader: Loader,
    pub version: String,
    pub downloaded: bool,
    pub is_current: bool,
}

/// What the renderer needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewModel {
    pub view: View,
    pub previous_view: View,
    pub can_go_back: bool,
    pub instances: Vec<InstanceSummary>,
    pub current_instance: Option<InstanceSummary>,
    pub is_add_instance_modal_open: bool,
}
