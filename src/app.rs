//! Crux entry point for the synchronous UI intents.
//!
//! Navigation and modal events only touch the [`Model`], so the shell drives
//! them through [`App`] and receives a render request after each one. Backend
//! round trips stay on [`crate::InstanceStore`].

use crate::capabilities::Capabilities;
use crate::event::Event;
use crate::model::{Model, ViewModel};
use tracing::debug;

#[derive(Default)]
pub struct App;

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        debug!(event = event.name(), "Applying event");
        model.update(event);
        caps.render.render();
    }

    fn view(&self, model: &Model) -> ViewModel {
        model.view()
    }
}
