//! Seams to the native shell. The core never talks to the backend directly;
//! it goes through a [`CommandGateway`] the host provides.

mod gateway;

pub use self::gateway::{CommandGateway, GatewayCommand, GatewayError, Invoke, InvokeGateway};
pub use crux_core::render::Render;

use crate::app::App;
use crate::event::Event;

pub type AppRender = Render<Event>;

/// Shell capabilities for the synchronous intents. Backend commands go through
/// the [`CommandGateway`] instead.
#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub render: Render<Event>,
}

#[cfg(any(test, feature = "test-utils"))]
pub mod testing {
    //! A bridge whose replies are scripted per command. Replies can be deferred
    //! through a oneshot channel so tests decide the order calls resolve in.

    use super::*;
    use serde_json::Value;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Arc;
    use tokio::sync::{oneshot, Mutex};

    use crate::envelope::Envelope;
    use crate::store::{InstanceStore, StoreConfig};

    pub type ScriptedReply = Result<Value, GatewayError>;
    pub type ScriptedStore = InstanceStore<InvokeGateway<Arc<ScriptedGateway>>>;

    enum Reply {
        Ready(ScriptedReply),
        Deferred(oneshot::Receiver<ScriptedReply>),
    }

    #[derive(Default)]
    pub struct ScriptedGateway {
        replies: Mutex<HashMap<GatewayCommand, VecDeque<Reply>>>,
        calls: Mutex<Vec<(GatewayCommand, Value)>>,
    }

    impl ScriptedGateway {
        pub fn new() -> Self {
            Self::default()
        }

        async fn enqueue(&self, command: GatewayCommand, reply: Reply) {
            self.replies
                .lock()
                .await
                .entry(command)
                .or_default()
                .push_back(reply);
        }

        pub async fn push(&self, command: GatewayCommand, reply: ScriptedReply) {
            self.enqueue(command, Reply::Ready(reply)).await;
        }

        pub async fn push_value(&self, command: GatewayCommand, value: Value) {
            self.push(command, Ok(value)).await;
        }

        /// # Panics
        /// If the envelope cannot be serialized, which only happens for a broken test fixture.
        pub async fn push_envelope(&self, command: GatewayCommand, envelope: &Envelope) {
            let value = serde_json::to_value(envelope).expect("envelope serializes");
            self.push_value(command, value).await;
        }

        /// Queues a reply that resolves only when the returned sender fires.
        pub async fn defer(&self, command: GatewayCommand) -> oneshot::Sender<ScriptedReply> {
            let (tx, rx) = oneshot::channel();
            self.enqueue(command, Reply::Deferred(rx)).await;
            tx
        }

        pub async fn calls(&self) -> Vec<(GatewayCommand, Value)> {
            self.calls.lock().await.clone()
        }

        pub async fn call_count(&self, command: GatewayCommand) -> usize {
            self.calls
                .lock()
                .await
                .iter()
                .filter(|(c, _)| *c == command)
                .count()
        }
    }

    #[async_trait::async_trait]
    impl Invoke for ScriptedGateway {
        async fn invoke(&self, command: GatewayCommand, args: Value) -> ScriptedReply {
            self.calls.lock().await.push((command, args));

            let reply = self
                .replies
                .lock()
                .await
                .get_mut(&command)
                .and_then(VecDeque::pop_front);

            match reply {
                Some(Reply::Ready(reply)) => reply,
                Some(Reply::Deferred(rx)) => rx.await.unwrap_or_else(|_| {
                    Err(GatewayError::unreachable(command, "deferred reply dropped"))
                }),
                None => Err(GatewayError::unreachable(command, "no scripted reply")),
            }
        }
    }

    /// A fresh store wired to a scripted bridge.
    pub fn scripted_store(config: StoreConfig) -> (Arc<ScriptedGateway>, ScriptedStore) {
        let bridge = Arc::new(ScriptedGateway::new());
        let store = InstanceStore::with_config(
            Arc::new(InvokeGateway::new(Arc::clone(&bridge))),
            config,
        );
        (bridge, store)
    }
}
