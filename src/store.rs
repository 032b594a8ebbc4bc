//! Client-side instance store.
//!
//! Owns the [`Model`] and reconciles backend replies into it. Each operation
//! awaits the gateway with no lock held, validates the reply, and only then
//! takes the write lock for one synchronous mutation. A failed call of any
//! category leaves the model exactly as it was.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, trace, warn};

use crate::capabilities::{CommandGateway, GatewayCommand, GatewayError};
use crate::discriminator::PayloadKind;
use crate::envelope::WindowActionResult;
use crate::event::Event;
use crate::model::{Instance, Model, View, ViewModel};
use crate::response;
use crate::{CoreError, CoreResult};

// ============================================================================
// Configuration
// ============================================================================

/// How overlapping `load_instances` calls settle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadOrdering {
    /// Whichever reply resolves last overwrites the collection.
    #[default]
    LastResolvedWins,
    /// Only the reply to the most recently issued load is applied.
    LatestIssuedWins,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub load_ordering: LoadOrdering,
    /// Emit every raw reply at `trace` level before validation.
    pub log_raw_replies: bool,
}

impl StoreConfig {
    #[must_use]
    pub fn with_load_ordering(mut self, ordering: LoadOrdering) -> Self {
        self.load_ordering = ordering;
        self
    }

    #[must_use]
    pub fn with_raw_reply_logging(mut self, enabled: bool) -> Self {
        self.log_raw_replies = enabled;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LoadOutcome {
    Replaced { count: usize },
    /// A newer load was issued while this one was in flight.
    Discarded { request: u64, latest: u64 },
}

impl LoadOutcome {
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Replaced { .. })
    }
}

// ============================================================================
// Store
// ============================================================================

pub struct InstanceStore<G: CommandGateway> {
    gateway: Arc<G>,
    config: StoreConfig,
    state: RwLock<Model>,
    load_requests: AtomicU64,
}

impl<G: CommandGateway> InstanceStore<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self::with_config(gateway, StoreConfig::default())
    }

    pub fn with_config(gateway: Arc<G>, config: StoreConfig) -> Self {
        Self {
            gateway,
            config,
            state: RwLock::new(Model::new()),
            load_requests: AtomicU64::new(0),
        }
    }

    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn trace_reply(&self, command: GatewayCommand, raw: &Value) {
        if self.config.log_raw_replies {
            trace!(%command, reply = %raw, "Raw backend reply");
        }
    }

    // Backend operations

    /// Saves `instance` and appends it once the backend confirms.
    ///
    /// Names are not checked for uniqueness here; that is the backend's call.
    #[instrument(skip(self, instance), fields(name = %instance.name, loader = %instance.loader))]
    pub async fn add_instance(&self, instance: Instance) -> CoreResult<Arc<Instance>> {
        let command = GatewayCommand::SaveInstance;
        let raw = self
            .gateway
            .save_instance(&instance)
            .await
            .map_err(|e| report(command, e.into()))?;
        self.trace_reply(command, &raw);

        response::parse_payload(&raw).map_err(|e| report(command, e))?;

        let instance = self.state.write().await.push_instance(instance);
        info!("Instance added");
        Ok(instance)
    }

    /// Replaces the collection with the backend's list, in the backend's order.
    #[instrument(skip(self))]
    pub async fn load_instances(&self) -> CoreResult<LoadOutcome> {
        let command = GatewayCommand::GetInstances;
        let request = self.load_requests.fetch_add(1, Ordering::SeqCst) + 1;

        let raw = self
            .gateway
            .get_instances()
            .await
            .map_err(|e| report(command, e.into()))?;
        self.trace_reply(command, &raw);

        let instances = response::parse_expected(&raw, PayloadKind::InstancesVec)
            .and_then(|data| data.into_instances_vec().map_err(CoreError::from))
            .map_err(|e| report(command, e))?;

        let mut state = self.state.write().await;
        if self.config.load_ordering == LoadOrdering::LatestIssuedWins {
            let latest = self.load_requests.load(Ordering::SeqCst);
            if request != latest {
                debug!(request, latest, "Discarding stale instance list");
                return Ok(LoadOutcome::Discarded { request, latest });
            }
        }

        let count = state.replace_instances(instances);
        info!(count, "Instance list replaced");
        Ok(LoadOutcome::Replaced { count })
    }

    #[instrument(skip(self))]
    pub async fn close_window(&self) -> CoreResult<WindowActionResult> {
        let reply = self.gateway.close_window().await;
        self.settle_window_action(GatewayCommand::CloseWindow, reply)
    }

    #[instrument(skip(self))]
    pub async fn minimize_window(&self) -> CoreResult<WindowActionResult> {
        let reply = self.gateway.minimize_window().await;
        self.settle_window_action(GatewayCommand::MinimizeWindow, reply)
    }

    #[instrument(skip(self))]
    pub async fn maximize_window(&self) -> CoreResult<WindowActionResult> {
        let reply = self.gateway.maximize_window().await;
        self.settle_window_action(GatewayCommand::MaximizeWindow, reply)
    }

    fn settle_window_action(
        &self,
        command: GatewayCommand,
        reply: Result<Value, GatewayError>,
    ) -> CoreResult<WindowActionResult> {
        let raw = reply.map_err(|e| report(command, e.into()))?;
        self.trace_reply(command, &raw);

        response::parse_expected(&raw, PayloadKind::WindowAction)
            .and_then(|data| data.as_window_action().map_err(CoreError::from))
            .map_err(|e| report(command, e))
    }

    // Local transitions

    pub async fn dispatch(&self, event: Event) {
        debug!(event = event.name(), "Dispatching event");
        self.state.write().await.update(event);
    }

    /// Selects `instance` and switches to the instance view.
    ///
    /// The instance does not have to belong to the loaded collection: a stale
    /// `Arc` from before a reload is still selected, but a warning is logged and
    /// no summary in the view model will be marked current.
    pub async fn set_current_instance(&self, instance: Arc<Instance>) {
        let mut state = self.state.write().await;
        if !state.instances.iter().any(|i| Arc::ptr_eq(i, &instance)) {
            warn!(instance = %instance, "Selecting an instance outside the loaded collection");
        }
        let event = Event::SelectInstance(instance);
        debug!(event = event.name(), "Dispatching event");
        state.update(event);
    }

    /// Selects the first instance named `name`, if there is one.
    pub async fn select_instance_by_name(&self, name: &str) -> Option<Arc<Instance>> {
        let mut state = self.state.write().await;
        let instance = state.find_instance(name)?;
        state.update(Event::SelectInstance(Arc::clone(&instance)));
        Some(instance)
    }

    pub async fn navigate_to_settings(&self) {
        self.dispatch(Event::NavigateToSettings).await;
    }

    pub async fn navigate_to_welcome(&self) {
        self.dispatch(Event::NavigateToWelcome).await;
    }

    pub async fn go_back(&self) {
        self.dispatch(Event::GoBack).await;
    }

    pub async fn toggle_add_instance_modal(&self) {
        self.dispatch(Event::ToggleAddInstanceModal).await;
    }

    pub async fn open_add_instance_modal(&self) {
        self.dispatch(Event::OpenAddInstanceModal).await;
    }

    pub async fn close_add_instance_modal(&self) {
        self.dispatch(Event::CloseAddInstanceModal).await;
    }

    // Reads

    pub async fn instances(&self) -> Vec<Arc<Instance>> {
        self.state.read().await.instances.clone()
    }

    pub async fn find_instance(&self, name: &str) -> Option<Arc<Instance>> {
        self.state.read().await.find_instance(name)
    }

    pub async fn current_instance(&self) -> Option<Arc<Instance>> {
        self.state.read().await.current_instance().cloned()
    }

    pub async fn current_view(&self) -> View {
        self.state.read().await.current_view()
    }

    pub async fn previous_view(&self) -> View {
        self.state.read().await.navigation.previous_view()
    }

    pub async fn is_add_instance_modal_open(&self) -> bool {
        self.state.read().await.is_add_instance_modal_open
    }

    pub async fn snapshot(&self) -> Model {
        self.state.read().await.clone()
    }

    pub async fn view(&self) -> ViewModel {
        self.state.read().await.view()
    }
}

/// Logs a failed round trip by category and hands the error back.
fn report(command: GatewayCommand, error: CoreError) -> CoreError {
    match &error {
        CoreError::Transport(e) => {
            warn!(%command, retryable = e.is_retryable(), error = %e, "Gateway call failed");
        }
        CoreError::Backend(e) => {
            warn!(
                %command,
                error_type = %e.error_type,
                detail = e.message(),
                "Backend reported a failure"
            );
        }
        other => {
            error!(%command, code = other.code(), error = %other, "Backend reply rejected");
        }
    }
    error
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::testing::{scripted_store, ScriptedGateway};
    use crate::envelope::{BackendErrorKind, ClientError, Envelope, ResponseData};
    use crate::model::Loader;
    use crate::FaultCategory;
    use serde_json::json;
    use std::time::Duration;

    fn modpack() -> Instance {
        Instance::new("Modpack", Loader::Fabric, "1.20.4").with_downloaded(true)
    }

    fn instance_list(instances: Vec<Instance>) -> Envelope {
        Envelope::success(ResponseData::InstancesVec(instances))
    }

    async fn wait_for_calls(bridge: &ScriptedGateway, command: GatewayCommand, n: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while bridge.call_count(command).await < n {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn load_replaces_collection_and_keeps_view() {
        let (bridge, store) = scripted_store(StoreConfig::default());
        store.navigate_to_settings().await;
        bridge
            .push_value(
                GatewayCommand::GetInstances,
                json!({
                    "success": true,
                    "error": null,
                    "data": { "InstancesVec": [{
                        "name": "Modpack",
                        "loader": "Fabric",
                        "version": "1.20.4",
                        "custom_args": [],
                        "downloaded": true
                    }] }
                }),
            )
            .await;

        let outcome = store.load_instances().await.unwrap();

        assert_eq!(outcome, LoadOutcome::Replaced { count: 1 });
        let instances = store.instances().await;
        assert_eq!(instances.len(), 1);
        assert_eq!(*instances[0], modpack());
        assert_eq!(store.current_view().await, View::Settings);
    }

    #[tokio::test]
    async fn failed_add_leaves_collection_unchanged() {
        let (bridge, store) = scripted_store(StoreConfig::default());
        bridge
            .push_envelope(
                GatewayCommand::SaveInstance,
                &Envelope::failure(
                    ClientError::new(BackendErrorKind::FileError).with_message("disk full"),
                ),
            )
            .await;

        let err = store.add_instance(modpack()).await.unwrap_err();

        let backend = err.backend_error().unwrap();
        assert_eq!(backend.error_type, BackendErrorKind::FileError);
        assert_eq!(backend.message(), "disk full");
        assert!(store.instances().await.is_empty());
    }

    #[tokio::test]
    async fn name_list_is_not_accepted_as_instances() {
        let (bridge, store) = scripted_store(StoreConfig::default());
        bridge
            .push_envelope(GatewayCommand::SaveInstance, &Envelope::empty_success())
            .await;
        store.add_instance(modpack()).await.unwrap();

        bridge
            .push_value(
                GatewayCommand::GetInstances,
                json!({ "success": true, "error": null, "data": { "Instances": ["a", "b"] } }),
            )
            .await;
        let err = store.load_instances().await.unwrap_err();

        assert!(matches!(err, CoreError::WrongVariant(_)));
        let names: Vec<_> = store.instances().await.iter().map(|i| i.name.clone()).collect();
        assert_eq!(names, ["Modpack"]);
    }

    #[tokio::test]
    async fn add_sends_instance_and_appends() {
        let (bridge, store) = scripted_store(StoreConfig::default());
        bridge
            .push_envelope(
                GatewayCommand::SaveInstance,
                &Envelope::success(ResponseData::InstanceData(vec![1, 2])),
            )
            .await;

        let added = store.add_instance(modpack()).await.unwrap();

        assert!(Arc::ptr_eq(&added, &store.instances().await[0]));
        let calls = bridge.calls().await;
        assert_eq!(calls[0].0, GatewayCommand::SaveInstance);
        assert_eq!(calls[0].1["instance"]["name"], "Modpack");
    }

    #[tokio::test]
    async fn transport_failure_leaves_state_untouched() {
        let (_bridge, store) = scripted_store(StoreConfig::default());
        let pack = store.select_instance_by_name("missing").await;
        assert!(pack.is_none());

        let err = store.load_instances().await.unwrap_err();
        assert_eq!(err.category(), FaultCategory::Transport);
        assert!(err.is_retryable());

        let err = store.add_instance(modpack()).await.unwrap_err();
        assert_eq!(err.category(), FaultCategory::Transport);
        assert!(store.instances().await.is_empty());
    }

    #[tokio::test]
    async fn selecting_a_foreign_instance_still_selects_it() {
        let (bridge, store) = scripted_store(StoreConfig::default());
        bridge
            .push_envelope(GatewayCommand::GetInstances, &instance_list(vec![modpack()]))
            .await;
        store.load_instances().await.unwrap();

        let stray = Arc::new(modpack());
        store.set_current_instance(Arc::clone(&stray)).await;

        assert_eq!(store.current_view().await, View::Instance);
        assert!(Arc::ptr_eq(&store.current_instance().await.unwrap(), &stray));
        let view = store.view().await;
        assert!(view.instances.iter().all(|summary| !summary.is_current));
        assert_eq!(view.current_instance.unwrap().name, "Modpack");
    }

    #[tokio::test]
    async fn malformed_reply_leaves_state_untouched() {
        let (bridge, store) = scripted_store(StoreConfig::default());
        bridge
            .push_envelope(GatewayCommand::GetInstances, &instance_list(vec![modpack()]))
            .await;
        store.load_instances().await.unwrap();
        let selected = store.select_instance_by_name("Modpack").await.unwrap();

        bridge
            .push_value(
                GatewayCommand::GetInstances,
                json!({ "success": true, "error": null, "data": { "InstancesVec": [{ "name": "x" }] } }),
            )
            .await;
        let err = store.load_instances().await.unwrap_err();

        assert_eq!(err.category(), FaultCategory::Validation);
        assert_eq!(err.schema_error().unwrap().len(), 4);
        assert_eq!(store.instances().await.len(), 1);
        assert!(Arc::ptr_eq(&store.current_instance().await.unwrap(), &selected));
    }

    #[tokio::test]
    async fn last_resolved_load_wins_by_default() {
        let (bridge, store) = scripted_store(StoreConfig::default());
        let store = Arc::new(store);
        let first = bridge.defer(GatewayCommand::GetInstances).await;
        let second = bridge.defer(GatewayCommand::GetInstances).await;

        let a = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.load_instances().await }
        });
        wait_for_calls(&bridge, GatewayCommand::GetInstances, 1).await;
        let b = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.load_instances().await }
        });
        wait_for_calls(&bridge, GatewayCommand::GetInstances, 2).await;

        let newer = Instance::new("newer", Loader::Forge, "1.21");
        let older = Instance::new("older", Loader::Quilt, "1.20.1");
        second
            .send(Ok(serde_json::to_value(instance_list(vec![newer])).unwrap()))
            .unwrap();
        assert!(b.await.unwrap().unwrap().is_applied());
        first
            .send(Ok(serde_json::to_value(instance_list(vec![older])).unwrap()))
            .unwrap();
        assert!(a.await.unwrap().unwrap().is_applied());

        let names: Vec<_> = store.instances().await.iter().map(|i| i.name.clone()).collect();
        assert_eq!(names, ["older"]);
    }

    #[tokio::test]
    async fn latest_issued_load_wins_when_configured() {
        let config = StoreConfig::default().with_load_ordering(LoadOrdering::LatestIssuedWins);
        let (bridge, store) = scripted_store(config);
        let store = Arc::new(store);
        let first = bridge.defer(GatewayCommand::GetInstances).await;
        let second = bridge.defer(GatewayCommand::GetInstances).await;

        let a = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.load_instances().await }
        });
        wait_for_calls(&bridge, GatewayCommand::GetInstances, 1).await;
        let b = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.load_instances().await }
        });
        wait_for_calls(&bridge, GatewayCommand::GetInstances, 2).await;

        let newer = Instance::new("newer", Loader::Forge, "1.21");
        let older = Instance::new("older", Loader::Quilt, "1.20.1");
        second
            .send(Ok(serde_json::to_value(instance_list(vec![newer])).unwrap()))
            .unwrap();
        assert_eq!(b.await.unwrap().unwrap(), LoadOutcome::Replaced { count: 1 });
        first
            .send(Ok(serde_json::to_value(instance_list(vec![older])).unwrap()))
            .unwrap();
        assert_eq!(
            a.await.unwrap().unwrap(),
            LoadOutcome::Discarded { request: 1, latest: 2 }
        );

        let names: Vec<_> = store.instances().await.iter().map(|i| i.name.clone()).collect();
        assert_eq!(names, ["newer"]);
    }

    #[tokio::test]
    async fn window_actions_are_validated() {
        let (bridge, store) = scripted_store(StoreConfig::default().with_raw_reply_logging(true));
        bridge
            .push_envelope(
                GatewayCommand::MinimizeWindow,
                &Envelope::success(ResponseData::WindowAction(WindowActionResult::MinimizeSuccess)),
            )
            .await;
        bridge
            .push_envelope(
                GatewayCommand::CloseWindow,
                &Envelope::failure(ClientError::new(BackendErrorKind::WindowIsNotClosable)),
            )
            .await;
        bridge
            .push_envelope(GatewayCommand::MaximizeWindow, &Envelope::empty_success())
            .await;

        assert_eq!(
            store.minimize_window().await.unwrap(),
            WindowActionResult::MinimizeSuccess
        );
        let err = store.close_window().await.unwrap_err();
        assert!(err.backend_error().unwrap().error_type.is_window_fault());
        assert!(matches!(
            store.maximize_window().await,
            Err(CoreError::WrongVariant(_))
        ));
        assert_eq!(store.snapshot().await.instances.len(), 0);
    }

    #[tokio::test]
    async fn navigation_through_the_store() {
        let (bridge, store) = scripted_store(StoreConfig::default());
        bridge
            .push_envelope(GatewayCommand::GetInstances, &instance_list(vec![modpack()]))
            .await;
        store.load_instances().await.unwrap();

        let pack = store.find_instance("Modpack").await.unwrap();
        store.set_current_instance(Arc::clone(&pack)).await;
        store.navigate_to_settings().await;
        store.go_back().await;

        assert_eq!(store.current_view().await, View::Instance);
        assert_eq!(store.previous_view().await, View::Instance);
        assert!(Arc::ptr_eq(&store.current_instance().await.unwrap(), &pack));

        store.toggle_add_instance_modal().await;
        assert!(store.is_add_instance_modal_open().await);
        store.close_add_instance_modal().await;
        store.open_add_instance_modal().await;
        assert!(store.view().await.is_add_instance_modal_open);

        store.navigate_to_welcome().await;
        assert!(store.current_instance().await.is_none());
    }

    #[test]
    fn config_defaults_from_empty_json() {
        let config: StoreConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.load_ordering, LoadOrdering::LastResolvedWins);

        let config: StoreConfig =
            serde_json::from_value(json!({ "load_ordering": "latest_issued_wins" })).unwrap();
        assert_eq!(config.load_ordering, LoadOrdering::LatestIssuedWins);
        assert!(!config.log_raw_replies);
    }
}
