// ── Controller abstraction ──
//
// Full lifecycle management for a gateway connection. Owns the store, the
// middleware, write sequencing and the display overlay, and runs the
// background persistence and refresh tasks.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use tlight_api::{GatewayClient, TransportConfig};

use crate::command::{ApiAction, ApiResponse, Middleware, effect_params};
use crate::config::ControllerConfig;
use crate::error::CoreError;
use crate::fence::{WriteFence, WriteField, WriteKey, WriteTarget};
use crate::model::{
    CardPreference, ConfiguredEffect, EffectId, EffectType, LightKey, LightValue, NodeId,
    NodeValue, ValueField, ValuesPatch,
};
use crate::overlay::DisplayOverlay;
use crate::persistence::{MemorySink, PersistenceSink, Persister, persistence_task};
use crate::schema::{FormNode, ROOT_TOKEN, build_form, default_tree, schema_for};
use crate::store::{Action, DataStore, StoreState};
use crate::stream::StateStream;

// ── ConnectionState ──────────────────────────────────────────────

/// Connection state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

// ── Controller ───────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Gateway writes are
/// committed to the store only once the gateway accepts them; until then
/// the pending value is visible through the display accessors.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: ControllerConfig,
    store: Arc<DataStore>,
    middleware: Middleware,
    fence: WriteFence<WriteKey>,
    overlay: DisplayOverlay,
    persister: Arc<Persister>,
    connection_state: watch::Sender<ConnectionState>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Controller {
    /// Create a controller whose effects live in memory only.
    pub fn new(config: ControllerConfig) -> Result<Self, CoreError> {
        Self::with_persistence(config, Arc::new(MemorySink::new()))
    }

    /// Create a controller backed by `sink`. Previously persisted effects
    /// and preferences are restored immediately. Does NOT connect -- call
    /// [`connect()`](Self::connect) to load nodes and start background tasks.
    pub fn with_persistence(
        config: ControllerConfig,
        sink: Arc<dyn PersistenceSink>,
    ) -> Result<Self, CoreError> {
        let transport = TransportConfig::default().with_timeout(config.timeout);
        let client = GatewayClient::new(config.url.clone(), &transport)?;

        let store = Arc::new(DataStore::new());
        let persister = Arc::new(Persister::new(sink));
        if let Some(saved) = persister.restore() {
            persister.mark_saved(saved.clone());
            store.dispatch(&saved.into_action());
        }

        let middleware = Middleware::new(
            client,
            Arc::clone(&store),
            config.node_throttle,
            config.light_throttle,
        );
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);

        Ok(Self {
            inner: Arc::new(ControllerInner {
                config,
                store,
                middleware,
                fence: WriteFence::new(),
                overlay: DisplayOverlay::new(),
                persister,
                connection_state,
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        })
    }

    /// Access the controller configuration.
    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    /// Access the underlying DataStore.
    pub fn store(&self) -> &Arc<DataStore> {
        &self.inner.store
    }

    /// Access the gateway middleware.
    pub fn middleware(&self) -> &Middleware {
        &self.inner.middleware
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Connect to the gateway.
    ///
    /// Loads the node list and spawns background tasks (debounced
    /// persistence, optional periodic refresh).
    pub async fn connect(&self) -> Result<(), CoreError> {
        self.inner
            .connection_state
            .send_replace(ConnectionState::Connecting);

        if let Err(e) = self.load_nodes().await {
            self.inner
                .connection_state
                .send_replace(ConnectionState::Failed);
            return Err(e);
        }

        let config = &self.inner.config;
        let mut handles = self.inner.task_handles.lock().await;

        handles.push(tokio::spawn(persistence_task(
            Arc::clone(&self.inner.store),
            Arc::clone(&self.inner.persister),
            config.persist_debounce,
            self.inner.cancel.clone(),
        )));

        let interval_secs = config.refresh_interval_secs;
        if interval_secs > 0 {
            let ctrl = self.clone();
            let cancel = self.inner.cancel.clone();
            handles.push(tokio::spawn(refresh_task(ctrl, interval_secs, cancel)));
        }

        self.inner
            .connection_state
            .send_replace(ConnectionState::Connected);
        info!(
            url = %config.url,
            nodes = self.inner.store.node_count(),
            "connected to gateway"
        );
        Ok(())
    }

    /// Disconnect from the gateway.
    ///
    /// Cancels background tasks and flushes persisted state one last time.
    pub async fn disconnect(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }

        if let Err(e) = self.flush() {
            warn!(error = %e, "final state flush failed");
        }

        self.inner
            .connection_state
            .send_replace(ConnectionState::Disconnected);
        debug!("disconnected");
    }

    /// Fetch the node list and reinitialize nodes, values and effect
    /// assignments from it. Returns the number of nodes.
    pub async fn load_nodes(&self) -> Result<usize, CoreError> {
        let response = self
            .inner
            .middleware
            .dispatch(ApiAction::FetchNodeData)
            .await?;
        let ApiResponse::Nodes(nodes) = response else {
            return Err(CoreError::Internal("node fetch returned no node list".into()));
        };

        let count = nodes.len();
        self.inner
            .middleware
            .dispatch(Action::NodesReceived { nodes })
            .await?;

        debug!(nodes = count, "node list loaded");
        Ok(count)
    }

    /// One-shot: connect, run closure, disconnect.
    ///
    /// Periodic refresh is disabled since only a single cycle is needed.
    pub async fn oneshot<F, Fut, T>(
        config: ControllerConfig,
        sink: Arc<dyn PersistenceSink>,
        f: F,
    ) -> Result<T, CoreError>
    where
        F: FnOnce(Controller) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let mut cfg = config;
        cfg.refresh_interval_secs = 0;

        let controller = Controller::with_persistence(cfg, sink)?;
        controller.connect().await?;
        let result = f(controller.clone()).await;
        controller.disconnect().await;
        result
    }

    /// Write the persisted slice now instead of waiting for the debounce.
    pub fn flush(&self) -> Result<bool, CoreError> {
        self.inner.persister.flush(&self.inner.store.snapshot())
    }

    // ── Node and light writes ────────────────────────────────────

    /// Write node values immediately.
    pub async fn set_node_values(
        &self,
        node_id: &NodeId,
        patch: ValuesPatch,
    ) -> Result<(), CoreError> {
        self.write_node(node_id, patch, false).await
    }

    /// Write node values through the node throttle. Use for continuous
    /// input such as sliders.
    pub async fn change_node_values(
        &self,
        node_id: &NodeId,
        patch: ValuesPatch,
    ) -> Result<(), CoreError> {
        self.write_node(node_id, patch, true).await
    }

    /// Write one light's values immediately.
    pub async fn set_light_values(
        &self,
        node_id: &NodeId,
        light_key: &LightKey,
        patch: ValuesPatch,
    ) -> Result<(), CoreError> {
        self.write_light(node_id, light_key, patch, false).await
    }

    /// Write one light's values through the light throttle.
    pub async fn change_light_values(
        &self,
        node_id: &NodeId,
        light_key: &LightKey,
        patch: ValuesPatch,
    ) -> Result<(), CoreError> {
        self.write_light(node_id, light_key, patch, true).await
    }

    async fn write_node(
        &self,
        node_id: &NodeId,
        patch: ValuesPatch,
        throttled: bool,
    ) -> Result<(), CoreError> {
        if patch.is_empty() {
            return Ok(());
        }
        let inner = &self.inner;
        let target = WriteTarget::Node(node_id.clone());

        inner.overlay.stage_node(node_id, &patch);
        let ticket = inner.fence.issue(value_keys(&target, &patch));

        let action = if throttled {
            ApiAction::PostNodeValuesThrottled {
                node_id: node_id.clone(),
                patch,
            }
        } else {
            ApiAction::PostNodeValues {
                node_id: node_id.clone(),
                patch,
            }
        };
        let result = inner.middleware.dispatch(action).await;

        let current = value_fields(inner.fence.settle(&ticket));
        inner.overlay.clear_node(node_id, &current);
        result?;

        let committed = patch.only(&current);
        if committed.is_empty() {
            debug!(%node_id, "node write superseded before it settled");
            return Ok(());
        }
        inner.store.dispatch(&Action::NodeValuesChanged {
            node_id: node_id.clone(),
            patch: committed,
        });
        Ok(())
    }

    async fn write_light(
        &self,
        node_id: &NodeId,
        light_key: &LightKey,
        patch: ValuesPatch,
        throttled: bool,
    ) -> Result<(), CoreError> {
        // Lights have no mode of their own.
        let patch = ValuesPatch { mode: None, ..patch };
        if patch.is_empty() {
            return Ok(());
        }
        let inner = &self.inner;
        let target = WriteTarget::Light(node_id.clone(), light_key.clone());

        inner.overlay.stage_light(light_key, &patch);
        let ticket = inner.fence.issue(value_keys(&target, &patch));

        let action = if throttled {
            ApiAction::PostLightValuesThrottled {
                node_id: node_id.clone(),
                light_key: light_key.clone(),
                patch,
            }
        } else {
            ApiAction::PostLightValues {
                node_id: node_id.clone(),
                light_key: light_key.clone(),
                patch,
            }
        };
        let result = inner.middleware.dispatch(action).await;

        let current = value_fields(inner.fence.settle(&ticket));
        inner.overlay.clear_light(light_key, &current);
        result?;

        let committed = patch.only(&current);
        if committed.is_empty() {
            debug!(%light_key, "light write superseded before it settled");
            return Ok(());
        }
        inner.store.dispatch(&Action::LightValuesChanged {
            node_id: node_id.clone(),
            light_key: light_key.clone(),
            patch: committed,
        });
        Ok(())
    }

    // ── Effect selection ─────────────────────────────────────────

    /// Run `effect_id` on `node_id`. `colors` is the node's color support,
    /// forwarded to the effect when known.
    pub async fn select_effect(
        &self,
        node_id: &NodeId,
        effect_id: &EffectId,
        colors: Option<bool>,
    ) -> Result<(), CoreError> {
        let inner = &self.inner;
        if inner.store.node(node_id).is_none() {
            return Err(CoreError::not_found("Node", node_id));
        }
        let effect = inner
            .store
            .effect(effect_id)
            .ok_or_else(|| CoreError::not_found("Effect", effect_id))?;
        let params = effect_params(&effect, colors)?;

        let ticket = inner.fence.issue([(
            WriteTarget::Effect(node_id.clone()),
            WriteField::Selection,
        )]);
        let result = inner
            .middleware
            .dispatch(ApiAction::PostEffectSetup {
                node_id: node_id.clone(),
                params,
            })
            .await;
        let current = !inner.fence.settle(&ticket).is_empty();
        result?;

        if current {
            inner.store.dispatch(&Action::EffectSelected {
                node_id: node_id.clone(),
                effect_id: effect_id.clone(),
            });
            info!(%node_id, %effect_id, "effect selected");
        } else {
            debug!(%node_id, "effect selection superseded before it settled");
        }
        Ok(())
    }

    // ── Effect editing ───────────────────────────────────────────

    /// Create an empty, untyped effect and return its id.
    pub fn create_effect(&self) -> EffectId {
        let id = EffectId::generate();
        self.inner
            .store
            .dispatch(&Action::EffectCreated { id: id.clone() });
        id
    }

    pub fn set_effect_name(
        &self,
        id: &EffectId,
        name: impl Into<String>,
    ) -> Result<(), CoreError> {
        self.require_effect(id)?;
        self.inner.store.dispatch(&Action::EffectNameSet {
            id: id.clone(),
            name: name.into(),
        });
        Ok(())
    }

    /// Change the effect type. Properties are reset and, for a concrete
    /// type, replaced by the full default tree of its schema.
    pub fn set_effect_type(
        &self,
        id: &EffectId,
        effect_type: Option<EffectType>,
    ) -> Result<(), CoreError> {
        self.require_effect(id)?;
        let store = &self.inner.store;
        store.dispatch(&Action::EffectTypeSet {
            id: id.clone(),
            effect_type,
        });
        if let Some(effect_type) = effect_type {
            store.dispatch(&Action::EffectPropertySet {
                id: id.clone(),
                path: ROOT_TOKEN.to_owned(),
                value: default_tree(schema_for(effect_type)),
            });
        }
        Ok(())
    }

    /// Set one value at a dot-separated path of the effect's properties.
    pub fn set_effect_property(
        &self,
        id: &EffectId,
        path: &str,
        value: Value,
    ) -> Result<(), CoreError> {
        self.require_effect(id)?;
        self.inner.store.dispatch(&Action::EffectPropertySet {
            id: id.clone(),
            path: path.to_owned(),
            value,
        });
        Ok(())
    }

    /// Set all three channels of a color property in one step.
    pub fn set_effect_color(
        &self,
        id: &EffectId,
        path: &str,
        (red, green, blue): (u8, u8, u8),
    ) -> Result<(), CoreError> {
        let color = json!({ "red": red, "green": green, "blue": blue });
        self.set_effect_property(id, path, color)
    }

    pub fn delete_effect(&self, id: &EffectId) -> Result<(), CoreError> {
        self.require_effect(id)?;
        self.inner
            .store
            .dispatch(&Action::EffectDeleted { id: id.clone() });
        Ok(())
    }

    /// Editor form of an effect. Untyped effects have an empty form.
    pub fn effect_form(&self, id: &EffectId) -> Result<Vec<FormNode>, CoreError> {
        let effect = self.require_effect(id)?;
        let Some(effect_type) = effect.effect_type else {
            return Ok(Vec::new());
        };
        let mode = self
            .inner
            .store
            .snapshot()
            .card_preferences(id.as_str())
            .color_edit_mode();
        Ok(build_form(
            schema_for(effect_type),
            &effect.effect_properties,
            mode,
        ))
    }

    fn require_effect(&self, id: &EffectId) -> Result<ConfiguredEffect, CoreError> {
        self.inner
            .store
            .effect(id)
            .ok_or_else(|| CoreError::not_found("Effect", id))
    }

    // ── Preferences ──────────────────────────────────────────────

    pub fn set_card_preference(&self, entity_id: impl Into<String>, preference: CardPreference) {
        self.inner.store.dispatch(&Action::CardPreferenceSet {
            entity_id: entity_id.into(),
            preference,
        });
    }

    // ── State observation ────────────────────────────────────────

    /// Subscribe to connection state changes.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    pub fn snapshot(&self) -> Arc<StoreState> {
        self.inner.store.snapshot()
    }

    pub fn subscribe(&self) -> StateStream {
        self.inner.store.subscribe()
    }

    /// Node values as they should be displayed: committed values with any
    /// in-flight edits on top.
    pub fn node_display_value(&self, node_id: &NodeId) -> Option<NodeValue> {
        self.inner
            .overlay
            .node_view(node_id, self.inner.store.node_value(node_id))
    }

    pub fn light_display_value(
        &self,
        node_id: &NodeId,
        light_key: &LightKey,
    ) -> Option<LightValue> {
        self.inner
            .overlay
            .light_view(light_key, self.inner.store.light_value(node_id, light_key))
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Periodically reload the node list from the gateway.
async fn refresh_task(controller: Controller, interval_secs: u64, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let Err(e) = controller.load_nodes().await {
                    warn!(error = %e, "periodic refresh failed");
                }
            }
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────

fn value_keys(target: &WriteTarget, patch: &ValuesPatch) -> Vec<WriteKey> {
    patch
        .fields()
        .into_iter()
        .map(|field| (target.clone(), WriteField::Value(field)))
        .collect()
}

fn value_fields(keys: Vec<WriteKey>) -> Vec<ValueField> {
    keys.into_iter()
        .filter_map(|(_, field)| match field {
            WriteField::Value(field) => Some(field),
            WriteField::Selection => None,
        })
        .collect()
}
