// ── Gateway middleware ──
//
// Executes gateway intents against the `GatewayClient` and forwards store
// intents to the `DataStore`. Throttled writes are paced per target: one
// throttle slot per node for node writes, one per light for light writes.

use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use serde_json::Value;
use tracing::debug;

use tlight_api::GatewayClient;

use super::{ApiAction, Intent};
use crate::convert::{light_write_body, node_write_body};
use crate::error::CoreError;
use crate::model::{LightKey, Node, NodeId, ValuesPatch};
use crate::store::DataStore;
use crate::throttle::{Coalesce, Throttle};

impl Coalesce for ValuesPatch {
    fn coalesce(&mut self, newer: Self) {
        self.merge_from(&newer);
    }
}

/// What a dispatched intent produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// Node list returned by `fetchNodeData`.
    Nodes(Vec<Node>),
    /// The gateway accepted a write.
    Accepted,
    /// A store action was handed to the store.
    Forwarded,
}

pub struct Middleware {
    client: Arc<GatewayClient>,
    store: Arc<DataStore>,
    node_throttle: Throttle<NodeId, ValuesPatch>,
    light_throttle: Throttle<(NodeId, LightKey), ValuesPatch>,
}

impl Middleware {
    pub fn new(
        client: GatewayClient,
        store: Arc<DataStore>,
        node_window: Duration,
        light_window: Duration,
    ) -> Self {
        let client = Arc::new(client);

        let node_client = Arc::clone(&client);
        let node_throttle = Throttle::new(node_window, move |node_id: NodeId, patch: ValuesPatch| {
            let client = Arc::clone(&node_client);
            async move { post_node(&client, &node_id, &patch).await }.boxed()
        });

        let light_client = Arc::clone(&client);
        let light_throttle = Throttle::new(
            light_window,
            move |(node_id, light_key): (NodeId, LightKey), patch: ValuesPatch| {
                let client = Arc::clone(&light_client);
                async move { post_light(&client, &node_id, &light_key, &patch).await }.boxed()
            },
        );

        Self {
            client,
            store,
            node_throttle,
            light_throttle,
        }
    }

    pub fn client(&self) -> &GatewayClient {
        &self.client
    }

    /// Execute a gateway intent, or forward a store intent to the store.
    pub async fn dispatch(&self, intent: impl Into<Intent>) -> Result<ApiResponse, CoreError> {
        match intent.into() {
            Intent::Store(action) => {
                self.store.dispatch(&action);
                Ok(ApiResponse::Forwarded)
            }
            Intent::Gateway(action) => self.execute(action).await,
        }
    }

    /// Dispatch a gateway action by wire name. Unknown names send nothing
    /// and yield `Ok(None)`.
    pub async fn dispatch_named(
        &self,
        name: &str,
        params: Value,
    ) -> Result<Option<ApiResponse>, CoreError> {
        match ApiAction::from_name(name, params)? {
            Some(action) => self.execute(action).await.map(Some),
            None => {
                debug!(name, "ignoring unknown gateway action");
                Ok(None)
            }
        }
    }

    async fn execute(&self, action: ApiAction) -> Result<ApiResponse, CoreError> {
        debug!(action = action.name(), "dispatching gateway action");

        match action {
            ApiAction::FetchNodeData => {
                let nodes = self.client.fetch_nodes().await?;
                Ok(ApiResponse::Nodes(nodes.into_iter().map(Node::from).collect()))
            }
            ApiAction::PostNodeValues { node_id, patch } => {
                post_node(&self.client, &node_id, &patch).await?;
                Ok(ApiResponse::Accepted)
            }
            ApiAction::PostNodeValuesThrottled { node_id, patch } => {
                self.node_throttle.call(node_id, patch).await?;
                Ok(ApiResponse::Accepted)
            }
            ApiAction::PostLightValues {
                node_id,
                light_key,
                patch,
            } => {
                post_light(&self.client, &node_id, &light_key, &patch).await?;
                Ok(ApiResponse::Accepted)
            }
            ApiAction::PostLightValuesThrottled {
                node_id,
                light_key,
                patch,
            } => {
                self.light_throttle.call((node_id, light_key), patch).await?;
                Ok(ApiResponse::Accepted)
            }
            ApiAction::PostEffectSetup { node_id, params } => {
                self.client
                    .post_effect_setup(node_id.as_str(), &params)
                    .await?;
                Ok(ApiResponse::Accepted)
            }
        }
    }
}

async fn post_node(
    client: &GatewayClient,
    node_id: &NodeId,
    patch: &ValuesPatch,
) -> Result<(), CoreError> {
    client
        .post_node_state(&node_write_body(node_id, patch))
        .await
        .map_err(CoreError::from)
}

async fn post_light(
    client: &GatewayClient,
    node_id: &NodeId,
    light_key: &LightKey,
    patch: &ValuesPatch,
) -> Result<(), CoreError> {
    client
        .post_light_state(&light_write_body(node_id, light_key, patch))
        .await
        .map_err(CoreError::from)
}
