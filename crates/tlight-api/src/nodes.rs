// Gateway node endpoints
//
// Node listing and state writes. Node-level and per-light writes share the
// same URL and differ only in body shape.

use tracing::debug;

use crate::client::GatewayClient;
use crate::error::Error;
use crate::models::{GatewayNode, LightWriteBody, NodeWriteBody, NodesResponse};

impl GatewayClient {
    /// List every node known to the gateway.
    ///
    /// `GET {base}/lights/nodes`
    pub async fn fetch_nodes(&self) -> Result<Vec<GatewayNode>, Error> {
        let url = self.endpoint(&["lights", "nodes"])?;
        debug!("listing nodes");
        let resp: NodesResponse = self.get(url).await?;
        Ok(resp.nodes)
    }

    /// Write node-level state (mode, brightness, color).
    ///
    /// `POST {base}/lights/nodes/{nodeId}`
    pub async fn post_node_state(&self, body: &NodeWriteBody) -> Result<(), Error> {
        let url = self.endpoint(&["lights", "nodes", &body.id])?;
        debug!(node_id = %body.id, "writing node state");
        self.post(url, body).await
    }

    /// Write per-light state; the node is switched to `INDIVIDUAL` mode.
    ///
    /// `POST {base}/lights/nodes/{nodeId}`
    pub async fn post_light_state(&self, body: &LightWriteBody) -> Result<(), Error> {
        let url = self.endpoint(&["lights", "nodes", &body.id])?;
        debug!(
            node_id = %body.id,
            lights = body.individual_data.len(),
            "writing light state"
        );
        self.post(url, body).await
    }
}
