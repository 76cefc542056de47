// Gateway effect endpoint
//
// The gateway runs effects through a source plugin attached to a node.
// The parameter object is schema-driven and opaque at this layer.

use tracing::debug;

use crate::client::GatewayClient;
use crate::error::Error;

impl GatewayClient {
    /// Attach an effect source to a node.
    ///
    /// `POST {base}/lights/nodes/{nodeId}/plugin/source`
    pub async fn post_effect_setup(
        &self,
        node_id: &str,
        params: &serde_json::Value,
    ) -> Result<(), Error> {
        let url = self.endpoint(&["lights", "nodes", node_id, "plugin", "source"])?;
        debug!(node_id, "configuring effect source");
        self.post(url, params).await
    }
}
