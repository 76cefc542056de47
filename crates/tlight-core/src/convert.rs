// ── API/domain type conversions ──
//
// Bridges raw `tlight_api` wire types into `tlight_core::model` domain types
// and back. Reads normalize ids and parse the mode string into `Mode`;
// writes turn sparse `ValuesPatch`es into the sparse bodies the gateway
// expects.

use std::str::FromStr;

use tracing::warn;

use tlight_api::models::{
    GatewayLight, GatewayNode, IndividualLight, LightWriteBody, NodeState, NodeWriteBody,
    RgbColor,
};

use crate::model::{
    Light, LightKey, LightValue, Mode, Node, NodeFeatures, NodeId, NodeValue, ReportedState,
    ValuesPatch,
};

// ── Helpers ────────────────────────────────────────────────────────

/// Parse a wire mode string. Unknown modes are logged and dropped rather
/// than failing the whole node list.
fn parse_mode(raw: Option<&str>, node_id: &str) -> Option<Mode> {
    let raw = raw?;
    match Mode::from_str(raw) {
        Ok(mode) => Some(mode),
        Err(_) => {
            warn!(node_id, mode = raw, "ignoring unknown node mode");
            None
        }
    }
}

fn channels(color: Option<RgbColor>) -> (Option<u8>, Option<u8>, Option<u8>) {
    color.map_or((None, None, None), |c| (c.red, c.green, c.blue))
}

fn color_of(patch: &ValuesPatch) -> Option<RgbColor> {
    RgbColor {
        red: patch.red,
        green: patch.green,
        blue: patch.blue,
    }
    .non_empty()
}

// ── Reads ──────────────────────────────────────────────────────────

impl From<GatewayLight> for Light {
    fn from(l: GatewayLight) -> Self {
        let (red, green, blue) = channels(l.color);
        Self {
            id: l.id,
            light_type: l.light_type,
            brightness: l.brightness,
            red,
            green,
            blue,
        }
    }
}

impl From<GatewayNode> for Node {
    fn from(n: GatewayNode) -> Self {
        let (red, green, blue) = channels(n.state.color);
        let mode = parse_mode(n.state.mode.as_deref(), &n.id);

        Self {
            id: NodeId::new(n.id),
            name: n.name,
            node_type: n.node_type,
            features: NodeFeatures {
                count: n.features.count,
                addressable: n.features.addressable,
                color: n.features.color,
                animatable: n.features.animatable,
            },
            lights: n.lights.into_iter().map(Light::from).collect(),
            state: ReportedState {
                mode,
                brightness: n.state.brightness,
                red,
                green,
                blue,
            },
        }
    }
}

// ── Store projections ──────────────────────────────────────────────

impl From<&Node> for NodeValue {
    /// Project the reported state into the editable record.
    fn from(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            mode: node.state.mode,
            brightness: node.state.brightness,
            red: node.state.red,
            green: node.state.green,
            blue: node.state.blue,
        }
    }
}

/// Project one reported light into its editable record.
pub(crate) fn light_value(node: &Node, light: &Light) -> LightValue {
    LightValue {
        id: node.light_key(light),
        light_type: light.light_type.clone(),
        brightness: light.brightness,
        red: light.red,
        green: light.green,
        blue: light.blue,
    }
}

// ── Writes ─────────────────────────────────────────────────────────

/// Sparse node write: only the fields present in `patch` are sent.
pub fn node_write_body(node_id: &NodeId, patch: &ValuesPatch) -> NodeWriteBody {
    NodeWriteBody {
        id: node_id.to_string(),
        state: NodeState {
            mode: patch.mode.map(|m| m.to_string()),
            brightness: patch.brightness,
            color: color_of(patch),
        },
    }
}

/// Single-light write, switching the node to `INDIVIDUAL` mode.
pub fn light_write_body(
    node_id: &NodeId,
    light_key: &LightKey,
    patch: &ValuesPatch,
) -> LightWriteBody {
    LightWriteBody::single(
        node_id.as_str(),
        IndividualLight {
            id: light_key.local_id(node_id).to_owned(),
            brightness: patch.brightness,
            color: color_of(patch),
        },
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn gateway_node(value: serde_json::Value) -> GatewayNode {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn node_conversion_parses_mode_and_color() {
        let node = Node::from(gateway_node(json!({
            "id": "n1",
            "name": "Desk",
            "type": "ledstrip",
            "features": { "count": 1, "color": true },
            "lights": [{ "id": "0", "type": "rgb", "color": { "blue": 4 } }],
            "state": { "mode": "EXTERNAL", "color": { "red": 10, "green": 20, "blue": 30 } }
        })));

        assert_eq!(node.state.mode, Some(Mode::External));
        assert_eq!(
            (node.state.red, node.state.green, node.state.blue),
            (Some(10), Some(20), Some(30))
        );
        assert_eq!(node.lights[0].blue, Some(4));
        assert!(node.supports_color());
    }

    #[test]
    fn unknown_mode_is_dropped() {
        let node = Node::from(gateway_node(json!({
            "id": "n1",
            "state": { "mode": "DISCO", "brightness": 3 }
        })));
        assert_eq!(node.state.mode, None);
        assert_eq!(node.state.brightness, Some(3));
    }

    #[test]
    fn node_value_projection_keeps_absent_channels_unset() {
        let node = Node::from(gateway_node(json!({
            "id": "n1",
            "state": { "mode": "SINGLE", "brightness": 100 },
            "features": { "color": true }
        })));

        assert_eq!(
            NodeValue::from(&node),
            NodeValue {
                id: NodeId::from("n1"),
                mode: Some(Mode::Single),
                brightness: Some(100),
                red: None,
                green: None,
                blue: None,
            }
        );
    }

    #[test]
    fn node_write_body_is_sparse() {
        let body = node_write_body(
            &NodeId::from("n1"),
            &ValuesPatch::default().mode(Mode::Single).green(8),
        );
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "id": "n1", "state": { "mode": "SINGLE", "color": { "green": 8 } } })
        );
    }

    #[test]
    fn light_write_body_uses_local_light_id() {
        let node_id = NodeId::from("strip-2");
        let key = LightKey::new(&node_id, "11");
        let body = light_write_body(&node_id, &key, &ValuesPatch::default().brightness(99));

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "id": "strip-2",
                "state": { "mode": "INDIVIDUAL" },
                "individualData": [{ "id": "11", "brightness": 99 }]
            })
        );
    }
}
