// Gateway wire types
//
// Shapes exchanged with the gateway, kept close to the JSON on the wire.
// The gateway is lenient about which fields it reports, so nearly every
// field defaults when absent. Write bodies are sparse: unset fields are
// omitted rather than sent as `null`.

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

// ── Reads ───────────────────────────────────────────────────────────

/// Response envelope of `GET /lights/nodes`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodesResponse {
    #[serde(default)]
    pub nodes: Vec<GatewayNode>,
}

/// One controllable node as reported by the gateway.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GatewayNode {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub features: NodeFeatures,
    #[serde(default)]
    pub lights: Vec<GatewayLight>,
    #[serde(default)]
    pub state: NodeState,
}

/// Capability flags of a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeFeatures {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub addressable: bool,
    #[serde(default)]
    pub color: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animatable: Option<bool>,
}

/// One addressable light inside a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayLight {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, rename = "type")]
    pub light_type: String,
    #[serde(
        default,
        deserialize_with = "lenient_channel",
        skip_serializing_if = "Option::is_none"
    )]
    pub brightness: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<RgbColor>,
}

// ── Shared ──────────────────────────────────────────────────────────

/// Node state, used both for reported state and for sparse writes.
///
/// `mode` stays a plain string on the wire; `tlight-core` maps it onto
/// its closed mode enum.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_channel",
        skip_serializing_if = "Option::is_none"
    )]
    pub brightness: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<RgbColor>,
}

/// Sparse RGB triple.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RgbColor {
    #[serde(
        default,
        deserialize_with = "lenient_channel",
        skip_serializing_if = "Option::is_none"
    )]
    pub red: Option<u8>,
    #[serde(
        default,
        deserialize_with = "lenient_channel",
        skip_serializing_if = "Option::is_none"
    )]
    pub green: Option<u8>,
    #[serde(
        default,
        deserialize_with = "lenient_channel",
        skip_serializing_if = "Option::is_none"
    )]
    pub blue: Option<u8>,
}

impl RgbColor {
    /// `None` when no channel is set, so the `color` key is omitted entirely.
    pub fn non_empty(self) -> Option<Self> {
        (self.red.is_some() || self.green.is_some() || self.blue.is_some()).then_some(self)
    }
}

// ── Writes ──────────────────────────────────────────────────────────

/// Body of `POST /lights/nodes/{nodeId}` for node-level changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeWriteBody {
    pub id: String,
    pub state: NodeState,
}

/// Body of `POST /lights/nodes/{nodeId}` for per-light changes.
///
/// `state.mode` is always `INDIVIDUAL`; the gateway switches the node into
/// per-light mode as part of the write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightWriteBody {
    pub id: String,
    pub state: NodeState,
    #[serde(rename = "individualData")]
    pub individual_data: Vec<IndividualLight>,
}

/// One entry of `individualData`. `id` is the light id local to its node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndividualLight {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<RgbColor>,
}

impl LightWriteBody {
    /// Wire name of the per-light operating mode.
    pub const INDIVIDUAL_MODE: &'static str = "INDIVIDUAL";

    /// Build a single-light write for `node_id`.
    pub fn single(node_id: impl Into<String>, light: IndividualLight) -> Self {
        Self {
            id: node_id.into(),
            state: NodeState {
                mode: Some(Self::INDIVIDUAL_MODE.to_owned()),
                brightness: None,
                color: None,
            },
            individual_data: vec![light],
        }
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

/// Gateways written against different firmware report ids either as
/// strings or as bare numbers. Both are normalized to a string.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Str(String),
        Num(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Str(s) => s,
        RawId::Num(n) => n.to_string(),
    })
}

/// Channel values are 0-255. Gateways occasionally report values outside
/// that range; those are clamped instead of failing the whole node list.
/// Non-integer values are dropped.
fn lenient_channel<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::Number(n)) if n.is_i64() || n.is_u64() => {
            let value = n.as_i64().unwrap_or(i64::MAX);
            let clamped = u8::try_from(value.clamp(0, 255)).unwrap_or(u8::MAX);
            if i64::from(clamped) != value {
                warn!(value = %n, clamped, "channel value out of range");
            }
            Some(clamped)
        }
        Some(other) => {
            warn!(value = %other, "ignoring non-integer channel value");
            None
        }
    })
}
