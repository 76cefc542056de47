// ── Node domain types ──
//
// Nodes are stored wholesale as reported by the gateway. User-editable
// values live separately in `NodeValue` / `LightValue`.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use super::ids::{LightKey, NodeId};

/// Operating mode of a node.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Mode {
    /// One color/brightness for the whole node.
    Single,
    /// Driven by an effect source.
    External,
    /// Per-light control.
    Individual,
    /// Device-native animation.
    Animation,
}

/// Capability flags reported by the gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeFeatures {
    pub count: u32,
    pub addressable: bool,
    pub color: bool,
    pub animatable: Option<bool>,
}

/// Last state the gateway reported for a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportedState {
    pub mode: Option<Mode>,
    pub brightness: Option<u8>,
    pub red: Option<u8>,
    pub green: Option<u8>,
    pub blue: Option<u8>,
}

/// One addressable light inside a node, as reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Light {
    /// Id local to the owning node.
    pub id: String,
    pub light_type: String,
    pub brightness: Option<u8>,
    pub red: Option<u8>,
    pub green: Option<u8>,
    pub blue: Option<u8>,
}

/// A controllable lighting device or group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub node_type: String,
    pub features: NodeFeatures,
    pub lights: Vec<Light>,
    pub state: ReportedState,
}

impl Node {
    /// Store key of the given light of this node.
    pub fn light_key(&self, light: &Light) -> LightKey {
        LightKey::new(&self.id, &light.id)
    }

    pub fn supports_color(&self) -> bool {
        self.features.color
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn mode_wire_names() {
        assert_eq!(Mode::Individual.to_string(), "INDIVIDUAL");
        assert_eq!(Mode::from_str("EXTERNAL").unwrap(), Mode::External);
        assert_eq!(Mode::from_str("single").unwrap(), Mode::Single);
        assert!(Mode::from_str("STROBE").is_err());
        assert_eq!(
            serde_json::to_value(Mode::Animation).unwrap(),
            serde_json::json!("ANIMATION")
        );
    }
}
