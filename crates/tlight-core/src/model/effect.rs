// ── Effect domain types ──

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use super::ids::{EffectId, NodeId};

/// Name given to freshly created effects.
pub const DEFAULT_EFFECT_NAME: &str = "Effect Name";

/// Effect programs the gateway knows how to run.
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
pub enum EffectType {
    /// Streaming Architecture for Control Networks input.
    #[serde(rename = "sACN")]
    #[strum(serialize = "sACN")]
    Sacn,
    SmoothColors,
}

/// A user-authored, typed, parameterized effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfiguredEffect {
    pub id: EffectId,
    pub name: String,
    #[serde(rename = "type")]
    pub effect_type: Option<EffectType>,
    #[serde(default = "empty_properties")]
    pub effect_properties: Value,
}

impl ConfiguredEffect {
    pub fn new(id: EffectId) -> Self {
        Self {
            id,
            name: DEFAULT_EFFECT_NAME.to_owned(),
            effect_type: None,
            effect_properties: empty_properties(),
        }
    }
}

pub(crate) fn empty_properties() -> Value {
    Value::Object(Map::new())
}

/// Which effect (if any) a node is running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectAssignment {
    pub node_id: NodeId,
    pub node_name: String,
    pub effect_id: Option<EffectId>,
}
