// ── Store state tree ──
//
// Plain owned data. The DataStore wraps it in an `Arc` and clones on write,
// so a snapshot handed to a reader never changes under it.

use indexmap::IndexMap;
use serde::Serialize;

use crate::model::{
    CardPreferences, ConfiguredEffect, EffectAssignment, EffectId, LightKey, LightValue, Node,
    NodeId, NodeValue,
};

/// The whole normalized state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreState {
    /// Nodes in gateway order.
    pub nodes: IndexMap<NodeId, Node>,
    pub node_values: IndexMap<NodeId, NodeValue>,
    /// node id → light key → values.
    pub light_values: IndexMap<NodeId, IndexMap<LightKey, LightValue>>,
    pub effects: EffectsState,
    /// Keyed by entity id (node id or light key).
    pub preferences: IndexMap<String, CardPreferences>,
}

/// Configured effects and which effect each node runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectsState {
    /// In creation order.
    pub configured_effects: Vec<ConfiguredEffect>,
    pub effects_in_use_per_node: IndexMap<NodeId, EffectAssignment>,
}

impl EffectsState {
    pub fn get(&self, id: &EffectId) -> Option<&ConfiguredEffect> {
        self.configured_effects.iter().find(|e| &e.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: &EffectId) -> Option<&mut ConfiguredEffect> {
        self.configured_effects.iter_mut().find(|e| &e.id == id)
    }
}

impl StoreState {
    pub fn light_value(&self, node_id: &NodeId, light_key: &LightKey) -> Option<&LightValue> {
        self.light_values.get(node_id)?.get(light_key)
    }

    /// Preferences of one card, defaulted when none were stored.
    pub fn card_preferences(&self, entity_id: &str) -> CardPreferences {
        self.preferences.get(entity_id).cloned().unwrap_or_default()
    }
}
