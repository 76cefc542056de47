// ── Store actions ──
//
// Every state transition is one `Action`. Actions carry everything the
// reducer needs (including freshly generated ids) so reduction stays pure.

use indexmap::IndexMap;
use serde_json::Value;

use crate::model::{
    CardPreference, CardPreferences, ConfiguredEffect, EffectId, EffectType, LightKey, Node,
    NodeId, ValuesPatch,
};

/// A state transition of the [`DataStore`](super::DataStore).
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // ── Gateway data ─────────────────────────────────────────────────
    /// Full node list from the gateway. Replaces nodes, node values and
    /// light values, and resets every effect assignment.
    NodesReceived { nodes: Vec<Node> },

    NodeValuesChanged {
        node_id: NodeId,
        patch: ValuesPatch,
    },

    LightValuesChanged {
        node_id: NodeId,
        light_key: LightKey,
        patch: ValuesPatch,
    },

    // ── Effects ──────────────────────────────────────────────────────
    EffectCreated { id: EffectId },

    EffectNameSet { id: EffectId, name: String },

    /// Change the effect type and reset its properties to `{}`.
    EffectTypeSet {
        id: EffectId,
        effect_type: Option<EffectType>,
    },

    /// Deep-set `value` at dot-separated `path` inside the effect's
    /// property tree. An empty path replaces the whole tree.
    EffectPropertySet {
        id: EffectId,
        path: String,
        value: Value,
    },

    EffectDeleted { id: EffectId },

    EffectSelected {
        node_id: NodeId,
        effect_id: EffectId,
    },

    // ── Preferences ──────────────────────────────────────────────────
    CardPreferenceSet {
        entity_id: String,
        preference: CardPreference,
    },

    // ── Persistence ──────────────────────────────────────────────────
    /// Replace effects and preferences with a previously persisted copy.
    StateRestored {
        effects: Vec<ConfiguredEffect>,
        preferences: IndexMap<String, CardPreferences>,
    },
}

impl Action {
    /// Create a new effect with a freshly generated id.
    pub fn create_effect() -> Self {
        Self::EffectCreated {
            id: EffectId::generate(),
        }
    }

    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NodesReceived { .. } => "nodesReceived",
            Self::NodeValuesChanged { .. } => "nodeValuesChanged",
            Self::LightValuesChanged { .. } => "lightValuesChanged",
            Self::EffectCreated { .. } => "effectCreated",
            Self::EffectNameSet { .. } => "effectNameSet",
            Self::EffectTypeSet { .. } => "effectTypeSet",
            Self::EffectPropertySet { .. } => "effectPropertySet",
            Self::EffectDeleted { .. } => "effectDeleted",
            Self::EffectSelected { .. } => "effectSelected",
            Self::CardPreferenceSet { .. } => "cardPreferenceSet",
            Self::StateRestored { .. } => "stateRestored",
        }
    }
}
