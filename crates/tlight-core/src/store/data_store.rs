// ── Central reactive data store ──
//
// Holds the whole state tree behind a single `watch` channel. Every action
// is reduced inside `send_modify`, so transitions are serialized and a
// subscriber only ever sees complete states. Reducers mutate a private
// copy (`Arc::make_mut`) whenever a reader still holds the old snapshot.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::trace;

use super::action::Action;
use super::reducer;
use super::state::StoreState;
use crate::model::{
    ConfiguredEffect, EffectAssignment, EffectId, LightKey, LightValue, Node, NodeId, NodeValue,
};
use crate::stream::StateStream;

/// Central reactive store for the normalized lighting state.
pub struct DataStore {
    state: watch::Sender<Arc<StoreState>>,
    last_full_refresh: watch::Sender<Option<DateTime<Utc>>>,
}

impl DataStore {
    pub fn new() -> Self {
        Self::with_state(StoreState::default())
    }

    pub fn with_state(state: StoreState) -> Self {
        let (state, _) = watch::channel(Arc::new(state));
        let (last_full_refresh, _) = watch::channel(None);
        Self {
            state,
            last_full_refresh,
        }
    }

    // ── Mutation ─────────────────────────────────────────────────────

    /// Reduce `action` into the state and notify subscribers.
    pub fn dispatch(&self, action: &Action) {
        trace!(action = action.name(), "reducing store action");
        self.state.send_modify(|state| {
            reducer::reduce(Arc::make_mut(state), action);
        });
        if matches!(action, Action::NodesReceived { .. }) {
            self.last_full_refresh.send_replace(Some(Utc::now()));
        }
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    /// Current state. The returned snapshot never changes.
    pub fn snapshot(&self) -> Arc<StoreState> {
        self.state.borrow().clone()
    }

    pub fn nodes_snapshot(&self) -> Vec<Node> {
        self.state.borrow().nodes.values().cloned().collect()
    }

    pub fn effects_snapshot(&self) -> Vec<ConfiguredEffect> {
        self.state.borrow().effects.configured_effects.clone()
    }

    // ── Single-entity lookups ────────────────────────────────────────

    pub fn node(&self, id: &NodeId) -> Option<Node> {
        self.state.borrow().nodes.get(id).cloned()
    }

    pub fn node_value(&self, id: &NodeId) -> Option<NodeValue> {
        self.state.borrow().node_values.get(id).cloned()
    }

    pub fn light_value(&self, node_id: &NodeId, light_key: &LightKey) -> Option<LightValue> {
        self.state.borrow().light_value(node_id, light_key).cloned()
    }

    pub fn effect(&self, id: &EffectId) -> Option<ConfiguredEffect> {
        self.state.borrow().effects.get(id).cloned()
    }

    pub fn assignment(&self, node_id: &NodeId) -> Option<EffectAssignment> {
        self.state
            .borrow()
            .effects
            .effects_in_use_per_node
            .get(node_id)
            .cloned()
    }

    // ── Count accessors ──────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.state.borrow().nodes.len()
    }

    pub fn effect_count(&self) -> usize {
        self.state.borrow().effects.configured_effects.len()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe(&self) -> StateStream {
        StateStream::new(self.state.subscribe())
    }

    // ── Metadata ─────────────────────────────────────────────────────

    pub fn last_full_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_full_refresh.borrow()
    }

    /// How long ago the node list was last received, or `None` if never.
    pub fn data_age(&self) -> Option<chrono::Duration> {
        self.last_full_refresh().map(|t| Utc::now() - t)
    }
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}
