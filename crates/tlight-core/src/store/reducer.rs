// ── Reducers ──
//
// Pure state transitions. Each slice handles the actions it cares about
// and ignores the rest; `reduce` fans an action out to every slice.

use indexmap::IndexMap;

use super::action::Action;
use super::effects;
use super::state::StoreState;
use crate::convert::light_value;
use crate::model::{LightValue, NodeValue};

/// Apply `action` to `state` in place.
pub(crate) fn reduce(state: &mut StoreState, action: &Action) {
    nodes(state, action);
    values(state, action);
    effects::reduce(&mut state.effects, &state.nodes, action);
    preferences(state, action);
}

// ── nodes ──────────────────────────────────────────────────────────

fn nodes(state: &mut StoreState, action: &Action) {
    if let Action::NodesReceived { nodes } = action {
        state.nodes = nodes.iter().map(|n| (n.id.clone(), n.clone())).collect();
    }
}

// ── node values / light values ─────────────────────────────────────

fn values(state: &mut StoreState, action: &Action) {
    match action {
        Action::NodesReceived { nodes } => {
            state.node_values = nodes
                .iter()
                .map(|n| (n.id.clone(), NodeValue::from(n)))
                .collect();

            state.light_values = nodes
                .iter()
                .map(|node| {
                    let lights: IndexMap<_, _> = node
                        .lights
                        .iter()
                        .map(|light| {
                            let value = light_value(node, light);
                            (value.id.clone(), value)
                        })
                        .collect();
                    (node.id.clone(), lights)
                })
                .collect();
        }
        Action::NodeValuesChanged { node_id, patch } => {
            state
                .node_values
                .entry(node_id.clone())
                .or_insert_with(|| NodeValue::empty(node_id.clone()))
                .merge(patch);
        }
        Action::LightValuesChanged {
            node_id,
            light_key,
            patch,
        } => {
            state
                .light_values
                .entry(node_id.clone())
                .or_default()
                .entry(light_key.clone())
                .or_insert_with(|| LightValue::empty(light_key.clone()))
                .merge(patch);
        }
        _ => {}
    }
}

// ── preferences ────────────────────────────────────────────────────

fn preferences(state: &mut StoreState, action: &Action) {
    match action {
        Action::CardPreferenceSet {
            entity_id,
            preference,
        } => {
            state
                .preferences
                .entry(entity_id.clone())
                .or_default()
                .apply(*preference);
        }
        Action::StateRestored { preferences, .. } => {
            state.preferences.clone_from(preferences);
        }
        _ => {}
    }
}
