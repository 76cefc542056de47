// ── Effects slice ──
//
// Configured effects are local-only records; assignments mirror the node
// list and are rebuilt (unassigned) on every node list received.

use indexmap::IndexMap;

use super::action::Action;
use super::state::EffectsState;
use crate::model::{ConfiguredEffect, EffectAssignment, Node, NodeId, effect::empty_properties};
use crate::schema::deep_set;

pub(crate) fn reduce(state: &mut EffectsState, nodes: &IndexMap<NodeId, Node>, action: &Action) {
    match action {
        Action::NodesReceived { .. } => {
            // `nodes` already holds the new list: the nodes slice runs first.
            state.effects_in_use_per_node = nodes
                .values()
                .map(|node| {
                    (
                        node.id.clone(),
                        EffectAssignment {
                            node_id: node.id.clone(),
                            node_name: node.name.clone(),
                            effect_id: None,
                        },
                    )
                })
                .collect();
        }
        Action::EffectCreated { id } => {
            if state.get(id).is_none() {
                state.configured_effects.push(ConfiguredEffect::new(id.clone()));
            }
        }
        Action::EffectNameSet { id, name } => {
            if let Some(effect) = state.get_mut(id) {
                effect.name.clone_from(name);
            }
        }
        Action::EffectTypeSet { id, effect_type } => {
            if let Some(effect) = state.get_mut(id) {
                effect.effect_type = *effect_type;
                effect.effect_properties = empty_properties();
            }
        }
        Action::EffectPropertySet { id, path, value } => {
            if let Some(effect) = state.get_mut(id) {
                deep_set(&mut effect.effect_properties, path, value.clone());
            }
        }
        Action::EffectDeleted { id } => {
            state.configured_effects.retain(|e| &e.id != id);
        }
        Action::EffectSelected { node_id, effect_id } => {
            if let Some(assignment) = state.effects_in_use_per_node.get_mut(node_id) {
                assignment.effect_id = Some(effect_id.clone());
            }
        }
        Action::StateRestored { effects, .. } => {
            state.configured_effects.clone_from(effects);
        }
        Action::NodeValuesChanged { .. }
        | Action::LightValuesChanged { .. }
        | Action::CardPreferenceSet { .. } => {}
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::model::{
        DEFAULT_EFFECT_NAME, EffectId, EffectType, NodeFeatures, ReportedState,
    };
    use crate::store::reducer::reduce as reduce_all;
    use crate::store::state::StoreState;

    fn node(id: &str) -> Node {
        Node {
            id: NodeId::from(id),
            name: format!("Node {id}"),
            node_type: "dmx".into(),
            features: NodeFeatures::default(),
            lights: Vec::new(),
            state: ReportedState::default(),
        }
    }

    fn with_effect(id: &str) -> StoreState {
        let mut state = StoreState::default();
        reduce_all(&mut state, &Action::EffectCreated { id: id.into() });
        state
    }

    #[test]
    fn created_effect_has_defaults() {
        let state = with_effect("e1");
        let effect = state.effects.get(&EffectId::from("e1")).unwrap();

        assert_eq!(effect.name, DEFAULT_EFFECT_NAME);
        assert_eq!(effect.effect_type, None);
        assert_eq!(effect.effect_properties, json!({}));
    }

    #[test]
    fn effects_keep_creation_order() {
        let mut state = with_effect("b");
        reduce_all(&mut state, &Action::EffectCreated { id: "a".into() });
        reduce_all(&mut state, &Action::EffectCreated { id: "b".into() });

        let ids: Vec<_> = state
            .effects
            .configured_effects
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn type_change_resets_properties() {
        let mut state = with_effect("e1");
        let id = EffectId::from("e1");
        reduce_all(
            &mut state,
            &Action::EffectPropertySet {
                id: id.clone(),
                path: "effect.lightCount".into(),
                value: json!(3),
            },
        );
        reduce_all(
            &mut state,
            &Action::EffectTypeSet {
                id: id.clone(),
                effect_type: Some(EffectType::Sacn),
            },
        );

        let effect = state.effects.get(&id).unwrap();
        assert_eq!(effect.effect_type, Some(EffectType::Sacn));
        assert_eq!(effect.effect_properties, json!({}));
    }

    #[test]
    fn deep_property_set_and_rename() {
        let mut state = with_effect("e1");
        let id = EffectId::from("e1");
        reduce_all(
            &mut state,
            &Action::EffectPropertySet {
                id: id.clone(),
                path: "effect.pluginOpts.effectOpts.duration".into(),
                value: json!(20),
            },
        );
        reduce_all(
            &mut state,
            &Action::EffectNameSet {
                id: id.clone(),
                name: "Sunrise".into(),
            },
        );

        let effect = state.effects.get(&id).unwrap();
        assert_eq!(effect.name, "Sunrise");
        assert_eq!(
            effect.effect_properties,
            json!({ "effect": { "pluginOpts": { "effectOpts": { "duration": 20 } } } })
        );
    }

    #[test]
    fn delete_missing_effect_is_noop() {
        let mut state = with_effect("e1");
        let before = state.clone();
        reduce_all(&mut state, &Action::EffectDeleted { id: "nope".into() });
        assert_eq!(state, before);

        reduce_all(&mut state, &Action::EffectDeleted { id: "e1".into() });
        assert!(state.effects.configured_effects.is_empty());
    }

    #[test]
    fn selection_touches_one_node_only() {
        let mut state = StoreState::default();
        reduce_all(
            &mut state,
            &Action::NodesReceived {
                nodes: vec![node("n1"), node("n2")],
            },
        );
        reduce_all(
            &mut state,
            &Action::EffectSelected {
                node_id: "n1".into(),
                effect_id: "e1".into(),
            },
        );

        let in_use = &state.effects.effects_in_use_per_node;
        assert_eq!(in_use["n1"].effect_id, Some(EffectId::from("e1")));
        assert_eq!(in_use["n1"].node_name, "Node n1");
        assert_eq!(in_use["n2"].effect_id, None);
    }

    #[test]
    fn selection_for_unknown_node_is_ignored() {
        let mut state = StoreState::default();
        reduce_all(
            &mut state,
            &Action::EffectSelected {
                node_id: "ghost".into(),
                effect_id: "e1".into(),
            },
        );
        assert!(state.effects.effects_in_use_per_node.is_empty());
    }

    #[test]
    fn reinitialization_clears_assignments() {
        let mut state = StoreState::default();
        reduce_all(
            &mut state,
            &Action::NodesReceived {
                nodes: vec![node("n1"), node("n2")],
            },
        );
        reduce_all(
            &mut state,
            &Action::EffectSelected {
                node_id: "n1".into(),
                effect_id: "e1".into(),
            },
        );
        reduce_all(
            &mut state,
            &Action::NodesReceived {
                nodes: vec![node("n1"), node("n3")],
            },
        );

        let in_use = &state.effects.effects_in_use_per_node;
        assert_eq!(in_use.len(), 2);
        assert!(in_use.values().all(|a| a.effect_id.is_none()));
    }
}
