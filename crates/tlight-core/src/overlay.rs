// ── Display overlay ──
//
// In-flight edits are shown immediately but never written to the store
// until the gateway accepts them. The overlay keeps those transient values
// per node and per light, layered over the committed values on read.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::model::{LightKey, LightValue, NodeId, NodeValue, ValueField, ValuesPatch};

#[derive(Default)]
pub struct DisplayOverlay {
    nodes: Mutex<HashMap<NodeId, ValuesPatch>>,
    lights: Mutex<HashMap<LightKey, ValuesPatch>>,
}

impl DisplayOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Nodes ────────────────────────────────────────────────────────

    pub fn stage_node(&self, node_id: &NodeId, patch: &ValuesPatch) {
        let mut nodes = self.nodes.lock().unwrap_or_else(PoisonError::into_inner);
        nodes.entry(node_id.clone()).or_default().merge_from(patch);
    }

    pub fn clear_node(&self, node_id: &NodeId, fields: &[ValueField]) {
        let mut nodes = self.nodes.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(staged) = nodes.get_mut(node_id) {
            staged.clear(fields);
            if staged.is_empty() {
                nodes.remove(node_id);
            }
        }
    }

    /// `committed` with any in-flight edits applied on top.
    pub fn node_view(&self, node_id: &NodeId, committed: Option<NodeValue>) -> Option<NodeValue> {
        let nodes = self.nodes.lock().unwrap_or_else(PoisonError::into_inner);
        match (committed, nodes.get(node_id)) {
            (Some(mut value), Some(staged)) => {
                value.merge(staged);
                Some(value)
            }
            (committed, _) => committed,
        }
    }

    // ── Lights ───────────────────────────────────────────────────────

    pub fn stage_light(&self, light_key: &LightKey, patch: &ValuesPatch) {
        let mut lights = self.lights.lock().unwrap_or_else(PoisonError::into_inner);
        lights.entry(light_key.clone()).or_default().merge_from(patch);
    }

    pub fn clear_light(&self, light_key: &LightKey, fields: &[ValueField]) {
        let mut lights = self.lights.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(staged) = lights.get_mut(light_key) {
            staged.clear(fields);
            if staged.is_empty() {
                lights.remove(light_key);
            }
        }
    }

    pub fn light_view(
        &self,
        light_key: &LightKey,
        committed: Option<LightValue>,
    ) -> Option<LightValue> {
        let lights = self.lights.lock().unwrap_or_else(PoisonError::into_inner);
        match (committed, lights.get(light_key)) {
            (Some(mut value), Some(staged)) => {
                value.merge(staged);
                Some(value)
            }
            (committed, _) => committed,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn staged_edit_shows_over_committed_value() {
        let overlay = DisplayOverlay::new();
        let id = NodeId::from("n1");
        let mut committed = NodeValue::empty(id.clone());
        committed.brightness = Some(10);
        committed.red = Some(1);

        overlay.stage_node(&id, &ValuesPatch::default().brightness(200));
        let view = overlay.node_view(&id, Some(committed.clone())).unwrap();
        assert_eq!(view.brightness, Some(200));
        assert_eq!(view.red, Some(1));

        overlay.clear_node(&id, &[ValueField::Brightness]);
        assert_eq!(overlay.node_view(&id, Some(committed.clone())), Some(committed));
    }

    #[test]
    fn clearing_one_field_keeps_the_others() {
        let overlay = DisplayOverlay::new();
        let key = LightKey::from("n1-0");
        overlay.stage_light(&key, &ValuesPatch::default().color(1, 2, 3));
        overlay.clear_light(&key, &[ValueField::Red]);

        let view = overlay
            .light_view(&key, Some(LightValue::empty(key.clone())))
            .unwrap();
        assert_eq!((view.red, view.green, view.blue), (None, Some(2), Some(3)));
    }

    #[test]
    fn unknown_entity_has_no_view() {
        let overlay = DisplayOverlay::new();
        let id = NodeId::from("ghost");
        overlay.stage_node(&id, &ValuesPatch::default().brightness(1));
        assert_eq!(overlay.node_view(&id, None), None);
    }
}
