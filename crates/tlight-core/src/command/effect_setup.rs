// ── Effect parameter assembly ──
//
// Turns a configured effect into the parameter object the gateway's
// plugin source endpoint expects.

use serde_json::Value;

use crate::error::CoreError;
use crate::model::ConfiguredEffect;
use crate::model::effect::empty_properties;
use crate::schema::path::join;
use crate::schema::{ROOT_TOKEN, deep_get, deep_set};

const EFFECT_OPTS: &str = "pluginOpts.effectOpts";

/// Light count of an RGB fixture driven as three plain channels.
const RGB_LIGHT_COUNT: i64 = 3;

/// Build the plugin source parameters for `effect`.
///
/// The object is a copy of the effect's `effect` tree with `name` set to
/// the effect type. When `colors` is given it is injected as-is. A
/// three-light node without color support gets its start and end
/// brightness arrays derived from the start and end colors.
pub fn effect_params(effect: &ConfiguredEffect, colors: Option<bool>) -> Result<Value, CoreError> {
    let effect_type = effect.effect_type.ok_or_else(|| {
        CoreError::validation(format!("effect {} has no type selected", effect.id))
    })?;

    let mut params = deep_get(&effect.effect_properties, ROOT_TOKEN)
        .filter(|tree| tree.is_object())
        .cloned()
        .unwrap_or_else(empty_properties);

    if let Some(colors) = colors {
        deep_set(&mut params, "colors", Value::Bool(colors));
    }

    let light_count = deep_get(&params, "lightCount").and_then(Value::as_i64);
    if colors == Some(false) && light_count == Some(RGB_LIGHT_COUNT) {
        derive_brightness(&mut params, "startColor", "startBrightness");
        derive_brightness(&mut params, "endColor", "endBrightness");
    }

    deep_set(&mut params, "name", Value::String(effect_type.to_string()));
    Ok(params)
}

fn derive_brightness(params: &mut Value, color: &str, brightness: &str) {
    let color = join(EFFECT_OPTS, color);
    let channels = ["red", "green", "blue"]
        .iter()
        .map(|channel| {
            deep_get(params, &join(&color, channel))
                .cloned()
                .unwrap_or(Value::Null)
        })
        .collect();
    deep_set(params, &join(EFFECT_OPTS, brightness), Value::Array(channels));
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::model::{EffectId, EffectType};

    fn smooth_colors(light_count: u8) -> ConfiguredEffect {
        let mut effect = ConfiguredEffect::new(EffectId::from("e1"));
        effect.effect_type = Some(EffectType::SmoothColors);
        effect.effect_properties = json!({
            "effect": {
                "lightCount": light_count,
                "colors": true,
                "pluginOpts": {
                    "startChannel": 1,
                    "effectOpts": {
                        "duration": 5,
                        "startColor": { "red": 10, "green": 20, "blue": 30 },
                        "endColor": { "red": 40, "green": 50, "blue": 60 },
                        "startBrightness": [0, 0, 0],
                        "endBrightness": [0, 0, 0]
                    }
                }
            }
        });
        effect
    }

    #[test]
    fn name_is_the_effect_type() {
        let params = effect_params(&smooth_colors(1), None).unwrap();
        assert_eq!(params["name"], json!("SmoothColors"));
        assert_eq!(params["colors"], json!(true));
        assert_eq!(params["pluginOpts"]["effectOpts"]["duration"], json!(5));
    }

    #[test]
    fn sacn_name_uses_wire_spelling() {
        let mut effect = ConfiguredEffect::new(EffectId::from("e2"));
        effect.effect_type = Some(EffectType::Sacn);
        let params = effect_params(&effect, Some(true)).unwrap();
        assert_eq!(params, json!({ "colors": true, "name": "sACN" }));
    }

    #[test]
    fn colorless_three_light_nodes_get_brightness_from_colors() {
        let params = effect_params(&smooth_colors(3), Some(false)).unwrap();
        let opts = &params["pluginOpts"]["effectOpts"];

        assert_eq!(params["colors"], json!(false));
        assert_eq!(opts["startBrightness"], json!([10, 20, 30]));
        assert_eq!(opts["endBrightness"], json!([40, 50, 60]));
    }

    #[test]
    fn other_light_counts_keep_brightness_arrays() {
        let params = effect_params(&smooth_colors(4), Some(false)).unwrap();
        assert_eq!(
            params["pluginOpts"]["effectOpts"]["startBrightness"],
            json!([0, 0, 0])
        );
    }

    #[test]
    fn untyped_effect_is_rejected() {
        let effect = ConfiguredEffect::new(EffectId::from("e3"));
        let err = effect_params(&effect, None).unwrap_err();
        assert!(matches!(err, CoreError::ValidationFailed { .. }));
    }

    #[test]
    fn stored_properties_are_not_modified() {
        let effect = smooth_colors(3);
        let before = effect.effect_properties.clone();
        effect_params(&effect, Some(false)).unwrap();
        assert_eq!(effect.effect_properties, before);
    }
}
