//! Shared helpers for command handlers.

use serde_json::Value;

use tlight_core::{Controller, EffectId, Node, ValuesPatch};

use crate::cli::ValueArgs;
use crate::error::CliError;

/// Resolve a node identifier (ID or exact name) via snapshot lookup.
pub fn resolve_node(controller: &Controller, identifier: &str) -> Result<Node, CliError> {
    let snap = controller.snapshot();
    snap.nodes
        .values()
        .find(|n| n.id.as_str() == identifier)
        .or_else(|| snap.nodes.values().find(|n| n.name == identifier))
        .cloned()
        .ok_or_else(|| CliError::NotFound {
            resource_type: "node".into(),
            identifier: identifier.into(),
            list_command: "nodes list".into(),
        })
}

/// Resolve an effect identifier: a full ID, a unique ID prefix, or an
/// exact name.
pub fn resolve_effect(controller: &Controller, identifier: &str) -> Result<EffectId, CliError> {
    let snap = controller.snapshot();
    let effects = &snap.effects.configured_effects;

    if let Some(effect) = effects.iter().find(|e| e.id.as_str() == identifier) {
        return Ok(effect.id.clone());
    }
    let by_prefix: Vec<_> = effects
        .iter()
        .filter(|e| e.id.as_str().starts_with(identifier))
        .collect();
    if let [only] = by_prefix.as_slice() {
        return Ok(only.id.clone());
    }
    if by_prefix.len() > 1 {
        return Err(CliError::Validation {
            field: "effect".into(),
            reason: format!("'{identifier}' matches {} effects", by_prefix.len()),
        });
    }
    if let Some(effect) = effects.iter().find(|e| e.name == identifier) {
        return Ok(effect.id.clone());
    }

    Err(CliError::NotFound {
        resource_type: "effect".into(),
        identifier: identifier.into(),
        list_command: "effects list".into(),
    })
}

/// Build a values patch from `--brightness` / `--rgb` / channel flags.
pub fn values_patch(args: &ValueArgs) -> ValuesPatch {
    let mut patch = ValuesPatch::default();
    if let Some(brightness) = args.brightness {
        patch = patch.brightness(brightness);
    }
    if let Some((r, g, b)) = args.rgb {
        patch = patch.color(r, g, b);
    }
    if let Some(red) = args.red {
        patch = patch.red(red);
    }
    if let Some(green) = args.green {
        patch = patch.green(green);
    }
    if let Some(blue) = args.blue {
        patch = patch.blue(blue);
    }
    patch
}

/// Parse a property value given on the command line. Valid JSON is taken
/// as-is; anything else becomes a string.
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()))
}

/// Render an optional color triple.
pub fn rgb(red: Option<u8>, green: Option<u8>, blue: Option<u8>) -> Option<(u8, u8, u8)> {
    Some((red?, green?, blue?))
}

pub fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".into(), |v| v.to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn values_patch_from_flags() {
        let args = ValueArgs {
            brightness: Some(10),
            rgb: None,
            red: Some(1),
            green: None,
            blue: None,
        };
        assert_eq!(
            values_patch(&args),
            ValuesPatch::default().brightness(10).red(1)
        );
    }

    #[test]
    fn property_values_prefer_json() {
        assert_eq!(parse_value("20"), json!(20));
        assert_eq!(parse_value("true"), json!(true));
        assert_eq!(parse_value(r#"{"red":1}"#), json!({ "red": 1 }));
        assert_eq!(parse_value("warm white"), json!("warm white"));
    }

    #[test]
    fn partial_colors_render_as_missing() {
        assert_eq!(rgb(Some(1), Some(2), Some(3)), Some((1, 2, 3)));
        assert_eq!(rgb(Some(1), None, Some(3)), None);
    }
}
