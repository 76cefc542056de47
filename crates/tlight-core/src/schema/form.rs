// ── Schema-driven form tree ──
//
// Walks a property schema together with an effect's current values and
// produces a declarative tree of editors. Renderers (the CLI today) only
// interpret this tree; they never look at the schema themselves.

use serde::Serialize;
use serde_json::Value;

use super::path::{ROOT_TOKEN, deep_get, join};
use super::{MAX_VALUE, MIN_VALUE, PropertyDescriptor, PropertyKind};
use crate::model::ColorEditMode;

const COLOR_CHANNELS: [&str; 3] = ["red", "green", "blue"];

/// One editor in the form tree. Every node carries its full deep path.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "editor", rename_all = "snake_case")]
pub enum FormNode {
    IntSlider {
        path: String,
        label: String,
        description: String,
        min: i64,
        max: i64,
        value: i64,
    },
    Color {
        path: String,
        label: String,
        description: String,
        mode: ColorEditMode,
        red: i64,
        green: i64,
        blue: i64,
    },
    Group {
        path: String,
        label: String,
        description: String,
        children: Vec<FormNode>,
    },
    /// Kinds without an editor (bool, array). Shown as a placeholder.
    Unsupported {
        path: String,
        label: String,
        kind: &'static str,
    },
    /// A malformed descriptor, rendered in place of its control so that
    /// sibling properties still render.
    SchemaError {
        path: String,
        label: String,
        message: String,
    },
}

impl FormNode {
    pub fn path(&self) -> &str {
        match self {
            Self::IntSlider { path, .. }
            | Self::Color { path, .. }
            | Self::Group { path, .. }
            | Self::Unsupported { path, .. }
            | Self::SchemaError { path, .. } => path,
        }
    }
}

/// Build the form for `schema`, reading current values from `values`
/// (an effect's property tree, rooted at `effect`).
///
/// Missing values fall back to the schema defaults.
pub fn build_form(
    schema: &[PropertyDescriptor],
    values: &Value,
    color_mode: ColorEditMode,
) -> Vec<FormNode> {
    walk(schema, ROOT_TOKEN, values, color_mode)
}

fn walk(
    properties: &[PropertyDescriptor],
    parent: &str,
    values: &Value,
    color_mode: ColorEditMode,
) -> Vec<FormNode> {
    properties
        .iter()
        .map(|property| node_for(property, &join(parent, &property.name), values, color_mode))
        .collect()
}

fn node_for(
    property: &PropertyDescriptor,
    path: &str,
    values: &Value,
    color_mode: ColorEditMode,
) -> FormNode {
    let label = property.name.clone();
    let description = property.description.clone();

    match &property.kind {
        PropertyKind::Int { min, max, .. } => FormNode::IntSlider {
            path: path.to_owned(),
            label,
            description,
            min: min.unwrap_or(MIN_VALUE),
            max: max.unwrap_or(MAX_VALUE),
            value: int_at(values, path, property),
        },
        PropertyKind::Bool | PropertyKind::Array => FormNode::Unsupported {
            path: path.to_owned(),
            label,
            kind: property.kind.label(),
        },
        PropertyKind::Object { properties } => FormNode::Group {
            path: path.to_owned(),
            label,
            description,
            children: walk(properties, path, values, color_mode),
        },
        PropertyKind::Color { properties } => {
            let channels: Vec<&PropertyDescriptor> = COLOR_CHANNELS
                .iter()
                .filter_map(|c| properties.iter().find(|p| p.name == *c))
                .collect();

            let [red, green, blue] = channels.as_slice() else {
                return FormNode::SchemaError {
                    path: path.to_owned(),
                    label,
                    message: format!(
                        "color property `{}` must define red, green and blue",
                        property.name
                    ),
                };
            };

            FormNode::Color {
                path: path.to_owned(),
                label,
                description,
                mode: color_mode,
                red: int_at(values, &join(path, "red"), red),
                green: int_at(values, &join(path, "green"), green),
                blue: int_at(values, &join(path, "blue"), blue),
            }
        }
    }
}

fn int_at(values: &Value, path: &str, property: &PropertyDescriptor) -> i64 {
    deep_get(values, path)
        .and_then(Value::as_i64)
        .or_else(|| property.default_value().as_i64())
        .unwrap_or(0)
}
