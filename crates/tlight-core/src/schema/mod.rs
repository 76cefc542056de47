// ── Effect property schemas ──
//
// Each effect type declares its parameters as a tree of typed property
// descriptors. The tree drives default generation, form building and
// value lookup; the leaf kinds are a closed enum matched exhaustively.

pub mod catalog;
pub mod form;
pub mod path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

pub use catalog::{CatalogEntry, catalog, schema_for};
pub use form::{FormNode, build_form};
pub use path::{ROOT_TOKEN, deep_get, deep_set};

/// Lower bound used by integer editors that declare none.
pub const MIN_VALUE: i64 = 0;
/// Upper bound used by integer editors that declare none.
pub const MAX_VALUE: i64 = 255;

/// One named property of an effect schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
    #[serde(flatten)]
    pub kind: PropertyKind,
}

/// Leaf and container kinds a property can have.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PropertyKind {
    Int {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<i64>,
    },
    Bool,
    Array,
    Object {
        #[serde(default)]
        properties: Vec<PropertyDescriptor>,
    },
    /// An RGB triple; must contain `red`, `green` and `blue` children.
    Color {
        #[serde(default)]
        properties: Vec<PropertyDescriptor>,
    },
}

impl PropertyKind {
    /// Lowercase kind name, as it appears in serialized schemas.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Int { .. } => "int",
            Self::Bool => "bool",
            Self::Array => "array",
            Self::Object { .. } => "object",
            Self::Color { .. } => "color",
        }
    }
}

impl PropertyDescriptor {
    pub fn int(name: &str, description: &str) -> Self {
        Self::new(
            name,
            description,
            PropertyKind::Int {
                min: None,
                max: None,
                default: None,
            },
        )
    }

    pub fn int_range(name: &str, description: &str, min: i64, max: i64, default: i64) -> Self {
        Self::new(
            name,
            description,
            PropertyKind::Int {
                min: Some(min),
                max: Some(max),
                default: Some(default),
            },
        )
    }

    pub fn boolean(name: &str, description: &str) -> Self {
        Self::new(name, description, PropertyKind::Bool)
    }

    pub fn array(name: &str, description: &str) -> Self {
        Self::new(name, description, PropertyKind::Array)
    }

    pub fn object(name: &str, description: &str, properties: Vec<Self>) -> Self {
        Self::new(name, description, PropertyKind::Object { properties })
    }

    /// A color with the standard 0-255 channels.
    pub fn color(name: &str, description: &str) -> Self {
        let channel = |channel: &str, label: &str| {
            Self::new(
                channel,
                label,
                PropertyKind::Int {
                    min: Some(MIN_VALUE),
                    max: Some(MAX_VALUE),
                    default: None,
                },
            )
        };
        Self::new(
            name,
            description,
            PropertyKind::Color {
                properties: vec![
                    channel("red", "Red value 0-255"),
                    channel("green", "Green value 0-255"),
                    channel("blue", "Blue value 0-255"),
                ],
            },
        )
    }

    pub fn new(name: &str, description: &str, kind: PropertyKind) -> Self {
        Self {
            name: name.to_owned(),
            description: description.to_owned(),
            required: false,
            kind,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Default value generated for this property.
    ///
    /// Int: declared default, else min, else 0. Bool: `true`.
    /// Array: `[0, 0, 0]`. Object and Color: an object of their children's
    /// defaults.
    pub fn default_value(&self) -> Value {
        match &self.kind {
            PropertyKind::Int { min, default, .. } => json!(default.or(*min).unwrap_or(0)),
            PropertyKind::Bool => Value::Bool(true),
            PropertyKind::Array => json!([0, 0, 0]),
            PropertyKind::Object { properties } | PropertyKind::Color { properties } => {
                default_tree(properties)
            }
        }
    }
}

/// Object mapping every property name to its default value.
pub fn default_tree(properties: &[PropertyDescriptor]) -> Value {
    let map: Map<String, Value> = properties
        .iter()
        .map(|p| (p.name.clone(), p.default_value()))
        .collect();
    Value::Object(map)
}

/// Read `path` from `values`, falling back to `fallback` when absent.
pub fn value_or(values: &Value, path: &str, fallback: Value) -> Value {
    deep_get(values, path).cloned().unwrap_or(fallback)
}
