// ── Domain model ──

pub mod effect;
pub mod ids;
pub mod node;
pub mod preferences;
pub mod values;

pub use effect::{ConfiguredEffect, DEFAULT_EFFECT_NAME, EffectAssignment, EffectType};
pub use ids::{EffectId, LightKey, NodeId};
pub use node::{Light, Mode, Node, NodeFeatures, ReportedState};
pub use preferences::{CardPreference, CardPreferences, ColorEditMode};
pub use values::{LightValue, NodeValue, ValueField, ValuesPatch};
