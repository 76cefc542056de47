// ── Per-card display preferences ──
//
// Keyed by entity id (node id or light key) and persisted with effects.

use serde::{Deserialize, Serialize};

/// How color properties are edited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorEditMode {
    /// Three independent channel sliders.
    Sliders,
    /// One picker writing all three channels at once.
    #[default]
    Picker,
}

/// Stored preferences of one card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_color_picker: Option<bool>,
}

impl CardPreferences {
    pub fn color_edit_mode(&self) -> ColorEditMode {
        match self.use_color_picker {
            Some(false) => ColorEditMode::Sliders,
            Some(true) | None => ColorEditMode::Picker,
        }
    }

    pub fn apply(&mut self, preference: CardPreference) {
        match preference {
            CardPreference::UseColorPicker(on) => self.use_color_picker = Some(on),
        }
    }
}

/// A single preference update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardPreference {
    UseColorPicker(bool),
}
