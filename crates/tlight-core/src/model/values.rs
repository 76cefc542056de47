// ── User-editable values ──
//
// `NodeValue` and `LightValue` hold what the UI shows and edits. Updates
// arrive as sparse `ValuesPatch`es and are shallow-merged: fields absent
// from the patch are never touched.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::ids::{LightKey, NodeId};
use super::node::Mode;

/// One editable field of a node or light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum ValueField {
    Mode,
    Brightness,
    Red,
    Green,
    Blue,
}

/// Editable values of a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeValue {
    pub id: NodeId,
    pub mode: Option<Mode>,
    pub brightness: Option<u8>,
    pub red: Option<u8>,
    pub green: Option<u8>,
    pub blue: Option<u8>,
}

impl NodeValue {
    /// An empty record, as created by a change to an unknown node.
    pub fn empty(id: NodeId) -> Self {
        Self {
            id,
            mode: None,
            brightness: None,
            red: None,
            green: None,
            blue: None,
        }
    }

    pub fn merge(&mut self, patch: &ValuesPatch) {
        merge_field(&mut self.mode, patch.mode);
        merge_field(&mut self.brightness, patch.brightness);
        merge_field(&mut self.red, patch.red);
        merge_field(&mut self.green, patch.green);
        merge_field(&mut self.blue, patch.blue);
    }
}

/// Editable values of a single light.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightValue {
    pub id: LightKey,
    pub light_type: String,
    pub brightness: Option<u8>,
    pub red: Option<u8>,
    pub green: Option<u8>,
    pub blue: Option<u8>,
}

impl LightValue {
    pub fn empty(id: LightKey) -> Self {
        Self {
            id,
            light_type: String::new(),
            brightness: None,
            red: None,
            green: None,
            blue: None,
        }
    }

    /// Lights have no mode of their own; `patch.mode` is ignored.
    pub fn merge(&mut self, patch: &ValuesPatch) {
        merge_field(&mut self.brightness, patch.brightness);
        merge_field(&mut self.red, patch.red);
        merge_field(&mut self.green, patch.green);
        merge_field(&mut self.blue, patch.blue);
    }
}

fn merge_field<T: Copy>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

// ── ValuesPatch ─────────────────────────────────────────────────────

/// Sparse update of node or light values. `None` means "leave unchanged".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuesPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub red: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub green: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blue: Option<u8>,
}

impl ValuesPatch {
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn brightness(mut self, brightness: u8) -> Self {
        self.brightness = Some(brightness);
        self
    }

    /// Set all three channels at once, as a color picker does.
    pub fn color(mut self, red: u8, green: u8, blue: u8) -> Self {
        self.red = Some(red);
        self.green = Some(green);
        self.blue = Some(blue);
        self
    }

    pub fn red(mut self, red: u8) -> Self {
        self.red = Some(red);
        self
    }

    pub fn green(mut self, green: u8) -> Self {
        self.green = Some(green);
        self
    }

    pub fn blue(mut self, blue: u8) -> Self {
        self.blue = Some(blue);
        self
    }

    /// Fields carried by this patch, in declaration order.
    pub fn fields(&self) -> Vec<ValueField> {
        let mut fields = Vec::with_capacity(5);
        if self.mode.is_some() {
            fields.push(ValueField::Mode);
        }
        if self.brightness.is_some() {
            fields.push(ValueField::Brightness);
        }
        if self.red.is_some() {
            fields.push(ValueField::Red);
        }
        if self.green.is_some() {
            fields.push(ValueField::Green);
        }
        if self.blue.is_some() {
            fields.push(ValueField::Blue);
        }
        fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    /// Overlay `newer` on top of this patch.
    pub fn merge_from(&mut self, newer: &Self) {
        merge_field(&mut self.mode, newer.mode);
        merge_field(&mut self.brightness, newer.brightness);
        merge_field(&mut self.red, newer.red);
        merge_field(&mut self.green, newer.green);
        merge_field(&mut self.blue, newer.blue);
    }

    /// Copy of this patch restricted to `fields`.
    pub fn only(&self, fields: &[ValueField]) -> Self {
        let keep = |field| fields.contains(&field);
        Self {
            mode: self.mode.filter(|_| keep(ValueField::Mode)),
            brightness: self.brightness.filter(|_| keep(ValueField::Brightness)),
            red: self.red.filter(|_| keep(ValueField::Red)),
            green: self.green.filter(|_| keep(ValueField::Green)),
            blue: self.blue.filter(|_| keep(ValueField::Blue)),
        }
    }

    /// Drop `fields` from this patch.
    pub fn clear(&mut self, fields: &[ValueField]) {
        for field in fields {
            match field {
                ValueField::Mode => self.mode = None,
                ValueField::Brightness => self.brightness = None,
                ValueField::Red => self.red = None,
                ValueField::Green => self.green = None,
                ValueField::Blue => self.blue = None,
            }
        }
    }
}
