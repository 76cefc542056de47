// ── Identity types ──
//
// Every entity in the store is addressed by a string id. The newtypes keep
// node ids, synthetic light keys and effect ids from being mixed up.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── NodeId ──────────────────────────────────────────────────────────

/// Gateway-assigned node identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for NodeId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// ── LightKey ────────────────────────────────────────────────────────

/// Synthetic light key, `"{nodeId}-{lightId}"`.
///
/// Unique across the whole store, not just within a node. The gateway only
/// knows the local part, see [`LightKey::local_id`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LightKey(String);

impl LightKey {
    pub fn new(node_id: &NodeId, light_id: &str) -> Self {
        Self(format!("{node_id}-{light_id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The light id local to `node_id`: the key with the `"{nodeId}-"`
    /// prefix removed. Keys that do not carry the prefix are returned whole.
    pub fn local_id<'a>(&'a self, node_id: &NodeId) -> &'a str {
        self.0
            .strip_prefix(node_id.as_str())
            .and_then(|rest| rest.strip_prefix('-'))
            .unwrap_or(&self.0)
    }
}

impl fmt::Display for LightKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LightKey {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for LightKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for LightKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// ── EffectId ────────────────────────────────────────────────────────

/// Locally generated effect identifier (UUID v4 text).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EffectId(String);

impl EffectId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EffectId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for EffectId {
    fn from(s: String) -> Self {
        Self(s)
    }
}
