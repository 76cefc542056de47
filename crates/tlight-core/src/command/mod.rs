// ── Gateway intents ──
//
// Everything that talks to the gateway is an `ApiAction`. Callers wrap it
// in an `Intent`; store actions travel the same path and are handed to the
// store untouched. `Middleware` executes gateway intents, pacing the
// throttled variants.

mod effect_setup;
mod middleware;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::CoreError;
use crate::model::{LightKey, NodeId, ValuesPatch};
use crate::store::Action;

pub use effect_setup::effect_params;
pub use middleware::{ApiResponse, Middleware};

/// A request for the gateway.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiAction {
    FetchNodeData,

    // ── Node writes ──────────────────────────────────────────────────
    PostNodeValues {
        node_id: NodeId,
        patch: ValuesPatch,
    },
    PostNodeValuesThrottled {
        node_id: NodeId,
        patch: ValuesPatch,
    },

    // ── Light writes ─────────────────────────────────────────────────
    PostLightValues {
        node_id: NodeId,
        light_key: LightKey,
        patch: ValuesPatch,
    },
    PostLightValuesThrottled {
        node_id: NodeId,
        light_key: LightKey,
        patch: ValuesPatch,
    },

    // ── Effects ──────────────────────────────────────────────────────
    /// `params` is the assembled effect parameter object, sent verbatim.
    PostEffectSetup { node_id: NodeId, params: Value },
}

/// Anything that can be dispatched through the middleware.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Gateway(ApiAction),
    Store(Action),
}

impl From<ApiAction> for Intent {
    fn from(action: ApiAction) -> Self {
        Self::Gateway(action)
    }
}

impl From<Action> for Intent {
    fn from(action: Action) -> Self {
        Self::Store(action)
    }
}

// ── Named dispatch ──────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeParams {
    node_id: NodeId,
    values: ValuesPatch,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LightParams {
    node_id: NodeId,
    light_id: LightKey,
    values: ValuesPatch,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EffectSetupParams {
    node_id: NodeId,
    body: Value,
}

impl ApiAction {
    /// Wire name of the action.
    pub fn name(&self) -> &'static str {
        match self {
            Self::FetchNodeData => "fetchNodeData",
            Self::PostNodeValues { .. } => "postNodeValues",
            Self::PostNodeValuesThrottled { .. } => "postNodeValuesThrottled",
            Self::PostLightValues { .. } => "postLightValues",
            Self::PostLightValuesThrottled { .. } => "postLightValuesThrottled",
            Self::PostEffectSetup { .. } => "postEffectSetup",
        }
    }

    /// Build an action from its wire name and parameter object.
    ///
    /// Unknown names yield `Ok(None)`. Known names with missing or
    /// malformed parameters are a validation error.
    pub fn from_name(name: &str, params: Value) -> Result<Option<Self>, CoreError> {
        let action = match name {
            "fetchNodeData" => Self::FetchNodeData,
            "postNodeValues" | "postNodeValuesThrottled" => {
                let NodeParams { node_id, values } = parse_params(name, params)?;
                if name == "postNodeValues" {
                    Self::PostNodeValues {
                        node_id,
                        patch: values,
                    }
                } else {
                    Self::PostNodeValuesThrottled {
                        node_id,
                        patch: values,
                    }
                }
            }
            "postLightValues" | "postLightValuesThrottled" => {
                let LightParams {
                    node_id,
                    light_id,
                    values,
                } = parse_params(name, params)?;
                if name == "postLightValues" {
                    Self::PostLightValues {
                        node_id,
                        light_key: light_id,
                        patch: values,
                    }
                } else {
                    Self::PostLightValuesThrottled {
                        node_id,
                        light_key: light_id,
                        patch: values,
                    }
                }
            }
            "postEffectSetup" => {
                let EffectSetupParams { node_id, body } = parse_params(name, params)?;
                Self::PostEffectSetup {
                    node_id,
                    params: body,
                }
            }
            _ => return Ok(None),
        };
        Ok(Some(action))
    }
}

fn parse_params<T: DeserializeOwned>(name: &str, params: Value) -> Result<T, CoreError> {
    serde_json::from_value(params)
        .map_err(|e| CoreError::validation(format!("invalid parameters for {name}: {e}")))
}
