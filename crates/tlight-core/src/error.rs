// ── Core error types ──
//
// User-facing errors from tlight-core. These are NOT API-specific --
// consumers never see reqwest errors or JSON parse failures directly.
// The `From<tlight_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.
//
// `CoreError` is `Clone` so a single gateway outcome can be handed to every
// caller whose write was coalesced into it.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach gateway at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Gateway request timed out")]
    Timeout,

    #[error("Controller is not connected")]
    ControllerDisconnected,

    // ── Gateway errors ───────────────────────────────────────────────
    #[error("Gateway rejected the request (HTTP {status}): {message}")]
    GatewayRejected { status: u16, message: String },

    #[error("Gateway sent an unreadable response: {message}")]
    InvalidResponse { message: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── Persistence errors ───────────────────────────────────────────
    #[error("Persistence error: {message}")]
    Persistence { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn not_found(entity_type: &str, identifier: impl ToString) -> Self {
        Self::NotFound {
            entity_type: entity_type.to_owned(),
            identifier: identifier.to_string(),
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<tlight_api::Error> for CoreError {
    fn from(err: tlight_api::Error) -> Self {
        match err {
            tlight_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if let Some(status) = e.status() {
                    CoreError::GatewayRejected {
                        status: status.as_u16(),
                        message: e.to_string(),
                    }
                } else {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                }
            }
            tlight_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            tlight_api::Error::InvalidBaseUrl(url) => CoreError::Config {
                message: format!("Gateway URL cannot be used for requests: {url}"),
            },
            tlight_api::Error::Status { status: 404, body } => CoreError::NotFound {
                entity_type: "Gateway resource".into(),
                identifier: body,
            },
            tlight_api::Error::Status { status, body } => CoreError::GatewayRejected {
                status,
                message: body,
            },
            tlight_api::Error::Deserialization { message, body: _ } => {
                CoreError::InvalidResponse { message }
            }
            tlight_api::Error::Encode(e) => CoreError::Internal(format!("encode error: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_map_to_rejections() {
        let err = CoreError::from(tlight_api::Error::Status {
            status: 422,
            body: "bad brightness".into(),
        });
        assert_eq!(
            err,
            CoreError::GatewayRejected {
                status: 422,
                message: "bad brightness".into()
            }
        );
    }

    #[test]
    fn missing_resource_maps_to_not_found() {
        let err = CoreError::from(tlight_api::Error::Status {
            status: 404,
            body: "no such node".into(),
        });
        assert!(matches!(err, CoreError::NotFound { .. }));
    }
}
