//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use tlight_config::ConfigError;
use tlight_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to gateway at {url}")]
    #[diagnostic(
        code(tlight::connection_failed),
        help(
            "Check that the gateway is running and accessible.\n\
             URL: {url}\n\
             Try: tlight nodes list --gateway http://<host>:3001/v1"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request timed out")]
    #[diagnostic(
        code(tlight::timeout),
        help("Increase timeout with --timeout or check gateway responsiveness.")
    )]
    Timeout,

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(tlight::not_found),
        help("Run: tlight {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Gateway ──────────────────────────────────────────────────────

    #[error("Gateway error ({code}): {message}")]
    #[diagnostic(code(tlight::gateway_error))]
    GatewayError { code: String, message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(tlight::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(tlight::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: tlight config add-profile <name> <url>"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(tlight::config))]
    Config(Box<ConfigError>),

    // ── Persistence ──────────────────────────────────────────────────

    #[error("Could not save effects: {message}")]
    #[diagnostic(
        code(tlight::persistence),
        help("Check that the state file location is writable (--state-file).")
    )]
    Persistence { message: String },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON value: {0}")]
    #[diagnostic(code(tlight::json))]
    Json(#[from] serde_json::Error),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::UnknownProfile { profile } => Self::ProfileNotFound {
                name: profile,
                available: "(see: tlight config profiles)".into(),
            },
            other => Self::Config(Box::new(other)),
        }
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },

            CoreError::ControllerDisconnected => CliError::ConnectionFailed {
                url: "(disconnected)".into(),
                source: "Gateway connection was lost".into(),
            },

            CoreError::Timeout => CliError::Timeout,

            CoreError::NotFound {
                entity_type,
                identifier,
            } => {
                let list_command = match entity_type.as_str() {
                    "Effect" => "effects list".into(),
                    _ => "nodes list".into(),
                };
                CliError::NotFound {
                    resource_type: entity_type.to_lowercase(),
                    identifier,
                    list_command,
                }
            }

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::GatewayRejected { status, message } => CliError::GatewayError {
                code: status.to_string(),
                message,
            },

            CoreError::InvalidResponse { message } => CliError::GatewayError {
                code: "invalid_response".into(),
                message,
            },

            CoreError::Persistence { message } => CliError::Persistence { message },

            CoreError::Config { message } => CliError::Validation {
                field: "gateway".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::GatewayError {
                code: "internal".into(),
                message,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_exit_codes() {
        let missing = CliError::from(CoreError::NotFound {
            entity_type: "Effect".into(),
            identifier: "fx".into(),
        });
        assert_eq!(missing.exit_code(), exit_code::NOT_FOUND);
        assert!(
            matches!(missing, CliError::NotFound { ref list_command, .. } if list_command == "effects list")
        );

        let offline = CliError::from(CoreError::ConnectionFailed {
            url: "http://localhost:3001/v1".into(),
            reason: "refused".into(),
        });
        assert_eq!(offline.exit_code(), exit_code::CONNECTION);

        let rejected = CliError::from(CoreError::GatewayRejected {
            status: 500,
            message: "boom".into(),
        });
        assert_eq!(rejected.exit_code(), exit_code::GENERAL);
    }
}
