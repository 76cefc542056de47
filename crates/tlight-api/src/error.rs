use thiserror::Error;

/// Top-level error type for the `tlight-api` crate.
///
/// Covers every failure mode of the gateway surface: transport, HTTP
/// status and payload decoding. `tlight-core` maps these into user-facing
/// diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The configured base URL cannot carry path segments (e.g. `mailto:`).
    #[error("Gateway base URL cannot be used for requests: {0}")]
    InvalidBaseUrl(String),

    // ── Gateway ─────────────────────────────────────────────────────
    /// The gateway answered with a non-success status code.
    #[error("Gateway returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// A request body could not be encoded as JSON.
    #[error("Failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Status { status: 404, .. } => true,
            _ => false,
        }
    }

    /// HTTP status code carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_classify() {
        let not_found = Error::Status {
            status: 404,
            body: String::new(),
        };
        assert!(not_found.is_not_found());
        assert!(!not_found.is_transient());
        assert_eq!(not_found.status(), Some(404));

        let unavailable = Error::Status {
            status: 503,
            body: "busy".into(),
        };
        assert!(unavailable.is_transient());
        assert!(!unavailable.is_not_found());
    }

    #[test]
    fn base_url_error_has_no_status() {
        let err = Error::InvalidBaseUrl("mailto:x".into());
        assert_eq!(err.status(), None);
        assert!(err.to_string().contains("mailto:x"));
    }
}
