// ── Runtime controller configuration ──
//
// These types describe *how* to talk to a gateway and how to pace writes.
// They never touch disk: the CLI (via tlight-config) constructs a
// `ControllerConfig` and hands it in.

use std::time::Duration;

use url::Url;

/// Gateway base URL used when nothing else is configured.
pub const DEFAULT_GATEWAY_URL: &str = "http://localhost:3001/v1";

/// Configuration for one gateway connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Gateway base URL including the API version prefix.
    pub url: Url,
    /// Request timeout.
    pub timeout: Duration,
    /// Throttle window for node-level writes.
    pub node_throttle: Duration,
    /// Throttle window for per-light writes.
    pub light_throttle: Duration,
    /// Trailing-edge debounce before persisting effects and preferences.
    pub persist_debounce: Duration,
    /// How often to reload nodes from the gateway (seconds). 0 = never.
    ///
    /// A reload resets every effect assignment, so this is off by default.
    pub refresh_interval_secs: u64,
}

impl ControllerConfig {
    /// Configuration for `url` with default pacing.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            timeout: Duration::from_secs(30),
            node_throttle: Duration::from_millis(100),
            light_throttle: Duration::from_millis(500),
            persist_debounce: Duration::from_millis(500),
            refresh_interval_secs: 0,
        }
    }
}
