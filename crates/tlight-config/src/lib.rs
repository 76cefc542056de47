//! Shared configuration for tlight tools.
//!
//! TOML profiles merged with `TLIGHT_`-prefixed environment variables,
//! and translation to `tlight_core::ControllerConfig`. The CLI adds
//! flag-aware overrides on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use tlight_core::{ControllerConfig, DEFAULT_GATEWAY_URL};

/// Name of the profile used when none is selected.
pub const DEFAULT_PROFILE: &str = "default";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("unknown profile '{profile}'")]
    UnknownProfile { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named gateway profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some(DEFAULT_PROFILE.into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named gateway profile. Unset pacing values use the controller
/// defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Gateway base URL including the API version (e.g. "http://localhost:3001/v1").
    #[serde(default = "default_gateway")]
    pub gateway: String,

    /// Override request timeout (seconds).
    pub timeout: Option<u64>,

    /// Throttle window for node writes (milliseconds).
    pub node_throttle_ms: Option<u64>,

    /// Throttle window for per-light writes (milliseconds).
    pub light_throttle_ms: Option<u64>,

    /// Debounce before effects and preferences are saved (milliseconds).
    pub persist_debounce_ms: Option<u64>,

    /// Reload nodes every N seconds. 0 disables.
    pub refresh_interval_secs: Option<u64>,

    /// Where effects and preferences are stored.
    pub state_file: Option<PathBuf>,
}

fn default_gateway() -> String {
    DEFAULT_GATEWAY_URL.into()
}

impl Profile {
    /// Built-in profile pointing at the default gateway.
    pub fn builtin() -> Self {
        Self {
            gateway: default_gateway(),
            ..Self::default()
        }
    }
}

impl Config {
    /// Name of the profile to use: `requested`, else the configured
    /// default, else [`DEFAULT_PROFILE`].
    pub fn profile_name<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested
            .or(self.default_profile.as_deref())
            .unwrap_or(DEFAULT_PROFILE)
    }

    /// Look up a profile. The default profile always exists, falling back
    /// to the built-in one when the file does not define it.
    pub fn profile(&self, name: &str) -> Result<Profile, ConfigError> {
        match self.profiles.get(name) {
            Some(profile) => Ok(profile.clone()),
            None if name == DEFAULT_PROFILE => Ok(Profile::builtin()),
            None => Err(ConfigError::UnknownProfile {
                profile: name.into(),
            }),
        }
    }
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "tlight", "tlight")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Default location of the persisted effects and preferences.
pub fn default_state_file() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".local/share").join("state.json"),
        |dirs| dirs.data_dir().join("state.json"),
    )
}

fn dirs_fallback(base: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(base);
    p.push("tlight");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from `path` + environment.
///
/// Environment variables use `__` to reach nested keys, e.g.
/// `TLIGHT_DEFAULTS__TIMEOUT=5` or `TLIGHT_PROFILES__LAB__GATEWAY=...`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("TLIGHT_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `ControllerConfig` from a profile -- no CLI flag overrides.
pub fn profile_to_controller_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<ControllerConfig, ConfigError> {
    let url: url::Url = profile
        .gateway
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "gateway".into(),
            reason: format!("invalid URL: {}", profile.gateway),
        })?;

    let mut config = ControllerConfig::new(url);
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    if let Some(ms) = profile.node_throttle_ms {
        config.node_throttle = Duration::from_millis(ms);
    }
    if let Some(ms) = profile.light_throttle_ms {
        config.light_throttle = Duration::from_millis(ms);
    }
    if let Some(ms) = profile.persist_debounce_ms {
        config.persist_debounce = Duration::from_millis(ms);
    }
    if let Some(secs) = profile.refresh_interval_secs {
        config.refresh_interval_secs = secs;
    }
    Ok(config)
}

/// State file of a profile, defaulting to the platform data dir.
pub fn state_file(profile: &Profile) -> PathBuf {
    profile.state_file.clone().unwrap_or_else(default_state_file)
}
