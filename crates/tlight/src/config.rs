//! CLI configuration -- thin wrapper around `tlight_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--gateway, --state-file, etc.).

use std::path::PathBuf;
use std::time::Duration;

use tlight_core::ControllerConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use tlight_config::{Config, Profile, config_path, load_config, save_config};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Everything a command needs to build its controller.
#[derive(Debug)]
pub struct Resolved {
    pub controller: ControllerConfig,
    pub state_file: PathBuf,
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.profile_name(global.profile.as_deref()).to_owned()
}

/// Load the config file and apply CLI flag overrides on top of the
/// active profile. Flags win over profile values.
pub fn resolve(global: &GlobalOpts) -> Result<Resolved, CliError> {
    let cfg = load_config()?;
    let name = active_profile_name(global, &cfg);
    let mut profile = cfg.profile(&name).map_err(|_| CliError::ProfileNotFound {
        name: name.clone(),
        available: available_profiles(&cfg),
    })?;

    if let Some(ref gateway) = global.gateway {
        profile.gateway.clone_from(gateway);
    }
    if let Some(ref path) = global.state_file {
        profile.state_file = Some(path.clone());
    }

    let mut controller = tlight_config::profile_to_controller_config(&profile, &cfg.defaults)?;
    if let Some(secs) = global.timeout {
        controller.timeout = Duration::from_secs(secs);
    }

    Ok(Resolved {
        controller,
        state_file: tlight_config::state_file(&profile),
    })
}

pub fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        "(none)".into()
    } else {
        cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}
