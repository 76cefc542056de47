//! Config subcommand handlers.

use serde::Serialize;
use tabled::Tabled;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Profile};
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct ProfileView {
    name: String,
    default: bool,
    #[serde(flatten)]
    profile: Profile,
}

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "")]
    marker: String,
    #[tabled(rename = "Profile")]
    name: String,
    #[tabled(rename = "Gateway")]
    gateway: String,
    #[tabled(rename = "State file")]
    state_file: String,
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let resolved = config::resolve(global)?;
            let mut out = toml::to_string_pretty(&cfg).map_err(tlight_config::ConfigError::from)?;
            out.push_str(&format!(
                "\n# active profile: {}\n# gateway: {}\n# state file: {}",
                config::active_profile_name(global, &cfg),
                resolved.controller.url,
                resolved.state_file.display()
            ));
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config()?;
            let active = config::active_profile_name(global, &cfg);
            let views: Vec<ProfileView> = cfg
                .profiles
                .iter()
                .map(|(name, profile)| ProfileView {
                    default: *name == active,
                    name: name.clone(),
                    profile: profile.clone(),
                })
                .collect();
            let out = output::render_list(
                &global.output,
                &views,
                |v| ProfileRow {
                    marker: if v.default { "*".into() } else { String::new() },
                    name: v.name.clone(),
                    gateway: v.profile.gateway.clone(),
                    state_file: tlight_config::state_file(&v.profile).display().to_string(),
                },
                |v| v.name.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::AddProfile { name, url, state } => {
            let mut cfg = config::load_config()?;
            let profile = Profile {
                gateway: url,
                state_file: state,
                ..Profile::builtin()
            };
            // Validate before writing anything.
            tlight_config::profile_to_controller_config(&profile, &cfg.defaults)?;

            cfg.profiles.insert(name.clone(), profile);
            config::save_config(&cfg)?;
            output::print_status(&format!("Profile '{name}' saved"), global.quiet);
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config()?;
            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: config::available_profiles(&cfg),
                    name,
                });
            }
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            output::print_status(&format!("Default profile set to '{name}'"), global.quiet);
            Ok(())
        }
    }
}
