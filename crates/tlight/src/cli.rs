//! Clap derive structures for the `tlight` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// tlight -- control panel for TLight lighting gateways
#[derive(Debug, Parser)]
#[command(
    name = "tlight",
    version,
    about = "Control TLight lighting nodes and effects from the command line",
    long_about = "Inspect and drive lighting nodes through a TLight gateway.\n\n\
        Effects are authored locally and kept in a state file; applying an\n\
        effect to a node pushes its parameters to the gateway.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Gateway profile to use
    #[arg(long, short = 'p', env = "TLIGHT_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Gateway base URL including API version (overrides profile)
    #[arg(long, short = 'g', env = "TLIGHT_GATEWAY", global = true)]
    pub gateway: Option<String>,

    /// File holding effects and card preferences (overrides profile)
    #[arg(long, env = "TLIGHT_STATE_FILE", global = true)]
    pub state_file: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "TLIGHT_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "TLIGHT_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Inspect and control lighting nodes
    #[command(alias = "n")]
    Nodes(NodesArgs),

    /// Control individual lights of a node
    #[command(alias = "l")]
    Lights(LightsArgs),

    /// Author effects and run them on nodes
    #[command(alias = "fx")]
    Effects(EffectsArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

impl Command {
    /// Whether the command needs the node list from the gateway.
    pub fn needs_gateway(&self) -> bool {
        match self {
            Self::Nodes(_) | Self::Lights(_) => true,
            Self::Effects(args) => matches!(args.command, EffectsCommand::Apply { .. }),
            Self::Config(_) | Self::Completions(_) => false,
        }
    }
}

// ── Shared value arguments ──────────────────────────────────────────

/// Values written to a node or light. Unset flags are left untouched.
#[derive(Debug, Args)]
pub struct ValueArgs {
    /// Brightness (0-255)
    #[arg(long, short = 'b')]
    pub brightness: Option<u8>,

    /// Color as "red,green,blue" (each 0-255)
    #[arg(long = "rgb", short = 'c', value_name = "R,G,B", value_parser = parse_rgb)]
    pub rgb: Option<(u8, u8, u8)>,

    /// Red channel (0-255)
    #[arg(long, conflicts_with = "rgb")]
    pub red: Option<u8>,

    /// Green channel (0-255)
    #[arg(long, conflicts_with = "rgb")]
    pub green: Option<u8>,

    /// Blue channel (0-255)
    #[arg(long, conflicts_with = "rgb")]
    pub blue: Option<u8>,
}

/// Parse "r,g,b" into a color triple.
pub fn parse_rgb(raw: &str) -> Result<(u8, u8, u8), String> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    let [red, green, blue] = parts.as_slice() else {
        return Err(format!("expected red,green,blue, got '{raw}'"));
    };
    let channel = |s: &str| {
        s.parse::<u8>()
            .map_err(|_| format!("'{s}' is not a channel value (0-255)"))
    };
    Ok((channel(red)?, channel(green)?, channel(blue)?))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  NODES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct NodesArgs {
    #[command(subcommand)]
    pub command: NodesCommand,
}

#[derive(Debug, Subcommand)]
pub enum NodesCommand {
    /// List nodes reported by the gateway
    #[command(alias = "ls")]
    List,

    /// Show one node with its lights
    Get {
        /// Node ID
        node: String,
    },

    /// Write node values
    Set {
        /// Node ID
        node: String,

        /// Operating mode (SINGLE, EXTERNAL, INDIVIDUAL, ANIMATION)
        #[arg(long, short = 'm')]
        mode: Option<String>,

        #[command(flatten)]
        values: ValueArgs,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LIGHTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LightsArgs {
    #[command(subcommand)]
    pub command: LightsCommand,
}

#[derive(Debug, Subcommand)]
pub enum LightsCommand {
    /// List the lights of a node
    #[command(alias = "ls")]
    List {
        /// Node ID
        node: String,
    },

    /// Write one light's values (switches the node to INDIVIDUAL mode)
    Set {
        /// Node ID
        node: String,

        /// Light ID, local to the node
        light: String,

        #[command(flatten)]
        values: ValueArgs,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  EFFECTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct EffectsArgs {
    #[command(subcommand)]
    pub command: EffectsCommand,
}

#[derive(Debug, Subcommand)]
pub enum EffectsCommand {
    /// List configured effects
    #[command(alias = "ls")]
    List,

    /// List available effect types
    Types,

    /// Create an effect
    New {
        /// Effect name
        #[arg(long, short = 'n')]
        name: Option<String>,

        /// Effect type (sACN, SmoothColors)
        #[arg(long = "type", short = 't', value_name = "TYPE")]
        effect_type: Option<String>,
    },

    /// Show an effect and its properties
    Show {
        /// Effect ID
        effect: String,
    },

    /// Rename an effect
    Rename {
        /// Effect ID
        effect: String,

        /// New name
        name: String,
    },

    /// Change the effect type, resetting its properties to the defaults
    #[command(name = "type")]
    SetType {
        /// Effect ID
        effect: String,

        /// Effect type (sACN, SmoothColors, or "none")
        #[arg(value_name = "TYPE")]
        effect_type: String,
    },

    /// Set one property at a dot-separated path
    Set {
        /// Effect ID
        effect: String,

        /// Property path (e.g. "effect.pluginOpts.effectOpts.duration")
        path: String,

        /// Value as JSON (bare words are taken as strings)
        value: String,
    },

    /// Set a color property from "red,green,blue"
    Color {
        /// Effect ID
        effect: String,

        /// Path of the color property
        path: String,

        /// Color as "red,green,blue"
        #[arg(value_parser = parse_rgb)]
        rgb: (u8, u8, u8),
    },

    /// Show the editor form derived from the effect's schema
    Form {
        /// Effect ID
        effect: String,
    },

    /// Choose how color properties of an effect are edited
    ColorMode {
        /// Effect ID
        effect: String,

        /// Editor kind
        mode: ColorEditArg,
    },

    /// Delete an effect
    #[command(alias = "rm")]
    Delete {
        /// Effect ID
        effect: String,
    },

    /// Run an effect on a node
    Apply {
        /// Node ID
        node: String,

        /// Effect ID
        effect: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorEditArg {
    /// One picker for all three channels
    Picker,
    /// Separate red, green and blue sliders
    Sliders,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the resolved configuration
    Show,

    /// Print the config file path
    Path,

    /// List configured profiles
    Profiles,

    /// Add or replace a profile
    AddProfile {
        /// Profile name
        name: String,

        /// Gateway base URL including API version
        url: String,

        /// State file for this profile
        #[arg(long = "state", value_name = "PATH")]
        state: Option<PathBuf>,
    },

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn rgb_triples_parse() {
        assert_eq!(parse_rgb("255, 0,12").unwrap(), (255, 0, 12));
        assert!(parse_rgb("1,2").is_err());
        assert!(parse_rgb("1,2,300").is_err());
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn node_set_parses_value_flags() {
        let cli = Cli::try_parse_from(["tlight", "nodes", "set", "n1", "--brightness", "5"]).unwrap();
        let Command::Nodes(NodesArgs {
            command: NodesCommand::Set { node, mode, values },
        }) = cli.command
        else {
            panic!("expected nodes set");
        };
        assert_eq!(node, "n1");
        assert_eq!(mode, None);
        assert_eq!(values.brightness, Some(5));
        assert_eq!(values.rgb, None);
        assert!(matches!(cli.global.color, ColorMode::Auto));
    }

    #[test]
    fn rgb_flag_is_separate_from_global_color() {
        let cli = Cli::try_parse_from([
            "tlight", "--color", "never", "lights", "set", "n2", "0", "--rgb", "1,2,3",
        ])
        .unwrap();
        let Command::Lights(LightsArgs {
            command: LightsCommand::Set { light, values, .. },
        }) = cli.command
        else {
            panic!("expected lights set");
        };
        assert_eq!(light, "0");
        assert_eq!(values.rgb, Some((1, 2, 3)));
        assert!(matches!(cli.global.color, ColorMode::Never));
    }

    #[test]
    fn channel_flags_conflict_with_rgb() {
        let err = Cli::try_parse_from([
            "tlight", "nodes", "set", "n1", "--rgb", "1,2,3", "--red", "4",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn effect_type_flag_is_named_type() {
        let cli = Cli::try_parse_from(["tlight", "effects", "new", "--type", "SmoothColors"]).unwrap();
        let Command::Effects(EffectsArgs {
            command: EffectsCommand::New { effect_type, .. },
        }) = cli.command
        else {
            panic!("expected effects new");
        };
        assert_eq!(effect_type.as_deref(), Some("SmoothColors"));
    }

    #[test]
    fn add_profile_does_not_shadow_global_flags() {
        let cli = Cli::try_parse_from([
            "tlight",
            "--gateway",
            "http://override:3001/v1",
            "config",
            "add-profile",
            "lab",
            "http://lab:3001/v1",
            "--state",
            "/tmp/lab.json",
        ])
        .unwrap();
        assert_eq!(cli.global.gateway.as_deref(), Some("http://override:3001/v1"));
        let Command::Config(ConfigArgs {
            command: ConfigCommand::AddProfile { name, url, state },
        }) = cli.command
        else {
            panic!("expected config add-profile");
        };
        assert_eq!(name, "lab");
        assert_eq!(url, "http://lab:3001/v1");
        assert_eq!(state, Some(PathBuf::from("/tmp/lab.json")));
    }
}
