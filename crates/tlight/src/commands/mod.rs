//! Command dispatch: bridges CLI args -> controller operations -> output formatting.

pub mod config_cmd;
pub mod effects;
pub mod lights;
pub mod nodes;
pub mod util;

use tlight_core::Controller;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a controller-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Nodes(args) => nodes::handle(controller, args, global).await,
        Command::Lights(args) => lights::handle(controller, args, global).await,
        Command::Effects(args) => effects::handle(controller, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
