//! Command dispatch: bridges CLI args -> library calls -> output formatting.

pub mod artifacts;
pub mod config_cmd;
pub mod configuration;
pub mod console;
pub mod pack;
pub mod resources;
pub mod services;
pub mod util;

use crate::cli::{Command, GlobalOpts};
use crate::config::Target;
use crate::error::CliError;

/// Dispatch a Bridge-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, target: &Target, global: &GlobalOpts) -> Result<(), CliError> {
    let result = match cmd {
        Command::Services(args) => services::handle(target, args, global).await,
        Command::Preferences(args) => configuration::handle_preferences(target, args, global).await,
        Command::Settings(args) => configuration::handle_settings(target, args, global).await,
        Command::Resources(args) => resources::handle(target, args, global).await,
        Command::Notes(args) => artifacts::handle_notes(target, args, global).await,
        Command::Sessions(args) => artifacts::handle_sessions(target, args, global).await,
        Command::Console(args) => console::handle(target, args, global).await,
        // Handled before a connection is made
        Command::Pack(_) | Command::Config(_) | Command::Completions(_) => unreachable!(),
    };
    result.map_err(|e| e.for_profile(&target.profile))
}
