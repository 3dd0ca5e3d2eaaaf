//! `pack`: build a repository archive without talking to a Bridge.

use e2ebridge_api::PackOptions;

use crate::cli::{GlobalOpts, PackArgs};
use crate::error::CliError;
use crate::output;

pub async fn handle(args: PackArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let PackArgs { dir, out } = args;
    let options = PackOptions { output: out };

    let archive = tokio::task::spawn_blocking(move || e2ebridge_api::pack::pack(&dir, &options))
        .await
        .map_err(|e| CliError::Pack {
            message: e.to_string(),
        })??;

    output::print_output(&archive.display().to_string(), global.quiet);
    Ok(())
}
