//! Shared helpers for command handlers.

use std::future::Future;
use std::io::IsTerminal;
use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use e2ebridge_api::DeployOptions;

use crate::cli::{DeployArgs, GlobalOpts};
use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal there is nobody to ask, so the operation is refused.
pub fn confirm(message: &str, global: &GlobalOpts) -> Result<bool, CliError> {
    if global.yes {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Run `work` behind a spinner when stderr is a terminal.
pub async fn with_spinner<T, F>(message: String, global: &GlobalOpts, work: F) -> T
where
    F: Future<Output = T>,
{
    if global.quiet || !std::io::stderr().is_terminal() {
        return work.await;
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg} [{elapsed}]") {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    let result = work.await;
    spinner.finish_and_clear();
    result
}

/// Translate deploy flags into query options. Flags left off are omitted
/// so the Bridge applies its own defaults.
pub fn deploy_options(args: &DeployArgs) -> DeployOptions {
    let flag = |on: bool| on.then_some(true);
    DeployOptions {
        startup: flag(args.startup),
        overwrite: flag(args.overwrite),
        overwrite_prefs: flag(args.overwrite_prefs),
        npm_install: flag(args.npm_install),
        run_scripts: flag(args.run_scripts),
        instance_name: args.instance_name.clone(),
    }
}

/// Write downloaded bytes to `path`.
pub fn write_file(path: &Path, contents: &[u8]) -> Result<(), CliError> {
    std::fs::write(path, contents).map_err(|source| CliError::Filesystem {
        path: path.to_path_buf(),
        source,
    })
}
