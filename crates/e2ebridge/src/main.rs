mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(mut cli: Cli) -> Result<(), CliError> {
    config::apply_defaults(&mut cli.global, &config::load_config_or_default());

    match cli.command {
        // Offline commands don't need a Bridge connection
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),
        Command::Pack(args) => commands::pack::handle(args, &cli.global).await,

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "e2ebridge", &mut std::io::stdout());
            Ok(())
        }

        // All other commands talk to a Bridge
        cmd => {
            let cfg = config::load_config()?;
            let target = config::connect(&cli.global, &cfg)?;

            tracing::debug!(command = ?cmd, profile = %target.profile, "dispatching command");
            commands::dispatch(cmd, &target, &cli.global).await
        }
    }
}
