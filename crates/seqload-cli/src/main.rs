//! CLI entry point - the composition root.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use seqload_cli::{Cli, Commands, handlers};

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "seqload=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Fetch(args) => match handlers::fetch::execute(&args).await {
            Ok(summary) if summary.errored > 0 => Ok(ExitCode::FAILURE),
            Ok(_) => Ok(ExitCode::SUCCESS),
            Err(e) => {
                eprintln!("Error: {e}");
                Ok(ExitCode::from(e.exit_code()))
            }
        },
    }
}
