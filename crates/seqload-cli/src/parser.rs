//! Command-line parser.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use seqload_core::ResponseEncoding;

/// Fetch resources one at a time and report each result.
#[derive(Parser)]
#[command(name = "seqload")]
#[command(about = "Sequentially load remote resources")]
#[command(version)]
pub struct Cli {
    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Fetch every resource in a manifest and/or on the command line
    Fetch(FetchArgs),
}

/// Arguments for `seqload fetch`.
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Resource keys: absolute URLs, or paths relative to --base-url
    pub keys: Vec<String>,

    /// JSON manifest listing resources to fetch before any positional keys
    #[arg(short, long)]
    pub manifest: Option<PathBuf>,

    /// Base URL for relative keys (overrides the manifest's `baseUrl`)
    #[arg(long, env = "SEQLOAD_BASE_URL")]
    pub base_url: Option<String>,

    /// How response bodies are read: binary or text
    #[arg(long)]
    pub encoding: Option<ResponseEncoding>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Record and print debug traces (empty starts, failures, dropped enqueues)
    #[arg(long)]
    pub debug: bool,

    /// Print events and the summary as JSON lines
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_fetch_args() {
        let cli = Cli::parse_from([
            "seqload",
            "--verbose",
            "fetch",
            "--manifest",
            "sounds.json",
            "--encoding",
            "text",
            "--json",
            "a.mp3",
            "b.mp3",
        ]);
        assert!(cli.verbose);
        let Commands::Fetch(args) = cli.command;
        assert_eq!(args.keys, vec!["a.mp3", "b.mp3"]);
        assert_eq!(args.manifest, Some(PathBuf::from("sounds.json")));
        assert_eq!(args.encoding, Some(ResponseEncoding::Text));
        assert_eq!(args.timeout, 30);
        assert!(args.json);
        assert!(!args.debug);
    }

    #[test]
    fn test_unknown_encoding_rejected() {
        let result = Cli::try_parse_from(["seqload", "fetch", "--encoding", "blob", "a.mp3"]);
        assert!(result.is_err());
    }
}
