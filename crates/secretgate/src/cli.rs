//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use secretgate_core::BackendKind;

/// secretgate - cached access to AWS Parameter Store and Secrets Manager
#[derive(Parser, Debug)]
#[command(name = "secretgate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to secretgate.yaml config file
    #[arg(short, long, global = true)]
    pub config: Option<Utf8PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read one or more secrets
    Get(GetArgs),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Parameter names, paths, or secret ids to read
    #[arg(required = true, num_args = 1..)]
    pub keys: Vec<String>,

    /// Backend to read from (defaults to the configured default provider)
    #[arg(short, long)]
    pub provider: Option<BackendKind>,

    /// Output as a JSON object keyed by secret name
    #[arg(long)]
    pub json: bool,

    /// Print cache statistics after the lookups
    #[arg(long)]
    pub stats: bool,
}

// Config commands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Validate the configuration and credential settings
    Validate,

    /// Show the resolved configuration with secrets masked
    Show(ConfigShowArgs),
}

#[derive(Args, Debug)]
pub struct ConfigShowArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_get_with_provider() {
        let cli = Cli::parse_from(["secretgate", "get", "/a", "/b", "--provider", "ssm", "-vv"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Get(args) => {
                assert_eq!(args.keys, vec!["/a", "/b"]);
                assert_eq!(args.provider, Some(BackendKind::ParameterStore));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_get_requires_a_key() {
        assert!(Cli::try_parse_from(["secretgate", "get"]).is_err());
    }
}
