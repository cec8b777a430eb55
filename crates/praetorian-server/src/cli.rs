use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// CLI surface definition.
#[derive(Parser, Debug)]
#[command(
    name = "praetorian",
    about = "Envelope encryption for JSON payloads over HTTP",
    version,
    propagate_version = true
)]
pub struct Cli {
    /// Optional subcommand; defaults to `serve` when absent.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Serve the /wrap and /unwrap API.
    Serve(ServeArgs),
    /// Generate a random root key and print it as base64.
    Keygen {
        /// Id to use in the printed config snippet.
        #[arg(long, default_value = "1")]
        id: String,
    },
    /// Inspect configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version and exit.
    Version,
}

impl Default for Command {
    fn default() -> Self {
        Command::Serve(ServeArgs::default())
    }
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ServeArgs {
    /// TOML config file. Without it, PRAETORIAN_CONFIG and PORT are read.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Seconds in-flight requests get to finish after a shutdown signal.
    #[arg(long, default_value_t = 5)]
    pub grace_period: u64,
}

impl Default for ServeArgs {
    fn default() -> Self {
        Self {
            config: None,
            grace_period: 5,
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Validate the key configuration without serving.
    Check {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_serve_when_missing_subcommand() {
        let cli = Cli::try_parse_from(["praetorian"]).expect("parse should succeed");
        assert_eq!(cli.command, None);
        assert_eq!(
            cli.command.unwrap_or_default(),
            Command::Serve(ServeArgs::default())
        );
    }

    #[test]
    fn parses_serve_flags() {
        let cli = Cli::try_parse_from([
            "praetorian",
            "serve",
            "--config",
            "/etc/praetorian.toml",
            "--grace-period",
            "10",
        ])
        .expect("parse should succeed");
        assert_eq!(
            cli.command,
            Some(Command::Serve(ServeArgs {
                config: Some(PathBuf::from("/etc/praetorian.toml")),
                grace_period: 10,
            }))
        );
    }

    #[test]
    fn serve_defaults_match_default_args() {
        let cli = Cli::try_parse_from(["praetorian", "serve"]).expect("parse should succeed");
        assert_eq!(cli.command, Some(Command::Serve(ServeArgs::default())));
    }

    #[test]
    fn parses_keygen_subcommand() {
        let cli = Cli::try_parse_from(["praetorian", "keygen", "--id", "2024-q1"])
            .expect("parse should succeed");
        assert_eq!(
            cli.command,
            Some(Command::Keygen {
                id: "2024-q1".into()
            })
        );
    }

    #[test]
    fn parses_config_check_subcommand() {
        let cli = Cli::try_parse_from(["praetorian", "config", "check"])
            .expect("parse should succeed");
        assert_eq!(
            cli.command,
            Some(Command::Config(ConfigCommand::Check { config: None }))
        );
    }
}
