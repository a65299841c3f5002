use std::path::PathBuf;

use clap::{Parser, Subcommand};

use skland_sync::config::CONFIG_ENV;

/// Skland session keeper and Arknights player-state poller.
#[derive(Debug, Parser)]
#[command(name = "skland-sync", version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, global = true, env = CONFIG_ENV)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Poll every configured account and serve the HTTP API (default)
    Run,

    /// Exchange a user token for a session and print config entries
    Login {
        /// User token from the Skland app
        #[arg(short, long, env = "SKLAND_TOKEN")]
        token: String,

        /// Where to store the issued session [default: the config's credentials_path]
        #[arg(long)]
        credentials: Option<PathBuf>,
    },

    /// Run the daily attendance
    Sign {
        /// Only this game uid
        #[arg(long)]
        uid: Option<String>,
    },

    /// Poll once and print the account data as JSON
    Status {
        /// Only this game uid
        #[arg(long)]
        uid: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_login_credentials_is_optional() {
        let cli = Cli::try_parse_from(["skland-sync", "login", "--token", "t"]).unwrap();
        match cli.command {
            Some(Command::Login { token, credentials }) => {
                assert_eq!(token, "t");
                assert!(credentials.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from([
            "skland-sync",
            "login",
            "--token",
            "t",
            "--credentials",
            "/tmp/sessions.json",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Login { credentials, .. }) => {
                assert_eq!(credentials, Some(PathBuf::from("/tmp/sessions.json")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_sign() {
        let cli = Cli::try_parse_from(["skland-sync", "sign", "--uid", "12345678"]).unwrap();
        match cli.command {
            Some(Command::Sign { uid }) => assert_eq!(uid.as_deref(), Some("12345678")),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
