//! Anchor CLI
//!
//! Command-line interface for managing execution baselines.

mod commands;
mod config;

use anchor_core::domain::actor::Actor;
use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;

#[derive(Parser)]
#[command(name = "anchor")]
#[command(about = "Anchor execution baseline CLI", long_about = None)]
struct Cli {
    /// Server URL
    #[arg(long, env = "ANCHOR_SERVER_URL", default_value = "http://localhost:8080")]
    server_url: String,

    /// Id recorded as creator of baselines
    #[arg(long, env = "ANCHOR_USER_ID", default_value = "anchor-cli")]
    user_id: String,

    /// Display name recorded with the id
    #[arg(long, env = "ANCHOR_USER_NAME")]
    user_name: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let name = cli.user_name.unwrap_or_else(|| cli.user_id.clone());
    let config = Config {
        server_url: cli.server_url,
        actor: Actor::new(cli.user_id, name),
    };

    handle_command(cli.command, &config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use commands::BaselineCommands;

    #[test]
    fn test_parse_mark() {
        let app = "11111111-1111-4111-8111-111111111111";
        let execution = "22222222-2222-4222-8222-222222222222";
        let cli = Cli::try_parse_from([
            "anchor",
            "--server-url",
            "http://anchor:9000",
            "--user-id",
            "u-3",
            "baseline",
            "mark",
            app,
            execution,
        ])
        .unwrap();

        assert_eq!(cli.server_url, "http://anchor:9000");
        assert_eq!(cli.user_id, "u-3");
        match cli.command {
            Commands::Baseline {
                command: BaselineCommands::Mark { execution_id, .. },
            } => assert_eq!(execution_id.to_string(), execution),
            _ => panic!("expected baseline mark"),
        }
    }

    #[test]
    fn test_details_requires_context() {
        let result = Cli::try_parse_from([
            "anchor",
            "baseline",
            "details",
            "11111111-1111-4111-8111-111111111111",
            "22222222-2222-4222-8222-222222222222",
        ]);
        assert!(result.is_err());
    }
}
