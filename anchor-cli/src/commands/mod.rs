//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod baseline;

pub use baseline::BaselineCommands;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Baseline management
    Baseline {
        #[command(subcommand)]
        command: BaselineCommands,
    },
}

/// Handle a CLI command
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Baseline { command } => baseline::handle_baseline_command(command, config).await,
    }
}
