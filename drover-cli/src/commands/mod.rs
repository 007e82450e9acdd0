//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod task;

pub use task::TaskCommands;

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use drover_core::resolve_executors;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Remote task inspection and teardown
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Show how many executor slots a fleet setting resolves to
    Executors {
        /// Requested executor count (zero or negative means unset)
        #[arg(allow_negative_numbers = true)]
        requested: i32,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Task { command } => task::handle_task_command(command, config).await,
        Commands::Executors { requested } => {
            let resolved = resolve_executors(requested);
            println!(
                "{} requested → {} executor slot(s)",
                requested.to_string().dimmed(),
                resolved.to_string().bold()
            );
            Ok(())
        }
    }
}
