//! Task command handlers
//!
//! Inspect a remote task the way the agent daemon sees it, or reclaim it with
//! the same best-effort teardown the daemon uses.

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use drover_agent::backend::build_client;
use drover_agent::{AgentLifecycleController, BufferedListener};
use drover_core::domain::log::LogLevel;
use drover_core::domain::task::TaskStatus;
use drover_core::evaluate;

use crate::config::Config;

/// Task subcommands
#[derive(Subcommand)]
pub enum TaskCommands {
    /// Describe a task and print its survivability verdict
    Status {
        /// Task id (or ARN)
        #[arg(long)]
        task: String,
        /// Cluster id (or ARN); `local` for the default podman socket
        #[arg(long)]
        cluster: String,
    },
    /// Stop a task, best-effort
    Stop {
        /// Task id (or ARN)
        #[arg(long)]
        task: String,
        /// Cluster id (or ARN); `local` for the default podman socket
        #[arg(long)]
        cluster: String,
    },
}

/// Handle task commands
pub async fn handle_task_command(command: TaskCommands, config: &Config) -> Result<()> {
    let client = build_client(config.backend, &config.backend_url, config.request_timeout)?;

    match command {
        TaskCommands::Status { task, cluster } => {
            let controller =
                AgentLifecycleController::new("drover-cli", 0, client).with_task(&task, &cluster)?;
            show_status(&controller).await
        }
        TaskCommands::Stop { task, cluster } => {
            let controller =
                AgentLifecycleController::new("drover-cli", 0, client).with_task(&task, &cluster)?;
            stop_task(&controller).await
        }
    }
}

/// Describe the task and print the verdict
async fn show_status(controller: &AgentLifecycleController) -> Result<()> {
    let snapshot = controller.describe().await?;
    let survivable = evaluate(snapshot.as_ref());
    let task_id = controller.identity().task_id().unwrap_or_default();

    println!("  {} Task {}", "▸".cyan(), task_id.bold());
    match &snapshot {
        Some(snapshot) => {
            println!("    Last status:     {}", colorize_status(&snapshot.last_status));
            println!(
                "    Desired status:  {}",
                colorize_status(&snapshot.desired_status)
            );
        }
        None => println!("    {}", "Task not found".red()),
    }

    let verdict = if survivable {
        "survivable".green()
    } else {
        "not survivable".red()
    };
    println!("    Verdict:         {}", verdict.bold());

    Ok(())
}

/// Run best-effort teardown and print whatever was absorbed
async fn stop_task(controller: &AgentLifecycleController) -> Result<()> {
    let listener = BufferedListener::new();
    controller.terminate(&listener).await;

    let entries = listener.drain();
    if entries.is_empty() {
        println!("{}", "Stop requested.".green());
        return Ok(());
    }

    println!("{}", "Stop attempted, backend reported:".yellow());
    for entry in entries {
        let level = match entry.level {
            LogLevel::Info => entry.level.to_string().normal(),
            LogLevel::Warning => entry.level.to_string().yellow(),
            LogLevel::Error => entry.level.to_string().red(),
        };
        println!(
            "  {} {} {}",
            entry
                .timestamp
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
                .dimmed(),
            level,
            entry.message
        );
    }

    Ok(())
}

/// Colorize task status for display
fn colorize_status(status: &TaskStatus) -> colored::ColoredString {
    let status_str = status.to_string();
    match status {
        TaskStatus::Running => status_str.green(),
        TaskStatus::Stopped => status_str.red(),
        TaskStatus::Stopping | TaskStatus::Deactivating | TaskStatus::Deprovisioning => {
            status_str.yellow()
        }
        _ => status_str.normal(),
    }
}
