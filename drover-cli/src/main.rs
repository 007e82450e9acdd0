//! Drover CLI
//!
//! Command-line interface for inspecting and reclaiming the remote tasks
//! behind fleet agents.

mod commands;
mod config;

use anyhow::{Context, Result};
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "drover")]
#[command(about = "Drover agent lifecycle CLI", long_about = None)]
struct Cli {
    /// Task backend (http or podman)
    #[arg(long, env = "DROVER_TASK_BACKEND", default_value = "http")]
    backend: String,

    /// Scheduling service URL
    #[arg(long, env = "DROVER_BACKEND_URL", default_value = "http://localhost:8080")]
    backend_url: String,

    /// Request timeout in seconds
    #[arg(long, env = "DROVER_REQUEST_TIMEOUT", default_value_t = 30)]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config {
        backend: cli.backend.parse().context("Invalid --backend")?,
        backend_url: cli.backend_url,
        request_timeout: Duration::from_secs(cli.timeout),
    };

    handle_command(cli.command, &config).await
}
