//! Drover Agent daemon
//!
//! Keeps a fleet's agents in line with the scheduling service that runs their
//! backing tasks. Every check interval each agent's task is described afresh;
//! agents whose task is gone or stopping are terminated best-effort and
//! dropped from the fleet.

use anyhow::{Context, Result};
use drover_agent::backend::{build_client, wait_for_podman};
use drover_agent::config::{BackendKind, Config};
use drover_agent::{AgentLifecycleController, RetirementMonitor, TracingListener};
use drover_client::PodmanTaskClient;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "drover_agent=info,drover_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Drover Agent");

    let config = load_config()?;
    info!(
        "Loaded configuration: fleet={}, backend={}, agents={}",
        config.fleet_name,
        config.backend,
        config.agents.len()
    );

    if config.backend == BackendKind::Podman {
        wait_for_podman(&PodmanTaskClient::new()).await?;
    }

    let client = build_client(
        config.backend,
        &config.backend_url,
        config.request_timeout,
    )?;

    let monitor = RetirementMonitor::new(config.clone(), Arc::new(TracingListener));

    for agent in &config.agents {
        let controller =
            AgentLifecycleController::new(&agent.node_name, config.num_executors, client.clone())
                .with_task(&agent.task_id, &agent.cluster_id)
                .with_context(|| format!("Invalid task identity for agent {}", agent.node_name))?;
        monitor
            .register(controller)
            .with_context(|| format!("Failed to register agent {}", agent.node_name))?;
    }

    info!(
        "Managing {} agent(s), check interval {:?}",
        monitor.agent_names().len(),
        config.check_interval
    );

    monitor
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;

    info!("Drover Agent stopped");
    Ok(())
}

/// Loads configuration from environment variables
fn load_config() -> Result<Config> {
    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate()?;
    Ok(config)
}
