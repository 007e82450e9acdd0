//! Podman task backend
//!
//! Treats containers on a podman connection as remote tasks:
//! - The cluster id names the podman system connection (`local` = default socket)
//! - The task id is the container name or id
//! - Container state is mapped onto task statuses
//! - Teardown is a plain `podman stop`

use async_trait::async_trait;
use drover_core::domain::task::{TaskSnapshot, TaskStatus};
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, info};

use crate::RemoteTaskClient;
use crate::error::{ClientError, Result};

/// Cluster id that targets the default podman socket instead of a named connection
pub const LOCAL_CLUSTER: &str = "local";

/// Podman-backed implementation of [`RemoteTaskClient`]
#[derive(Debug, Clone)]
pub struct PodmanTaskClient {
    /// Path or name of the podman binary
    binary: String,

    /// Seconds podman waits before killing a container on stop
    stop_timeout: Option<u32>,
}

impl PodmanTaskClient {
    /// Creates a client that runs `podman` from `PATH`
    pub fn new() -> Self {
        Self {
            binary: "podman".to_string(),
            stop_timeout: None,
        }
    }

    /// Uses a different podman binary
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Sets the grace period passed to `podman stop --time`
    pub fn with_stop_timeout(mut self, seconds: u32) -> Self {
        self.stop_timeout = Some(seconds);
        self
    }

    /// Checks that podman is installed and answering
    ///
    /// # Returns
    /// The version string reported by podman
    pub async fn check_available(&self) -> Result<String> {
        let output = Command::new(&self.binary)
            .arg("--version")
            .output()
            .await
            .map_err(|e| {
                ClientError::CommandFailed(format!(
                    "Failed to execute '{} --version'. Is podman installed? {}",
                    self.binary, e
                ))
            })?;

        if !output.status.success() {
            return Err(ClientError::CommandFailed(
                "Podman is not working correctly".to_string(),
            ));
        }

        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        info!("Podman is available: {}", version);
        Ok(version)
    }

    /// Starts a podman command aimed at the given connection
    fn command(&self, cluster_id: &str) -> Command {
        let mut command = Command::new(&self.binary);
        if cluster_id != LOCAL_CLUSTER {
            command.arg("--connection").arg(cluster_id);
        }
        command
    }
}

impl Default for PodmanTaskClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteTaskClient for PodmanTaskClient {
    async fn describe_task(&self, task_id: &str, cluster_id: &str) -> Result<Option<TaskSnapshot>> {
        debug!("Inspecting container {} on {}", task_id, cluster_id);

        let output = self
            .command(cluster_id)
            .arg("container")
            .arg("inspect")
            .arg(task_id)
            .output()
            .await
            .map_err(|e| {
                ClientError::CommandFailed(format!(
                    "Failed to execute podman container inspect: {}",
                    e
                ))
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            if is_no_such_container(&stderr) {
                debug!("Container {} not found on {}", task_id, cluster_id);
                return Ok(None);
            }

            return Err(ClientError::CommandFailed(format!(
                "podman container inspect {} exited with code {}: {}",
                task_id,
                output.status.code().unwrap_or(-1),
                stderr.trim()
            )));
        }

        parse_inspect_output(&stdout)
    }

    async fn stop_task(&self, task_id: &str, cluster_id: &str) -> Result<()> {
        debug!("Stopping container {} on {}", task_id, cluster_id);

        let mut command = self.command(cluster_id);
        command.arg("stop");
        if let Some(seconds) = self.stop_timeout {
            command.arg("--time").arg(seconds.to_string());
        }
        command.arg(task_id);

        let output = command.output().await.map_err(|e| {
            ClientError::CommandFailed(format!("Failed to execute podman stop: {}", e))
        })?;

        if output.status.success() {
            debug!("Container {} stopped", task_id);
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if is_no_such_container(&stderr) {
            return Err(ClientError::Rejected(stderr));
        }

        Err(ClientError::CommandFailed(format!(
            "podman stop {} exited with code {}: {}",
            task_id,
            output.status.code().unwrap_or(-1),
            stderr
        )))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InspectedContainer {
    state: ContainerState,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ContainerState {
    status: String,
}

/// Parses `podman container inspect` JSON into a snapshot
///
/// Podman prints an array; an empty one means the container is gone.
fn parse_inspect_output(stdout: &str) -> Result<Option<TaskSnapshot>> {
    let containers: Vec<InspectedContainer> = serde_json::from_str(stdout).map_err(|e| {
        ClientError::ParseError(format!("Failed to parse podman inspect output: {}", e))
    })?;

    Ok(containers
        .first()
        .map(|container| snapshot_from_container_status(&container.state.status)))
}

/// Maps a podman container status onto the task status pair
///
/// Podman has no notion of a desired status, so it is derived: a container
/// on its way down or already down is heading to `STOPPED`.
fn snapshot_from_container_status(status: &str) -> TaskSnapshot {
    let status = status.trim().to_ascii_lowercase();
    let (last, desired) = match status.as_str() {
        "created" | "configured" | "initialized" => (TaskStatus::Pending, TaskStatus::Running),
        "running" | "paused" => (TaskStatus::Running, TaskStatus::Running),
        "stopping" => (TaskStatus::Stopping, TaskStatus::Stopped),
        "exited" | "stopped" | "dead" | "removing" => (TaskStatus::Stopped, TaskStatus::Stopped),
        other => (
            TaskStatus::Other(other.to_ascii_uppercase()),
            TaskStatus::Running,
        ),
    };

    TaskSnapshot {
        last_status: last,
        desired_status: desired,
    }
}

fn is_no_such_container(stderr: &str) -> bool {
    let stderr = stderr.to_ascii_lowercase();
    stderr.contains("no such container") || stderr.contains("no such object")
}
