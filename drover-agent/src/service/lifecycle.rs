//! Agent lifecycle controller
//!
//! One controller per worker. It owns the worker's identity and advertised
//! capacity, and projects the worker onto its remote task:
//! - `is_survivable` asks the scheduling service and applies the evaluator
//! - `terminate` asks the service to stop the task and swallows any failure
//!
//! Nothing is cached between calls and nothing is retried here; the caller
//! owns cadence and backoff.

use drover_client::RemoteTaskClient;
use drover_core::domain::task::TaskSnapshot;
use drover_core::domain::worker::WorkerIdentity;
use drover_core::{evaluate, resolve_executors};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::error::LifecycleError;
use crate::service::listener::TaskListener;

/// Lifecycle controller for a single remote-task-backed agent
pub struct AgentLifecycleController {
    identity: WorkerIdentity,
    num_executors: u32,
    client: Arc<dyn RemoteTaskClient>,
}

impl AgentLifecycleController {
    /// Creates a controller for a worker whose task is not yet known
    ///
    /// # Arguments
    /// * `node_name` - Fleet-visible name of the agent
    /// * `requested_executors` - Fleet setting; zero or negative means one slot
    /// * `client` - Shared remote task client
    pub fn new(
        node_name: impl Into<String>,
        requested_executors: i32,
        client: Arc<dyn RemoteTaskClient>,
    ) -> Self {
        Self {
            identity: WorkerIdentity::new(node_name),
            num_executors: resolve_executors(requested_executors),
            client,
        }
    }

    /// Binds the agent to its remote task
    ///
    /// Both ids are set together, once. Binding to a different task later fails.
    pub fn assign_task(
        &mut self,
        task_id: impl Into<String>,
        cluster_id: impl Into<String>,
    ) -> Result<(), LifecycleError> {
        self.identity.assign_task(task_id, cluster_id)?;
        debug!(
            "Agent {} bound to task {:?} in cluster {:?}",
            self.identity.node_name(),
            self.identity.task_id(),
            self.identity.cluster_id()
        );
        Ok(())
    }

    /// Builder form of [`assign_task`](Self::assign_task)
    pub fn with_task(
        mut self,
        task_id: impl Into<String>,
        cluster_id: impl Into<String>,
    ) -> Result<Self, LifecycleError> {
        self.assign_task(task_id, cluster_id)?;
        Ok(self)
    }

    pub fn identity(&self) -> &WorkerIdentity {
        &self.identity
    }

    pub fn node_name(&self) -> &str {
        self.identity.node_name()
    }

    /// Number of concurrent job slots this agent advertises
    pub fn num_executors(&self) -> u32 {
        self.num_executors
    }

    /// Fetches a fresh snapshot of the backing task
    ///
    /// A task the service reports as not found, whether as an empty answer or
    /// as a not-found error, comes back as `Ok(None)`. Every other client
    /// failure is a [`LifecycleError::Transport`].
    pub async fn describe(&self) -> Result<Option<TaskSnapshot>, LifecycleError> {
        let task = self
            .identity
            .task_ref()
            .ok_or_else(|| LifecycleError::MissingTaskIdentity {
                node: self.node_name().to_string(),
            })?;

        match self.client.describe_task(task.task_id, task.cluster_id).await {
            Ok(snapshot) => Ok(snapshot),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(LifecycleError::Transport {
                task_id: task.task_id.to_string(),
                cluster_id: task.cluster_id.to_string(),
                source: e,
            }),
        }
    }

    /// Decides whether the agent may keep serving
    ///
    /// Returns `Ok(false)` when the task is gone or stopped on either status
    /// axis. A describe failure is returned as an error, never as a verdict.
    pub async fn is_survivable(&self) -> Result<bool, LifecycleError> {
        let snapshot = self.describe().await?;
        let survivable = evaluate(snapshot.as_ref());

        match &snapshot {
            Some(snapshot) => debug!(
                "Agent {} task {}: survivable={}",
                self.node_name(),
                snapshot,
                survivable
            ),
            None => debug!("Agent {} task not found: survivable=false", self.node_name()),
        }

        Ok(survivable)
    }

    /// Stops the backing task, best-effort
    ///
    /// Makes exactly one stop call. Any failure is written to `listener`,
    /// traced, and dropped; this always returns normally. Without an assigned
    /// task there is nothing to reclaim and no call is made.
    pub async fn terminate(&self, listener: &dyn TaskListener) {
        let Some(task) = self.identity.task_ref() else {
            debug!(
                "Agent {} has no task assigned, nothing to terminate",
                self.node_name()
            );
            return;
        };

        info!(
            "Terminating agent {}: stopping task {} in cluster {}",
            self.node_name(),
            task.task_id,
            task.cluster_id
        );

        match self.client.stop_task(task.task_id, task.cluster_id).await {
            Ok(()) => {
                info!("Stop requested for task {}", task.task_id);
            }
            Err(e) if e.is_rejection() => {
                let message = format!(
                    "Couldn't stop task {} in cluster {}, the service rejected the request: {}",
                    task.task_id, task.cluster_id, e
                );
                warn!("{}", message);
                listener.warn(&message);
            }
            Err(e) => {
                let message = format!(
                    "Couldn't stop task {} in cluster {}: {}",
                    task.task_id, task.cluster_id, e
                );
                error!("{}", message);
                listener.error(&message);
            }
        }
    }
}

impl fmt::Debug for AgentLifecycleController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentLifecycleController")
            .field("identity", &self.identity)
            .field("num_executors", &self.num_executors)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::listener::BufferedListener;
    use crate::testing::{Describe, FakeTaskClient, Stop};
    use drover_core::domain::log::LogLevel;

    fn controller(client: &Arc<FakeTaskClient>) -> AgentLifecycleController {
        AgentLifecycleController::new("myagent", 0, client.clone())
            .with_task("mytaskarn", "myclusterarn")
            .unwrap()
    }

    async fn survivable_with(last: &str, desired: &str) -> bool {
        let client = Arc::new(FakeTaskClient::new());
        client.on_describe("mytaskarn", Describe::Found(TaskSnapshot::new(last, desired)));

        let sut = controller(&client);
        let verdict = sut.is_survivable().await.unwrap();

        assert_eq!(
            client.describe_calls(),
            vec![("mytaskarn".to_string(), "myclusterarn".to_string())]
        );
        verdict
    }

    #[tokio::test]
    async fn test_survivable_if_provisioning_and_desired_running() {
        assert!(survivable_with("PROVISIONING", "RUNNING").await);
    }

    #[tokio::test]
    async fn test_survivable_if_running_and_desired_running() {
        assert!(survivable_with("RUNNING", "RUNNING").await);
    }

    #[tokio::test]
    async fn test_not_survivable_if_stopped_and_desired_running() {
        assert!(!survivable_with("STOPPED", "RUNNING").await);
    }

    #[tokio::test]
    async fn test_not_survivable_if_running_and_desired_stopped() {
        assert!(!survivable_with("RUNNING", "STOPPED").await);
    }

    #[tokio::test]
    async fn test_not_survivable_if_stopped_and_desired_stopped() {
        assert!(!survivable_with("STOPPED", "STOPPED").await);
    }

    #[tokio::test]
    async fn test_not_survivable_if_task_cannot_be_found() {
        let client = Arc::new(FakeTaskClient::new());
        client.on_describe("mytaskarn", Describe::Missing);

        assert!(!controller(&client).is_survivable().await.unwrap());
    }

    #[tokio::test]
    async fn test_not_found_error_is_not_survivable() {
        let client = Arc::new(FakeTaskClient::new());
        client.on_describe("mytaskarn", Describe::NotFoundError);

        assert!(!controller(&client).is_survivable().await.unwrap());
    }

    #[tokio::test]
    async fn test_transport_failure_is_an_error() {
        let client = Arc::new(FakeTaskClient::new());
        client.on_describe("mytaskarn", Describe::Unreachable);

        let err = controller(&client).is_survivable().await.unwrap_err();
        assert!(err.is_transient());
        assert!(matches!(
            err,
            LifecycleError::Transport { ref task_id, .. } if task_id == "mytaskarn"
        ));
    }

    #[tokio::test]
    async fn test_snapshot_is_never_cached() {
        let client = Arc::new(FakeTaskClient::new());
        client.on_describe(
            "mytaskarn",
            Describe::Found(TaskSnapshot::new("RUNNING", "RUNNING")),
        );
        let sut = controller(&client);
        assert!(sut.is_survivable().await.unwrap());

        client.on_describe(
            "mytaskarn",
            Describe::Found(TaskSnapshot::new("RUNNING", "STOPPED")),
        );
        assert!(!sut.is_survivable().await.unwrap());
        assert_eq!(client.describe_calls().len(), 2);
    }

    #[tokio::test]
    async fn test_survivability_requires_task_identity() {
        let client = Arc::new(FakeTaskClient::new());
        let sut = AgentLifecycleController::new("myagent", 0, client.clone());

        let err = sut.is_survivable().await.unwrap_err();
        assert!(matches!(err, LifecycleError::MissingTaskIdentity { ref node } if node == "myagent"));
        assert!(client.describe_calls().is_empty());
    }

    #[tokio::test]
    async fn test_terminate_running_task() {
        let client = Arc::new(FakeTaskClient::new());
        let listener = BufferedListener::new();

        controller(&client).terminate(&listener).await;

        assert_eq!(
            client.stop_calls(),
            vec![("mytaskarn".to_string(), "myclusterarn".to_string())]
        );
        assert!(listener.is_empty());
    }

    #[tokio::test]
    async fn test_terminate_absorbs_rejection() {
        let client = Arc::new(FakeTaskClient::new());
        client.on_stop("mytaskarn", Stop::Rejected);
        let listener = BufferedListener::new();

        controller(&client).terminate(&listener).await;

        assert_eq!(
            client.stop_calls(),
            vec![("mytaskarn".to_string(), "myclusterarn".to_string())]
        );
        let entries = listener.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, LogLevel::Warning);
        assert!(entries[0].message.contains("failed"));
    }

    #[tokio::test]
    async fn test_terminate_absorbs_transport_failure() {
        let client = Arc::new(FakeTaskClient::new());
        client.on_stop("mytaskarn", Stop::Unreachable);
        let listener = BufferedListener::new();

        controller(&client).terminate(&listener).await;

        assert_eq!(client.stop_calls().len(), 1);
        let entries = listener.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, LogLevel::Error);
    }

    #[tokio::test]
    async fn test_terminate_without_task_is_noop() {
        let client = Arc::new(FakeTaskClient::new());
        let listener = BufferedListener::new();

        AgentLifecycleController::new("myagent", 0, client.clone())
            .terminate(&listener)
            .await;

        assert!(client.stop_calls().is_empty());
        assert!(listener.is_empty());
    }

    #[test]
    fn test_agent_has_1_executor_as_default() {
        let client = Arc::new(FakeTaskClient::new());
        let sut = AgentLifecycleController::new("myagent", 0, client);
        assert_eq!(sut.num_executors(), 1);
    }

    #[test]
    fn test_agent_has_4_executors_when_configured() {
        let client = Arc::new(FakeTaskClient::new());
        let sut = AgentLifecycleController::new("myagent", 4, client);
        assert_eq!(sut.num_executors(), 4);
    }

    #[test]
    fn test_task_identity_is_immutable() {
        let client = Arc::new(FakeTaskClient::new());
        let mut sut = controller(&client);

        let err = sut.assign_task("othertask", "myclusterarn").unwrap_err();
        assert!(matches!(err, LifecycleError::Domain(_)));
        assert_eq!(sut.identity().task_id(), Some("mytaskarn"));
    }
}
