//! Worker identity
//!
//! Ties a fleet-visible node name to the remote task backing it.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Borrowed handle on a remote task: the task id within its cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskRef<'a> {
    pub task_id: &'a str,
    pub cluster_id: &'a str,
}

/// Identity of a single worker
///
/// The node name is known at construction. The task and cluster ids arrive
/// later, from the provisioning flow, and are assigned together exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerIdentity {
    node_name: String,
    task_id: Option<String>,
    cluster_id: Option<String>,
}

impl WorkerIdentity {
    /// Creates an identity with no task bound yet
    pub fn new(node_name: impl Into<String>) -> Self {
        Self {
            node_name: node_name.into(),
            task_id: None,
            cluster_id: None,
        }
    }

    /// Binds the worker to its remote task
    ///
    /// Re-assigning the same pair is accepted; binding to a different task is
    /// an error since the identity is immutable once set.
    pub fn assign_task(
        &mut self,
        task_id: impl Into<String>,
        cluster_id: impl Into<String>,
    ) -> Result<()> {
        let task_id = task_id.into();
        let cluster_id = cluster_id.into();

        if task_id.trim().is_empty() {
            return Err(CoreError::InvalidInput("task id cannot be empty".to_string()));
        }
        if cluster_id.trim().is_empty() {
            return Err(CoreError::InvalidInput(
                "cluster id cannot be empty".to_string(),
            ));
        }

        if let Some(current) = self.task_ref() {
            if current.task_id == task_id && current.cluster_id == cluster_id {
                return Ok(());
            }
            return Err(CoreError::TaskAlreadyAssigned {
                node: self.node_name.clone(),
                task_id: current.task_id.to_string(),
                cluster_id: current.cluster_id.to_string(),
            });
        }

        self.task_id = Some(task_id);
        self.cluster_id = Some(cluster_id);
        Ok(())
    }

    pub fn node_name(&self) -> &str {
        &self.node_name
    }

    pub fn task_id(&self) -> Option<&str> {
        self.task_id.as_deref()
    }

    pub fn cluster_id(&self) -> Option<&str> {
        self.cluster_id.as_deref()
    }

    /// Returns the task handle, or `None` unless both ids are assigned
    pub fn task_ref(&self) -> Option<TaskRef<'_>> {
        match (self.task_id.as_deref(), self.cluster_id.as_deref()) {
            (Some(task_id), Some(cluster_id)) => Some(TaskRef {
                task_id,
                cluster_id,
            }),
            _ => None,
        }
    }
}
