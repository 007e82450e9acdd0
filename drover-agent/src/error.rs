//! Error types for agent lifecycle operations

use drover_client::ClientError;
use drover_core::CoreError;
use thiserror::Error;

/// Errors surfaced by the lifecycle controller and the retirement monitor
///
/// Teardown never produces one of these: stop failures are absorbed inside
/// the controller.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// A lifecycle query was attempted before the task identity was assigned
    #[error("Agent '{node}' has no task identity assigned")]
    MissingTaskIdentity { node: String },

    /// Describe failed for a reason other than the task being gone
    #[error("Failed to describe task {task_id} in cluster {cluster_id}: {source}")]
    Transport {
        task_id: String,
        cluster_id: String,
        #[source]
        source: ClientError,
    },

    /// Identity or state machine invariant violated
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// Monitor already tracks an agent with this node name
    #[error("Agent '{node}' is already registered")]
    AlreadyRegistered { node: String },

    /// Monitor does not track an agent with this node name
    #[error("Agent '{node}' is not registered")]
    UnknownAgent { node: String },
}

impl LifecycleError {
    /// Whether the caller may reasonably retry the same call later
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}
