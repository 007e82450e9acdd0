//! Error types for Drover core domain operations

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised by domain types when an invariant would be broken
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// The worker already carries a task identity
    #[error("Worker '{node}' is already bound to task {task_id} in cluster {cluster_id}")]
    TaskAlreadyAssigned {
        node: String,
        task_id: String,
        cluster_id: String,
    },

    /// Agent state machine rejected a transition
    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
