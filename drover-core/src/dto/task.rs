//! Task DTOs
//!
//! JSON shapes used by the scheduling service's HTTP API. Field names are
//! camelCase on the wire.

use serde::{Deserialize, Serialize};

use crate::domain::task::{TaskSnapshot, TaskStatus};

/// Response body of a task describe call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDescription {
    pub task_id: String,
    pub cluster_id: String,
    pub last_status: TaskStatus,
    pub desired_status: TaskStatus,

    /// Why the service stopped the task, once it has
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stopped_reason: Option<String>,
}

impl From<TaskDescription> for TaskSnapshot {
    fn from(description: TaskDescription) -> Self {
        TaskSnapshot {
            last_status: description.last_status,
            desired_status: description.desired_status,
        }
    }
}

/// Error body the scheduling service sends with a failed call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Request body of a task stop call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopTaskRequest {
    /// Free-form reason recorded by the service alongside the stop
    pub reason: String,
}

impl Default for StopTaskRequest {
    fn default() -> Self {
        Self {
            reason: "Agent retired by drover".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_description_parses_camel_case() {
        let json = r#"{
            "taskId": "arn:aws:ecs:us-east-1:123:task/default/abc",
            "clusterId": "arn:aws:ecs:us-east-1:123:cluster/default",
            "lastStatus": "PROVISIONING",
            "desiredStatus": "RUNNING"
        }"#;

        let description: TaskDescription = serde_json::from_str(json).unwrap();
        assert_eq!(description.last_status, TaskStatus::Provisioning);
        assert!(description.stopped_reason.is_none());

        let snapshot = TaskSnapshot::from(description);
        assert_eq!(snapshot.desired_status, TaskStatus::Running);
    }

    #[test]
    fn test_error_response_parses() {
        let body: ErrorResponse =
            serde_json::from_str(r#"{"error": "Task 'abc' not found"}"#).unwrap();
        assert_eq!(body.error, "Task 'abc' not found");
        assert!(serde_json::from_str::<ErrorResponse>("<html>404</html>").is_err());
    }

    #[test]
    fn test_description_keeps_stopped_reason() {
        let json = r#"{
            "taskId": "t",
            "clusterId": "c",
            "lastStatus": "STOPPED",
            "desiredStatus": "STOPPED",
            "stoppedReason": "Essential container in task exited"
        }"#;

        let description: TaskDescription = serde_json::from_str(json).unwrap();
        assert_eq!(
            description.stopped_reason.as_deref(),
            Some("Essential container in task exited")
        );
    }
}
