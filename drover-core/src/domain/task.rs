//! Remote task domain model
//!
//! A task is the scheduling service's unit of running compute. The agent only
//! ever sees it through a [`TaskSnapshot`], a point-in-time copy of the two
//! status fields the service reports.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status reported by the scheduling service for a task
///
/// The service speaks in upper-case strings. Known values get their own
/// variant; anything else is kept verbatim in [`TaskStatus::Other`] so a newer
/// backend never breaks parsing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    Provisioning,
    Pending,
    Activating,
    Running,
    Deactivating,
    Stopping,
    Deprovisioning,
    Stopped,
    Other(String),
}

impl TaskStatus {
    /// Wire representation of the status
    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Provisioning => "PROVISIONING",
            TaskStatus::Pending => "PENDING",
            TaskStatus::Activating => "ACTIVATING",
            TaskStatus::Running => "RUNNING",
            TaskStatus::Deactivating => "DEACTIVATING",
            TaskStatus::Stopping => "STOPPING",
            TaskStatus::Deprovisioning => "DEPROVISIONING",
            TaskStatus::Stopped => "STOPPED",
            TaskStatus::Other(raw) => raw,
        }
    }

    /// Returns true for the terminal status
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Stopped)
    }
}

impl From<&str> for TaskStatus {
    fn from(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PROVISIONING" => TaskStatus::Provisioning,
            "PENDING" => TaskStatus::Pending,
            "ACTIVATING" => TaskStatus::Activating,
            "RUNNING" => TaskStatus::Running,
            "DEACTIVATING" => TaskStatus::Deactivating,
            "STOPPING" => TaskStatus::Stopping,
            "DEPROVISIONING" => TaskStatus::Deprovisioning,
            "STOPPED" => TaskStatus::Stopped,
            _ => TaskStatus::Other(raw.to_string()),
        }
    }
}

impl From<String> for TaskStatus {
    fn from(raw: String) -> Self {
        TaskStatus::from(raw.as_str())
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        status.as_str().to_string()
    }
}

impl FromStr for TaskStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(TaskStatus::from(s))
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time view of a remote task
///
/// Built fresh from every describe call and dropped once a decision is made.
/// A task that could not be found is represented by the absence of a
/// snapshot, never by a snapshot with empty fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    /// Status the task was last observed in
    pub last_status: TaskStatus,

    /// Status the service is driving the task towards
    pub desired_status: TaskStatus,
}

impl TaskSnapshot {
    pub fn new(last_status: impl Into<TaskStatus>, desired_status: impl Into<TaskStatus>) -> Self {
        Self {
            last_status: last_status.into(),
            desired_status: desired_status.into(),
        }
    }
}

impl fmt::Display for TaskSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "last={} desired={}", self.last_status, self.desired_status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_statuses() {
        assert_eq!(TaskStatus::from("RUNNING"), TaskStatus::Running);
        assert_eq!(TaskStatus::from("stopped"), TaskStatus::Stopped);
        assert_eq!(TaskStatus::from(" PROVISIONING "), TaskStatus::Provisioning);
    }

    #[test]
    fn test_unknown_status_is_preserved() {
        let status = TaskStatus::from("HIBERNATING");
        assert_eq!(status, TaskStatus::Other("HIBERNATING".to_string()));
        assert_eq!(status.to_string(), "HIBERNATING");
        assert!(!status.is_terminal());
    }

    #[test]
    fn test_status_serializes_as_plain_string() {
        let json = serde_json::to_string(&TaskStatus::Stopped).unwrap();
        assert_eq!(json, "\"STOPPED\"");

        let parsed: TaskStatus = serde_json::from_str("\"PENDING\"").unwrap();
        assert_eq!(parsed, TaskStatus::Pending);
    }

    #[test]
    fn test_only_stopped_is_terminal() {
        assert!(TaskStatus::Stopped.is_terminal());
        assert!(!TaskStatus::Stopping.is_terminal());
        assert!(!TaskStatus::Deprovisioning.is_terminal());
    }
}
