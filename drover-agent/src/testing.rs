//! Hand-written fakes shared by the agent's unit tests

use async_trait::async_trait;
use drover_client::{ClientError, RemoteTaskClient, Result};
use drover_core::domain::task::TaskSnapshot;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// What a fake describe call answers for one task
#[derive(Debug, Clone)]
pub enum Describe {
    Found(TaskSnapshot),
    Missing,
    NotFoundError,
    Unreachable,
}

/// What a fake stop call answers for one task
#[derive(Debug, Clone, Copy)]
pub enum Stop {
    Succeeds,
    Rejected,
    Unreachable,
    Slow(Duration),
    Panics,
}

/// Scriptable client that records every call it receives
#[derive(Default)]
pub struct FakeTaskClient {
    describes: Mutex<HashMap<String, Describe>>,
    stops: Mutex<HashMap<String, Stop>>,
    describe_calls: Mutex<Vec<(String, String)>>,
    stop_calls: Mutex<Vec<(String, String)>>,
}

impl FakeTaskClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_describe(&self, task_id: &str, answer: Describe) {
        self.describes
            .lock()
            .unwrap()
            .insert(task_id.to_string(), answer);
    }

    pub fn on_stop(&self, task_id: &str, answer: Stop) {
        self.stops.lock().unwrap().insert(task_id.to_string(), answer);
    }

    pub fn describe_calls(&self) -> Vec<(String, String)> {
        self.describe_calls.lock().unwrap().clone()
    }

    pub fn stop_calls(&self) -> Vec<(String, String)> {
        self.stop_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteTaskClient for FakeTaskClient {
    async fn describe_task(&self, task_id: &str, cluster_id: &str) -> Result<Option<TaskSnapshot>> {
        self.describe_calls
            .lock()
            .unwrap()
            .push((task_id.to_string(), cluster_id.to_string()));

        let answer = self
            .describes
            .lock()
            .unwrap()
            .get(task_id)
            .cloned()
            .unwrap_or(Describe::Missing);

        match answer {
            Describe::Found(snapshot) => Ok(Some(snapshot)),
            Describe::Missing => Ok(None),
            Describe::NotFoundError => Err(ClientError::NotFound(task_id.to_string())),
            Describe::Unreachable => Err(ClientError::api_error(503, "Service Unavailable")),
        }
    }

    async fn stop_task(&self, task_id: &str, cluster_id: &str) -> Result<()> {
        self.stop_calls
            .lock()
            .unwrap()
            .push((task_id.to_string(), cluster_id.to_string()));

        let answer = self
            .stops
            .lock()
            .unwrap()
            .get(task_id)
            .copied()
            .unwrap_or(Stop::Succeeds);

        match answer {
            Stop::Succeeds => Ok(()),
            Stop::Rejected => Err(ClientError::Rejected("failed".to_string())),
            Stop::Unreachable => Err(ClientError::api_error(500, "Internal Server Error")),
            Stop::Slow(delay) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
            Stop::Panics => panic!("stop_task blew up for {}", task_id),
        }
    }
}
