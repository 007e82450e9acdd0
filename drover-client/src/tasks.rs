//! Task endpoints of the HTTP scheduling service

use async_trait::async_trait;
use drover_core::domain::task::TaskSnapshot;
use drover_core::dto::task::{ErrorResponse, StopTaskRequest, TaskDescription};
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::error::{ClientError, Result};
use crate::{HttpTaskClient, RemoteTaskClient};

#[async_trait]
impl RemoteTaskClient for HttpTaskClient {
    /// `GET /api/clusters/{cluster}/tasks/{task}`
    ///
    /// A 404 with the service's error body means it no longer knows the task.
    /// Any other 404 comes from something in front of the API and is an error.
    async fn describe_task(&self, task_id: &str, cluster_id: &str) -> Result<Option<TaskSnapshot>> {
        let url = self.task_url(cluster_id, task_id, None)?;
        debug!("Describing task {} in cluster {}", task_id, cluster_id);

        let response = self.client.get(url.clone()).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            let body = response.text().await.unwrap_or_default();
            return match parse_not_found(&body) {
                Some(message) => {
                    debug!(
                        "Task {} not found in cluster {}: {}",
                        task_id, cluster_id, message
                    );
                    Ok(None)
                }
                None => {
                    warn!("{} answered 404 without a task API error body", url);
                    Err(ClientError::UnexpectedResponse(format!(
                        "404 from {} is not a task API answer, check the backend URL",
                        url
                    )))
                }
            };
        }

        let description: TaskDescription = self.handle_response(response).await?;
        if let Some(reason) = &description.stopped_reason {
            debug!("Task {} stopped: {}", task_id, reason);
        }

        Ok(Some(description.into()))
    }

    /// `POST /api/clusters/{cluster}/tasks/{task}/stop`
    ///
    /// A 4xx answer surfaces as an API error that classifies as a rejection.
    async fn stop_task(&self, task_id: &str, cluster_id: &str) -> Result<()> {
        let url = self.task_url(cluster_id, task_id, Some("stop"))?;
        debug!("Stopping task {} in cluster {}", task_id, cluster_id);

        let response = self
            .client
            .post(url)
            .json(&StopTaskRequest::default())
            .send()
            .await?;

        self.handle_empty_response(response).await
    }
}

/// Extracts the message of a task API error body
fn parse_not_found(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .map(|body| body.error)
}
