//! Drover remote task clients
//!
//! The agent controller only needs two things from a task scheduling service:
//! describe a task and stop it. [`RemoteTaskClient`] captures that capability,
//! and this crate ships two backends for it:
//!
//! - [`HttpTaskClient`]: a JSON-over-HTTP scheduling service API
//! - [`PodmanTaskClient`]: containers on a local or remote podman connection
//!
//! # Example
//!
//! ```no_run
//! use drover_client::{HttpTaskClient, RemoteTaskClient};
//!
//! #[tokio::main]
//! async fn main() -> drover_client::Result<()> {
//!     let client = HttpTaskClient::new("http://localhost:8080");
//!
//!     match client.describe_task("mytaskarn", "myclusterarn").await? {
//!         Some(snapshot) => println!("Task is {}", snapshot),
//!         None => println!("Task is gone"),
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
mod podman;
mod tasks;

pub use error::{ClientError, Result};
pub use podman::{LOCAL_CLUSTER, PodmanTaskClient};

use async_trait::async_trait;
use drover_core::domain::task::TaskSnapshot;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

/// Capability to observe and reclaim remote tasks
///
/// Implementations must keep "the task does not exist" apart from "the
/// backend could not be reached": the former is `Ok(None)` from
/// [`describe_task`](Self::describe_task), the latter an error.
#[async_trait]
pub trait RemoteTaskClient: Send + Sync {
    /// Fetches a fresh snapshot of a task
    ///
    /// # Returns
    /// `Ok(None)` when the task cannot be found in the cluster
    async fn describe_task(&self, task_id: &str, cluster_id: &str) -> Result<Option<TaskSnapshot>>;

    /// Asks the backend to stop a task
    ///
    /// The backend may keep reporting the task as describable for a while
    /// after this returns.
    async fn stop_task(&self, task_id: &str, cluster_id: &str) -> Result<()>;
}

/// HTTP client for a task scheduling service
#[derive(Debug, Clone)]
pub struct HttpTaskClient {
    /// Base URL of the service (e.g., "http://localhost:8080")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl HttpTaskClient {
    /// Create a new task client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the scheduling service API
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new task client with a custom HTTP client
    ///
    /// Timeouts belong here: the agent controller never imposes its own.
    ///
    /// # Example
    /// ```
    /// use drover_client::HttpTaskClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(30))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = HttpTaskClient::with_client("http://localhost:8080", http_client);
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the service
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds `{base}/api/clusters/{cluster}/tasks/{task}[/{action}]`
    ///
    /// Ids are pushed as path segments so ARN characters like `/` get
    /// percent-encoded instead of splitting the path.
    fn task_url(&self, cluster_id: &str, task_id: &str, action: Option<&str>) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            ClientError::InvalidRequest(format!("Invalid base URL '{}': {}", self.base_url, e))
        })?;

        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                ClientError::InvalidRequest(format!(
                    "Base URL '{}' cannot carry a path",
                    self.base_url
                ))
            })?;
            segments
                .pop_if_empty()
                .extend(["api", "clusters", cluster_id, "tasks", task_id]);
            if let Some(action) = action {
                segments.push(action);
            }
        }

        Ok(url)
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response that carries no body we care about
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(())
    }
}
