//! Remote task client construction
//!
//! Picks the client implementation named by configuration. Transport
//! timeouts are applied here, on the client, never in the controller.

use anyhow::{Context, Result};
use drover_client::{HttpTaskClient, PodmanTaskClient, RemoteTaskClient};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::BackendKind;

/// Builds the shared remote task client
pub fn build_client(
    kind: BackendKind,
    backend_url: &str,
    request_timeout: Duration,
) -> Result<Arc<dyn RemoteTaskClient>> {
    match kind {
        BackendKind::Http => {
            let http_client = Client::builder()
                .timeout(request_timeout)
                .build()
                .context("Failed to build HTTP client")?;
            info!("Using HTTP task backend at {}", backend_url);
            Ok(Arc::new(HttpTaskClient::with_client(backend_url, http_client)))
        }
        BackendKind::Podman => {
            info!("Using podman task backend");
            Ok(Arc::new(PodmanTaskClient::new()))
        }
    }
}

/// Waits for podman to answer, with exponential backoff
///
/// Handles the daemon starting before the podman socket is up (common in
/// container environments).
pub async fn wait_for_podman(client: &PodmanTaskClient) -> Result<()> {
    const MAX_RETRIES: u32 = 10;
    const INITIAL_DELAY_MS: u64 = 500;
    const MAX_DELAY_MS: u64 = 30_000;

    let mut attempt = 0;
    let mut delay_ms = INITIAL_DELAY_MS;

    loop {
        attempt += 1;

        match client.check_available().await {
            Ok(_) => {
                if attempt > 1 {
                    info!("Podman available after {} attempt(s)", attempt);
                }
                return Ok(());
            }
            Err(e) => {
                if attempt >= MAX_RETRIES {
                    return Err(anyhow::anyhow!(
                        "Podman unavailable after {} attempts: {}",
                        MAX_RETRIES,
                        e
                    ));
                }

                warn!(
                    "Podman not available (attempt {}/{}): {}",
                    attempt, MAX_RETRIES, e
                );
                warn!("Retrying in {} ms...", delay_ms);

                tokio::time::sleep(Duration::from_millis(delay_ms)).await;

                // Exponential backoff with cap
                delay_ms = (delay_ms * 2).min(MAX_DELAY_MS);
            }
        }
    }
}
