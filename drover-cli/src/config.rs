//! Configuration module
//!
//! Handles CLI configuration: which task backend to talk to and where.

use drover_agent::config::BackendKind;
use std::time::Duration;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Remote task client to use
    pub backend: BackendKind,

    /// URL of the scheduling service (http backend only)
    pub backend_url: String,

    /// Transport timeout for each backend request
    pub request_timeout: Duration,
}
