//! Agent daemon configuration
//!
//! Defines the monitor's tunables: which backend to talk to, how often to
//! re-check agents, how many failed describes to tolerate, and which agents
//! to manage.

use anyhow::{Context, Result};
use std::str::FromStr;
use std::time::Duration;

/// Which remote task client the daemon uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// JSON-over-HTTP scheduling service
    Http,
    /// Podman connections
    Podman,
}

impl FromStr for BackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(BackendKind::Http),
            "podman" => Ok(BackendKind::Podman),
            other => anyhow::bail!("unknown task backend '{}' (expected http or podman)", other),
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Http => write!(f, "http"),
            BackendKind::Podman => write!(f, "podman"),
        }
    }
}

/// An agent handed to the daemon by the provisioning flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSpec {
    pub node_name: String,
    pub task_id: String,
    pub cluster_id: String,
}

impl AgentSpec {
    /// Parses `node|task|cluster` entries separated by `;`
    ///
    /// `|` is used because task and cluster ids are often ARNs full of `:`
    /// and `/`.
    pub fn parse_list(raw: &str) -> Result<Vec<AgentSpec>> {
        raw.split(';')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                let fields: Vec<&str> = entry.split('|').map(str::trim).collect();
                match fields.as_slice() {
                    [node, task, cluster]
                        if !node.is_empty() && !task.is_empty() && !cluster.is_empty() =>
                    {
                        Ok(AgentSpec {
                            node_name: node.to_string(),
                            task_id: task.to_string(),
                            cluster_id: cluster.to_string(),
                        })
                    }
                    _ => anyhow::bail!(
                        "invalid agent entry '{}', expected node|task|cluster",
                        entry
                    ),
                }
            })
            .collect()
    }
}

/// Agent daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Name of the fleet these agents belong to
    pub fleet_name: String,

    /// Remote task client to use
    pub backend: BackendKind,

    /// Scheduling service base URL (http backend only)
    pub backend_url: String,

    /// Transport timeout for each backend request
    pub request_timeout: Duration,

    /// How often every agent is re-checked
    pub check_interval: Duration,

    /// Executor slots requested by the fleet; zero or less means one
    pub num_executors: i32,

    /// Consecutive failed describes before an agent is retired anyway
    pub max_describe_failures: u32,

    /// Maximum concurrent describe/stop calls per cycle
    pub max_parallel_checks: usize,

    /// Agents to manage from startup
    pub agents: Vec<AgentSpec>,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(fleet_name: String, backend_url: String) -> Self {
        Self {
            fleet_name,
            backend: BackendKind::Http,
            backend_url,
            request_timeout: Duration::from_secs(30),
            check_interval: Duration::from_secs(60),
            num_executors: 0,
            max_describe_failures: 3,
            max_parallel_checks: 8,
            agents: Vec::new(),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables (all optional):
    /// - FLEET_NAME (default: random UUID)
    /// - TASK_BACKEND (http | podman, default: http)
    /// - BACKEND_URL (default: http://localhost:8080)
    /// - REQUEST_TIMEOUT (seconds, default: 30)
    /// - CHECK_INTERVAL (seconds, default: 60)
    /// - NUM_EXECUTORS (default: 0, meaning one slot)
    /// - MAX_DESCRIBE_FAILURES (default: 3)
    /// - MAX_PARALLEL_CHECKS (default: 8)
    /// - AGENTS (`node|task|cluster;...`, default: none)
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let fleet_name = std::env::var("FLEET_NAME").unwrap_or(defaults.fleet_name);

        let backend = match std::env::var("TASK_BACKEND") {
            Ok(raw) => raw
                .parse::<BackendKind>()
                .context("Invalid TASK_BACKEND")?,
            Err(_) => defaults.backend,
        };

        let backend_url = std::env::var("BACKEND_URL").unwrap_or(defaults.backend_url);

        let request_timeout = std::env::var("REQUEST_TIMEOUT")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        let check_interval = std::env::var("CHECK_INTERVAL")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.check_interval);

        let num_executors = std::env::var("NUM_EXECUTORS")
            .ok()
            .and_then(|s| s.parse::<i32>().ok())
            .unwrap_or(defaults.num_executors);

        let max_describe_failures = std::env::var("MAX_DESCRIBE_FAILURES")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(defaults.max_describe_failures);

        let max_parallel_checks = std::env::var("MAX_PARALLEL_CHECKS")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(defaults.max_parallel_checks);

        let agents = match std::env::var("AGENTS") {
            Ok(raw) => AgentSpec::parse_list(&raw).context("Invalid AGENTS")?,
            Err(_) => Vec::new(),
        };

        Ok(Self {
            fleet_name,
            backend,
            backend_url,
            request_timeout,
            check_interval,
            num_executors,
            max_describe_failures,
            max_parallel_checks,
            agents,
        })
    }

    /// Adds an agent to manage
    pub fn with_agent(mut self, node_name: &str, task_id: &str, cluster_id: &str) -> Self {
        self.agents.push(AgentSpec {
            node_name: node_name.to_string(),
            task_id: task_id.to_string(),
            cluster_id: cluster_id.to_string(),
        });
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.fleet_name.is_empty() {
            anyhow::bail!("fleet_name cannot be empty");
        }

        if self.backend == BackendKind::Http
            && !self.backend_url.starts_with("http://")
            && !self.backend_url.starts_with("https://")
        {
            anyhow::bail!("backend_url must start with http:// or https://");
        }

        if self.check_interval.as_secs() == 0 {
            anyhow::bail!("check_interval must be greater than 0");
        }

        if self.max_describe_failures == 0 {
            anyhow::bail!("max_describe_failures must be greater than 0");
        }

        if self.max_parallel_checks == 0 {
            anyhow::bail!("max_parallel_checks must be greater than 0");
        }

        let mut seen = std::collections::HashSet::new();
        for agent in &self.agents {
            if !seen.insert(agent.node_name.as_str()) {
                anyhow::bail!("agent '{}' is listed more than once", agent.node_name);
            }
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            uuid::Uuid::new_v4().to_string(),
            "http://localhost:8080".to_string(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.backend, BackendKind::Http);
        assert_eq!(config.check_interval, Duration::from_secs(60));
        assert_eq!(config.max_describe_failures, 3);
        assert_eq!(config.num_executors, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.backend_url = "not-a-url".to_string();
        assert!(config.validate().is_err());

        // The URL is irrelevant for podman
        config.backend = BackendKind::Podman;
        assert!(config.validate().is_ok());

        config.max_describe_failures = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duplicate_agents_are_rejected() {
        let config = Config::default()
            .with_agent("a", "task-1", "cluster")
            .with_agent("a", "task-2", "cluster");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_backend_kind_parsing() {
        assert_eq!("http".parse::<BackendKind>().unwrap(), BackendKind::Http);
        assert_eq!("Podman".parse::<BackendKind>().unwrap(), BackendKind::Podman);
        assert!("ecs".parse::<BackendKind>().is_err());
    }

    #[test]
    fn test_parse_agent_list() {
        let agents = AgentSpec::parse_list(
            "node-1|arn:aws:ecs:us-east-1:123:task/prod/abc|arn:aws:ecs:us-east-1:123:cluster/prod; node-2|c2|local;",
        )
        .unwrap();

        assert_eq!(agents.len(), 2);
        assert_eq!(agents[0].node_name, "node-1");
        assert_eq!(agents[0].task_id, "arn:aws:ecs:us-east-1:123:task/prod/abc");
        assert_eq!(agents[1].cluster_id, "local");
    }

    #[test]
    fn test_parse_agent_list_rejects_bad_entries() {
        assert!(AgentSpec::parse_list("node-1|task").is_err());
        assert!(AgentSpec::parse_list("node-1||cluster").is_err());
        assert!(AgentSpec::parse_list("").unwrap().is_empty());
    }
}
