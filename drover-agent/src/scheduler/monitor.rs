//! Retirement monitor
//!
//! Periodically re-checks every managed agent against the scheduling service.
//! Agents whose task is gone or stopping are retired: marked `Retiring`,
//! terminated best-effort, marked `Terminated` and dropped from the registry.
//!
//! The registry lock is only held to read or update bookkeeping. Remote calls
//! run on handles copied out of it, so a slow backend never blocks
//! registration or other agents' bookkeeping.
//!
//! Once an agent enters `Retiring` it always reaches `Terminated`: teardown
//! runs on a spawned task that owns its own handle to the registry, and a
//! panicking teardown still finishes the retirement.

use drover_core::domain::agent::AgentState;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::LifecycleError;
use crate::service::{AgentLifecycleController, TaskListener};

/// Bookkeeping for one agent under management
struct ManagedAgent {
    controller: Arc<AgentLifecycleController>,
    state: AgentState,
    describe_failures: u32,
}

type Registry = Arc<Mutex<HashMap<String, ManagedAgent>>>;

/// Summary of one check cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    /// Agents whose survivability was queried
    pub checked: usize,
    /// Node names retired during the cycle
    pub retired: Vec<String>,
    /// Describe calls that failed for a reason other than "not found"
    pub describe_failures: usize,
}

/// Monitor that keeps fleet membership in line with the scheduling service
pub struct RetirementMonitor {
    config: Config,
    agents: Registry,
    semaphore: Arc<Semaphore>,
    listener: Arc<dyn TaskListener>,
}

impl RetirementMonitor {
    /// Creates a monitor with an empty registry
    ///
    /// # Arguments
    /// * `config` - Check cadence, parallelism and failure tolerance
    /// * `listener` - Receives failures absorbed during teardown
    pub fn new(config: Config, listener: Arc<dyn TaskListener>) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.max_parallel_checks.max(1)));
        Self {
            config,
            agents: Arc::new(Mutex::new(HashMap::new())),
            semaphore,
            listener,
        }
    }

    /// Adds an agent to the registry
    ///
    /// The agent's task identity must already be assigned. It starts in
    /// `Provisioning` and moves to `Running` on its first survivable check.
    pub fn register(&self, controller: AgentLifecycleController) -> Result<(), LifecycleError> {
        let node = controller.node_name().to_string();
        if controller.identity().task_ref().is_none() {
            return Err(LifecycleError::MissingTaskIdentity { node });
        }

        let mut agents = self.agents.lock().unwrap();
        if agents.contains_key(&node) {
            return Err(LifecycleError::AlreadyRegistered { node });
        }

        info!(
            "Registered agent {} ({} executor(s))",
            node,
            controller.num_executors()
        );
        agents.insert(
            node,
            ManagedAgent {
                controller: Arc::new(controller),
                state: AgentState::Provisioning,
                describe_failures: 0,
            },
        );
        Ok(())
    }

    /// Marks an agent as serving its fleet without waiting for a check
    ///
    /// Idempotent for agents already running. Retiring agents cannot come back.
    pub fn mark_running(&self, node: &str) -> Result<(), LifecycleError> {
        let mut agents = self.agents.lock().unwrap();
        let agent = agents
            .get_mut(node)
            .ok_or_else(|| LifecycleError::UnknownAgent {
                node: node.to_string(),
            })?;

        if agent.state == AgentState::Running {
            return Ok(());
        }

        agent.state.transition_to(AgentState::Running)?;
        info!("Agent {} is running", node);
        Ok(())
    }

    /// Current state of a managed agent, `None` once it left the registry
    pub fn state(&self, node: &str) -> Option<AgentState> {
        let agents = self.agents.lock().unwrap();
        agents.get(node).map(|agent| agent.state)
    }

    /// Node names currently under management
    pub fn agent_names(&self) -> Vec<String> {
        let agents = self.agents.lock().unwrap();
        let mut names: Vec<String> = agents.keys().cloned().collect();
        names.sort();
        names
    }

    /// Retires an agent on an external decision
    ///
    /// Always ends with the agent removed from the registry, whatever the
    /// backend says about the stop request. Teardown keeps going if the
    /// returned future is dropped.
    pub async fn retire(&self, node: &str) -> Result<(), LifecycleError> {
        let controller = self.begin_retirement(node)?;
        let handle = self.spawn_termination(node.to_string(), controller);
        if let Err(e) = handle.await {
            warn!("Termination of {} panicked: {}", node, e);
            finish_retirement(&self.agents, node);
        }
        Ok(())
    }

    /// Starts the check loop, returning when `shutdown` resolves
    pub async fn run<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        info!(
            "Starting retirement monitor (interval: {:?})",
            self.config.check_interval
        );

        let mut interval = time::interval(self.config.check_interval);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Retirement monitor shutting down");
                    return;
                }
                _ = interval.tick() => {
                    debug!("Checking agent survivability");
                    let report = self.check_once().await;
                    if !report.retired.is_empty() {
                        info!(
                            "Retired {} agent(s) this cycle: {}",
                            report.retired.len(),
                            report.retired.join(", ")
                        );
                    }
                }
            }
        }
    }

    /// Performs a single check cycle
    pub async fn check_once(&self) -> CheckReport {
        let candidates = self.candidates();
        let mut report = CheckReport {
            checked: candidates.len(),
            ..Default::default()
        };

        if candidates.is_empty() {
            debug!("No agents to check");
            return report;
        }

        let mut handles = Vec::with_capacity(candidates.len());
        for (node, controller) in candidates {
            let semaphore = Arc::clone(&self.semaphore);
            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let verdict = controller.is_survivable().await;
                (node, verdict)
            }));
        }

        let mut to_retire = Vec::new();
        for handle in handles {
            let (node, verdict) = match handle.await {
                Ok(result) => result,
                Err(e) => {
                    warn!("Survivability check task panicked: {}", e);
                    continue;
                }
            };

            match verdict {
                Ok(true) => self.record_survivable(&node),
                Ok(false) => {
                    info!("Agent {} is no longer survivable", node);
                    to_retire.push(node);
                }
                Err(e) if e.is_transient() => {
                    report.describe_failures += 1;
                    if self.record_describe_failure(&node, &e) {
                        to_retire.push(node);
                    }
                }
                Err(e) => {
                    warn!("Skipping agent {}: {}", node, e);
                }
            }
        }

        report.retired = self.retire_all(to_retire).await;
        report
    }

    /// Copies out the agents that can be checked this cycle
    fn candidates(&self) -> Vec<(String, Arc<AgentLifecycleController>)> {
        let agents = self.agents.lock().unwrap();
        agents
            .iter()
            .filter(|(_, agent)| {
                matches!(agent.state, AgentState::Provisioning | AgentState::Running)
            })
            .map(|(node, agent)| (node.clone(), Arc::clone(&agent.controller)))
            .collect()
    }

    fn record_survivable(&self, node: &str) {
        let mut agents = self.agents.lock().unwrap();
        let Some(agent) = agents.get_mut(node) else {
            return;
        };

        agent.describe_failures = 0;
        if agent.state == AgentState::Provisioning {
            if let Err(e) = agent.state.transition_to(AgentState::Running) {
                warn!("Agent {}: {}", node, e);
            } else {
                info!("Agent {} is running", node);
            }
        }
    }

    /// Counts a failed describe; true once the agent should be given up on
    fn record_describe_failure(&self, node: &str, err: &LifecycleError) -> bool {
        let mut agents = self.agents.lock().unwrap();
        let Some(agent) = agents.get_mut(node) else {
            return false;
        };

        agent.describe_failures += 1;
        let limit = self.config.max_describe_failures;
        if agent.describe_failures >= limit {
            error!(
                "Agent {}: {} consecutive describe failure(s), retiring: {}",
                node, agent.describe_failures, err
            );
            true
        } else {
            warn!(
                "Agent {}: describe failed ({}/{}), keeping for now: {}",
                node, agent.describe_failures, limit, err
            );
            false
        }
    }

    async fn retire_all(&self, nodes: Vec<String>) -> Vec<String> {
        let mut handles = Vec::with_capacity(nodes.len());
        for node in nodes {
            let controller = match self.begin_retirement(&node) {
                Ok(controller) => controller,
                Err(e) => {
                    debug!("Not retiring {}: {}", node, e);
                    continue;
                }
            };

            let handle = self.spawn_termination(node.clone(), controller);
            handles.push((node, handle));
        }

        let mut retired = Vec::with_capacity(handles.len());
        for (node, handle) in handles {
            if let Err(e) = handle.await {
                warn!("Termination of {} panicked: {}", node, e);
                finish_retirement(&self.agents, &node);
            }
            retired.push(node);
        }
        retired.sort();
        retired
    }

    /// Moves an agent to `Retiring` and hands out its controller
    fn begin_retirement(
        &self,
        node: &str,
    ) -> Result<Arc<AgentLifecycleController>, LifecycleError> {
        let mut agents = self.agents.lock().unwrap();
        let agent = agents
            .get_mut(node)
            .ok_or_else(|| LifecycleError::UnknownAgent {
                node: node.to_string(),
            })?;

        agent.state.transition_to(AgentState::Retiring)?;
        info!("Retiring agent {}", node);
        Ok(Arc::clone(&agent.controller))
    }

    /// Runs best-effort teardown, then finishes the retirement
    fn spawn_termination(
        &self,
        node: String,
        controller: Arc<AgentLifecycleController>,
    ) -> JoinHandle<()> {
        let agents = Arc::clone(&self.agents);
        let semaphore = Arc::clone(&self.semaphore);
        let listener = Arc::clone(&self.listener);
        tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            controller.terminate(listener.as_ref()).await;
            finish_retirement(&agents, &node);
        })
    }
}

/// Marks an agent `Terminated` and drops it from the registry
fn finish_retirement(agents: &Registry, node: &str) {
    let mut agents = agents.lock().unwrap();
    if let Some(mut agent) = agents.remove(node) {
        if let Err(e) = agent.state.transition_to(AgentState::Terminated) {
            warn!("Agent {}: {}", node, e);
        }
        info!("Agent {} terminated", node);
    }
}
