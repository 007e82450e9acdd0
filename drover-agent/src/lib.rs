//! Drover Agent
//!
//! Lifecycle and survivability engine for fleet agents backed by remote tasks.
//!
//! Architecture:
//! - Configuration: settings for the monitor daemon, loaded from the environment
//! - Backend: builds the remote task client selected by configuration
//! - Services: the per-agent lifecycle controller and diagnostic listeners
//! - Scheduler: the retirement monitor that periodically re-checks every agent
//!
//! Survivability is always re-derived from a fresh describe call; teardown is
//! best-effort and never fails the caller.

pub mod backend;
pub mod config;
pub mod error;
pub mod scheduler;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;

pub use error::LifecycleError;
pub use scheduler::{CheckReport, RetirementMonitor};
pub use service::{AgentLifecycleController, BufferedListener, TaskListener, TracingListener};
