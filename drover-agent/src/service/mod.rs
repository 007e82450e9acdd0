//! Service layer
//!
//! Services hold the agent's business logic: the lifecycle controller that
//! projects one worker onto its remote task, and the listeners that record
//! what happened during teardown.

mod lifecycle;
mod listener;

pub use lifecycle::AgentLifecycleController;
pub use listener::{BufferedListener, TaskListener, TracingListener};
