//! Scheduler layer for the agent daemon
//!
//! This layer periodically re-checks every managed agent against the
//! scheduling service and retires the ones whose task is gone or stopping.

pub mod monitor;

pub use monitor::{CheckReport, RetirementMonitor};
