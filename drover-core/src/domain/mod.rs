//! Core domain types
//!
//! This module contains the structures shared between the remote task client
//! (which produces snapshots) and the agent controller (which owns identities
//! and drives the agent state machine).

pub mod agent;
pub mod log;
pub mod task;
pub mod worker;
