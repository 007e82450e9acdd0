//! Drover Core
//!
//! Core types and policies for the Drover agent lifecycle engine.
//!
//! This crate contains:
//! - Domain types: remote task snapshots, worker identity, agent state
//! - Policies: the survivability evaluator and the executor capacity resolver
//! - DTOs: wire representations exchanged with a task scheduling service
//!
//! Nothing here performs I/O; the remote client lives in `drover-client` and
//! the lifecycle controller in `drover-agent`.

pub mod capacity;
pub mod domain;
pub mod dto;
pub mod error;
pub mod survivability;

pub use capacity::resolve_executors;
pub use error::{CoreError, Result};
pub use survivability::evaluate;
