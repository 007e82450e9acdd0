//! Data Transfer Objects for talking to a task scheduling service
//!
//! DTOs are the JSON shapes exchanged over HTTP. They convert into domain
//! types at the client boundary so nothing past the client sees wire shapes.

pub mod task;
