//! Cross-cutting HTTP plumbing shared by Relay services: error bodies,
//! health probes, request ids, serde helpers and tracing setup.

pub mod error;
pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
