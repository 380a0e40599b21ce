//! Inspection task lifecycle for field agents.
//!
//! Operators create tasks listing the patrol objects an agent must visit.
//! The agent accepts the task, checks (or skips) each object, and completes
//! it; either side may cancel before completion. Every persisted change is
//! pushed to task subscribers. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
