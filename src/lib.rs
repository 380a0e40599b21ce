//! Patrolcore: coordination core for security-patrol field operations.
//!
//! This crate distributes emergency alerts to operators, field agents and
//! supervisors, drives the on-device alarm sound, and tracks inspection
//! tasks through an explicit state machine.
//!
//! # Architecture
//!
//! Patrolcore follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (document store, files, audio)
//!
//! # Modules
//!
//! - [`alert`]: Alert raising, audience targeting, alarm playback, dismissal
//! - [`task`]: Inspection task lifecycle and subscriptions
//! - [`identity`]: Roles, user identifiers and viewers
//! - [`config`]: Runtime configuration
//! - [`telemetry`]: Tracing subscriber setup

pub mod alert;
pub mod config;
pub mod identity;
pub mod subscription;
pub mod task;
pub mod telemetry;

#[cfg(test)]
mod test_support;
