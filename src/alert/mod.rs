//! Alert distribution for field operations.
//!
//! Anyone may raise an alert; every subscribed viewer observes the same
//! tracked current alert, filtered by the alert's audience. Transitions of
//! the tracked alert drive the alarm sound and reset the per-device dismiss
//! flag. The module follows hexagonal architecture:
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
