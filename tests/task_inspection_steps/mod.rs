//! Step definitions for inspection task scenarios.

pub mod then;
pub mod when;
pub mod world;
