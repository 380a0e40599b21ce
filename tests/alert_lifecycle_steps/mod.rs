//! Step definitions for field alert scenarios.

pub mod then;
pub mod when;
pub mod world;
