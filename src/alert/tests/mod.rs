//! Unit tests for the alert module.
