//! Adapter implementations for task persistence ports.

pub mod document;
pub mod memory;

pub use document::{TaskDocument, TaskDocumentError, TaskObjectDocument};
