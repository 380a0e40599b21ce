//! Adapter implementations for alert storage, dismissal and playback ports.

pub mod document;
pub mod memory;

mod file;

pub use document::{AlertDocument, AlertDocumentError};
pub use file::FileDismissFlagStore;
