//! In-memory adapter implementations for tests and local runs.
//!
//! These adapters are thread-safe and need no external services.

mod audio;
mod dismiss;
mod notifier;
mod repository;

pub use audio::{DeviceCall, RecordingAudioDevice};
pub use dismiss::InMemoryDismissFlagStore;
pub use notifier::RecordingAlertNotifier;
pub use repository::InMemoryAlertRepository;
