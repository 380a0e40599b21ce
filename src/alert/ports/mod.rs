//! Port contracts for alert distribution.
//!
//! Ports define infrastructure-agnostic interfaces used by alert services.

pub mod audio;
pub mod dismiss;
pub mod notifier;
pub mod repository;

pub use audio::{
    AudioDevice, AudioDeviceError, AudioDeviceResult, InvalidVolume, PlaybackEvent,
    PlaybackEventSender, Volume,
};
pub use dismiss::{DismissFlagError, DismissFlagResult, DismissFlagStore, DismissRecord};
pub use notifier::{AlertNotifier, AlertNotifierError, AlertNotifierResult};
pub use repository::{
    AlertChange, AlertChangeFeed, AlertRepository, AlertRepositoryError, AlertRepositoryResult,
};
