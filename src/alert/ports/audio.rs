//! Device audio port driven by the alarm controller actor.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

/// Result type for audio device operations.
pub type AudioDeviceResult<T> = Result<T, AudioDeviceError>;

/// Playback notifications reported by the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// One cycle of the sound finished without looping.
    Ended,
    /// Playback stopped on an unrecoverable error.
    Failed(String),
}

/// Sender the device uses to report [`PlaybackEvent`]s.
pub type PlaybackEventSender = mpsc::UnboundedSender<PlaybackEvent>;

/// Playback volume in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct Volume(f32);

impl Volume {
    /// Full volume.
    pub const MAX: Self = Self(1.0);

    /// Creates a validated volume.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidVolume`] when the value is not within `[0.0, 1.0]`.
    pub fn new(value: f32) -> Result<Self, InvalidVolume> {
        if !(0.0..=1.0).contains(&value) {
            return Err(InvalidVolume(value));
        }
        Ok(Self(value))
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn value(self) -> f32 {
        self.0
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::MAX
    }
}

impl TryFrom<f32> for Volume {
    type Error = InvalidVolume;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Volume> for f32 {
    fn from(volume: Volume) -> Self {
        volume.0
    }
}

/// Error returned for a volume outside `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("volume {0} is outside [0.0, 1.0]")]
pub struct InvalidVolume(pub f32);

/// File-backed alarm playback on the local device.
///
/// Implementations are owned by a single controller task, so they need not
/// be `Sync`.
pub trait AudioDevice: Send {
    /// Hands the device the channel for playback notifications.
    fn bind(&mut self, events: PlaybackEventSender);

    /// Starts playback from the current position.
    ///
    /// # Errors
    ///
    /// Returns [`AudioDeviceError`] when playback cannot start.
    fn start(&mut self) -> AudioDeviceResult<()>;

    /// Pauses playback at the current position.
    ///
    /// # Errors
    ///
    /// Returns [`AudioDeviceError`] when the device rejects the request.
    fn pause(&mut self) -> AudioDeviceResult<()>;

    /// Moves the playback position back to the start of the sound.
    ///
    /// # Errors
    ///
    /// Returns [`AudioDeviceError`] when the device rejects the request.
    fn rewind(&mut self) -> AudioDeviceResult<()>;

    /// Enables or disables looping.
    ///
    /// # Errors
    ///
    /// Returns [`AudioDeviceError`] when the device rejects the request.
    fn set_looping(&mut self, looping: bool) -> AudioDeviceResult<()>;

    /// Sets the output volume.
    ///
    /// # Errors
    ///
    /// Returns [`AudioDeviceError`] when the device rejects the request.
    fn set_volume(&mut self, volume: Volume) -> AudioDeviceResult<()>;
}

/// Errors returned by audio devices.
#[derive(Debug, Clone, Error)]
pub enum AudioDeviceError {
    /// Playback was refused, e.g. by an autoplay policy.
    #[error("playback refused: {0}")]
    Refused(String),

    /// Generic device failure.
    #[error("audio device error: {0}")]
    Device(Arc<dyn std::error::Error + Send + Sync>),
}

impl AudioDeviceError {
    /// Wraps a device error.
    pub fn device(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Device(Arc::new(err))
    }
}
