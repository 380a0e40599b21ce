//! Audio device double that records every call.

use crate::alert::ports::{
    AudioDevice, AudioDeviceError, AudioDeviceResult, PlaybackEvent, PlaybackEventSender, Volume,
};
use std::sync::{Arc, Mutex, PoisonError};

/// One call made against a [`RecordingAudioDevice`].
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    /// `start` was called.
    Start,
    /// `pause` was called.
    Pause,
    /// `rewind` was called.
    Rewind,
    /// `set_looping` was called.
    SetLooping(bool),
    /// `set_volume` was called.
    SetVolume(Volume),
}

#[derive(Debug, Default)]
struct RecordingState {
    calls: Vec<DeviceCall>,
    refuse_next_start: Option<String>,
    events: Option<PlaybackEventSender>,
}

/// Audio device that plays nothing and records calls.
///
/// Clones share their state, so a test can keep one clone while the
/// controller owns another and drive playback events from outside.
#[derive(Debug, Clone, Default)]
pub struct RecordingAudioDevice {
    state: Arc<Mutex<RecordingState>>,
}

impl RecordingAudioDevice {
    /// Creates a device with an empty call log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut RecordingState) -> T) -> T {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    /// Returns every recorded call in order.
    #[must_use]
    pub fn calls(&self) -> Vec<DeviceCall> {
        self.with_state(|state| state.calls.clone())
    }

    /// Returns how many times `call` was recorded.
    #[must_use]
    pub fn count(&self, call: &DeviceCall) -> usize {
        self.with_state(|state| state.calls.iter().filter(|made| *made == call).count())
    }

    /// Makes the next `start` fail with [`AudioDeviceError::Refused`].
    pub fn refuse_next_start(&self, reason: impl Into<String>) {
        let refusal = reason.into();
        self.with_state(|state| state.refuse_next_start = Some(refusal));
    }

    /// Reports the end of a playback cycle. Returns `false` when no
    /// controller is bound.
    pub fn finish_cycle(&self) -> bool {
        self.emit(PlaybackEvent::Ended)
    }

    /// Reports a terminal playback failure. Returns `false` when no
    /// controller is bound.
    pub fn fail_playback(&self, reason: impl Into<String>) -> bool {
        self.emit(PlaybackEvent::Failed(reason.into()))
    }

    fn emit(&self, event: PlaybackEvent) -> bool {
        self.with_state(|state| {
            state
                .events
                .as_ref()
                .is_some_and(|events| events.send(event).is_ok())
        })
    }

    fn record(&self, call: DeviceCall) {
        self.with_state(|state| state.calls.push(call));
    }
}

impl AudioDevice for RecordingAudioDevice {
    fn bind(&mut self, events: PlaybackEventSender) {
        self.with_state(|state| state.events = Some(events));
    }

    fn start(&mut self) -> AudioDeviceResult<()> {
        self.record(DeviceCall::Start);
        self.with_state(|state| state.refuse_next_start.take())
            .map_or(Ok(()), |reason| Err(AudioDeviceError::Refused(reason)))
    }

    fn pause(&mut self) -> AudioDeviceResult<()> {
        self.record(DeviceCall::Pause);
        Ok(())
    }

    fn rewind(&mut self) -> AudioDeviceResult<()> {
        self.record(DeviceCall::Rewind);
        Ok(())
    }

    fn set_looping(&mut self, looping: bool) -> AudioDeviceResult<()> {
        self.record(DeviceCall::SetLooping(looping));
        Ok(())
    }

    fn set_volume(&mut self, volume: Volume) -> AudioDeviceResult<()> {
        self.record(DeviceCall::SetVolume(volume));
        Ok(())
    }
}
