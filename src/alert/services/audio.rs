//! Alarm playback controller.
//!
//! A single task owns the [`AudioDevice`] and applies play, stop and volume
//! requests strictly in arrival order. Callers talk to it through the
//! cloneable [`AudioAlarmController`] handle, so concurrent subscribers
//! cannot race on the device or the playing flag.

use crate::alert::ports::{AudioDevice, AudioDeviceError, InvalidVolume, PlaybackEvent, Volume};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

/// Errors returned by the alarm controller.
#[derive(Debug, Clone, Error)]
pub enum AudioError {
    /// The controller task has shut down.
    #[error("audio alarm controller has stopped")]
    ControllerStopped,

    /// The requested volume is out of range.
    #[error(transparent)]
    InvalidVolume(#[from] InvalidVolume),

    /// The device rejected the request.
    #[error(transparent)]
    Device(#[from] AudioDeviceError),
}

/// Result type for alarm controller operations.
pub type AudioResult<T> = Result<T, AudioError>;

/// Observable playback state published by the controller task.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackState {
    /// Whether a playback session is active.
    pub playing: bool,
    /// Current output volume.
    pub volume: Volume,
}

enum AudioCommand {
    Play(oneshot::Sender<AudioResult<()>>),
    PlayOnce(oneshot::Sender<AudioResult<()>>),
    Stop(oneshot::Sender<AudioResult<()>>),
    SetVolume(Volume, oneshot::Sender<AudioResult<()>>),
    Shutdown(oneshot::Sender<AudioResult<()>>),
}

/// Handle to the alarm playback task.
#[derive(Debug, Clone)]
pub struct AudioAlarmController {
    commands: mpsc::UnboundedSender<AudioCommand>,
    state: watch::Receiver<PlaybackState>,
}

impl AudioAlarmController {
    /// Spawns the playback task that owns `device`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn<D>(mut device: D, volume: Volume) -> Self
    where
        D: AudioDevice + 'static,
    {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        device.bind(events_tx);
        if let Err(err) = device.set_volume(volume) {
            warn!(error = %err, "failed to apply initial alarm volume");
        }
        if let Err(err) = device.set_looping(true) {
            warn!(error = %err, "failed to enable alarm looping");
        }

        let (state_tx, state_rx) = watch::channel(PlaybackState {
            playing: false,
            volume,
        });
        let player = AlarmPlayer {
            device,
            state: state_tx,
            playing: false,
            single_cycle: false,
            volume,
        };
        tokio::spawn(player.run(commands_rx, events_rx));

        Self {
            commands: commands_tx,
            state: state_rx,
        }
    }

    async fn request(
        &self,
        command: impl FnOnce(oneshot::Sender<AudioResult<()>>) -> AudioCommand,
    ) -> AudioResult<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(command(reply_tx))
            .map_err(|_| AudioError::ControllerStopped)?;
        reply_rx.await.map_err(|_| AudioError::ControllerStopped)?
    }

    /// Starts looping playback. No-op while already playing.
    ///
    /// # Errors
    ///
    /// Returns [`AudioError::Device`] when playback cannot start; the playing
    /// flag is cleared so a later call can retry.
    pub async fn play(&self) -> AudioResult<()> {
        self.request(AudioCommand::Play).await
    }

    /// Plays a single non-looping cycle, then restores looping. Ignored while
    /// already playing.
    ///
    /// # Errors
    ///
    /// Returns [`AudioError::Device`] when playback cannot start.
    pub async fn play_once(&self) -> AudioResult<()> {
        self.request(AudioCommand::PlayOnce).await
    }

    /// Pauses, rewinds, and clears the playing flag. No-op when idle.
    ///
    /// # Errors
    ///
    /// Returns [`AudioError::Device`] when the device rejects the pause or
    /// rewind; the playing flag is cleared regardless.
    pub async fn stop(&self) -> AudioResult<()> {
        self.request(AudioCommand::Stop).await
    }

    /// Sets the output volume.
    ///
    /// # Errors
    ///
    /// Returns [`AudioError::InvalidVolume`] outside `[0.0, 1.0]`.
    pub async fn set_volume(&self, level: f32) -> AudioResult<()> {
        let volume = Volume::new(level)?;
        self.request(|reply| AudioCommand::SetVolume(volume, reply))
            .await
    }

    /// Returns the current output volume.
    #[must_use]
    pub fn volume(&self) -> f32 {
        self.state.borrow().volume.value()
    }

    /// Returns `true` while a playback session is active.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.state.borrow().playing
    }

    /// Returns the latest published playback state.
    #[must_use]
    pub fn state(&self) -> PlaybackState {
        *self.state.borrow()
    }

    /// Stops playback and ends the controller task.
    ///
    /// # Errors
    ///
    /// Returns [`AudioError::ControllerStopped`] when the task already ended.
    pub async fn shutdown(&self) -> AudioResult<()> {
        self.request(AudioCommand::Shutdown).await
    }
}

struct AlarmPlayer<D> {
    device: D,
    state: watch::Sender<PlaybackState>,
    playing: bool,
    single_cycle: bool,
    volume: Volume,
}

impl<D: AudioDevice> AlarmPlayer<D> {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<AudioCommand>,
        mut events: mpsc::UnboundedReceiver<PlaybackEvent>,
    ) {
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(AudioCommand::Shutdown(reply)) => {
                        respond(reply, self.stop());
                        break;
                    }
                    Some(command) => self.handle(command),
                    None => {
                        if let Err(err) = self.stop() {
                            warn!(error = %err, "failed to stop alarm on controller drop");
                        }
                        break;
                    }
                },
                Some(event) = events.recv() => self.on_playback_event(event),
            }
        }
        debug!("audio alarm controller stopped");
    }

    fn handle(&mut self, command: AudioCommand) {
        match command {
            AudioCommand::Play(reply) => respond(reply, self.play()),
            AudioCommand::PlayOnce(reply) => respond(reply, self.play_once()),
            AudioCommand::Stop(reply) => respond(reply, self.stop()),
            AudioCommand::SetVolume(volume, reply) => respond(reply, self.set_volume(volume)),
            AudioCommand::Shutdown(reply) => respond(reply, self.stop()),
        }
    }

    fn play(&mut self) -> AudioResult<()> {
        if self.playing {
            return Ok(());
        }
        self.start()?;
        info!("alarm playback started");
        Ok(())
    }

    fn play_once(&mut self) -> AudioResult<()> {
        if self.playing {
            debug!("single alarm cycle ignored while playing");
            return Ok(());
        }
        self.device.set_looping(false)?;
        self.single_cycle = true;
        if let Err(err) = self.start() {
            self.restore_looping();
            return Err(err);
        }
        debug!("single alarm cycle started");
        Ok(())
    }

    fn start(&mut self) -> AudioResult<()> {
        self.set_playing(true);
        if let Err(err) = self.device.start() {
            warn!(error = %err, "alarm playback failed to start");
            self.set_playing(false);
            return Err(err.into());
        }
        Ok(())
    }

    fn stop(&mut self) -> AudioResult<()> {
        if !self.playing {
            return Ok(());
        }
        self.set_playing(false);
        let paused = self.device.pause();
        let rewound = self.device.rewind();
        self.restore_looping();
        info!("alarm playback stopped");
        paused?;
        rewound?;
        Ok(())
    }

    fn set_volume(&mut self, volume: Volume) -> AudioResult<()> {
        self.device.set_volume(volume)?;
        self.volume = volume;
        self.publish();
        Ok(())
    }

    fn on_playback_event(&mut self, event: PlaybackEvent) {
        match event {
            PlaybackEvent::Ended if self.single_cycle => {
                self.restore_looping();
                if let Err(err) = self.device.rewind() {
                    debug!(error = %err, "rewind after single cycle failed");
                }
                self.set_playing(false);
            }
            PlaybackEvent::Ended => debug!("ignoring end event while looping"),
            PlaybackEvent::Failed(reason) => {
                warn!(%reason, "alarm playback failed");
                self.restore_looping();
                self.set_playing(false);
            }
        }
    }

    fn restore_looping(&mut self) {
        if !self.single_cycle {
            return;
        }
        self.single_cycle = false;
        if let Err(err) = self.device.set_looping(true) {
            warn!(error = %err, "failed to restore alarm looping");
        }
    }

    fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
        self.publish();
    }

    fn publish(&self) {
        self.state.send_replace(PlaybackState {
            playing: self.playing,
            volume: self.volume,
        });
    }
}

fn respond(reply: oneshot::Sender<AudioResult<()>>, result: AudioResult<()>) {
    if reply.send(result).is_err() {
        debug!("alarm request caller went away before the reply");
    }
}
