use flume::{Receiver, Sender};
use tokio::{
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::{info, warn};

use crate::{
    audio::{
        commands::PlayerCommand, controller::PlaybackController, error::AudioError,
        state::PlaybackState, traits::MediaElement,
    },
    event::events::Event,
    library::{ItemId, PlayableItem},
};

/// Cloneable front door to a running [`PlayerSystem`].
#[derive(Debug, Clone)]
pub struct PlayerHandle {
    command_tx: Sender<PlayerCommand>,
}

impl PlayerHandle {
    pub fn send(&self, cmd: PlayerCommand) -> Result<(), AudioError> {
        self.command_tx
            .send(cmd)
            .map_err(|_| AudioError::ChannelClosed)
    }

    pub fn register(&self, items: Vec<PlayableItem>) -> Result<(), AudioError> {
        self.send(PlayerCommand::Register(items))
    }

    pub fn play(&self, id: ItemId) -> Result<(), AudioError> {
        self.send(PlayerCommand::Play(id))
    }

    pub fn toggle_play_pause(&self) -> Result<(), AudioError> {
        self.send(PlayerCommand::TogglePlayPause)
    }

    pub fn skip_by(&self, delta_secs: f64) -> Result<(), AudioError> {
        self.send(PlayerCommand::SkipBy(delta_secs))
    }

    pub fn seek_to(&self, fraction: f64) -> Result<(), AudioError> {
        self.send(PlayerCommand::SeekTo(fraction))
    }

    pub fn set_rate(&self, rate: f32) -> Result<(), AudioError> {
        self.send(PlayerCommand::SetRate(rate))
    }

    pub fn stop(&self) -> Result<(), AudioError> {
        self.send(PlayerCommand::Stop)
    }

    pub fn shutdown(&self) -> Result<(), AudioError> {
        self.send(PlayerCommand::Shutdown)
    }
}

/// Owns the controller on a single task. Commands, redraw frames, the
/// fallback update and the metadata poll are all handled on that task, so
/// the element only ever sees one mutation at a time.
pub struct PlayerSystem<M: MediaElement> {
    controller: PlaybackController<M>,
    command_rx: Receiver<PlayerCommand>,
    event_tx: Sender<Event>,
}

impl<M: MediaElement + 'static> PlayerSystem<M> {
    pub fn spawn(
        controller: PlaybackController<M>,
        event_tx: Sender<Event>,
    ) -> (PlayerHandle, JoinHandle<()>) {
        let (command_tx, command_rx) = flume::unbounded();
        let system = Self {
            controller,
            command_rx,
            event_tx,
        };
        let task = tokio::spawn(system.run());
        (PlayerHandle { command_tx }, task)
    }

    async fn run(mut self) {
        let config = self.controller.config().clone();

        // Redraw loop: only polled while playing, restarted on every play.
        let mut frame = interval(config.frame_interval);
        frame.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut fallback = interval(config.fallback_interval);
        fallback.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut metadata = interval(config.metadata_poll_interval);
        metadata.set_missed_tick_behavior(MissedTickBehavior::Delay);

        self.publish_snapshot();

        loop {
            let before = self.observe();

            tokio::select! {
                cmd = self.command_rx.recv_async() => {
                    match cmd {
                        Ok(PlayerCommand::Shutdown) | Err(_) => break,
                        Ok(cmd) => {
                            if let Err(e) = self.apply(cmd) {
                                self.report(e);
                            }
                        }
                    }
                }
                _ = frame.tick(), if before.0 == PlaybackState::Playing => {
                    self.controller.tick();
                }
                _ = metadata.tick(), if before.0 == PlaybackState::Loading => {
                    if let Err(e) = self.controller.poll_metadata() {
                        self.report(e);
                    }
                }
                _ = fallback.tick() => {
                    self.controller.tick();
                }
            }

            let after = self.observe();
            if after != before {
                self.announce(&before, &after);
                match after.0 {
                    PlaybackState::Playing => frame.reset(),
                    PlaybackState::Loading => metadata.reset(),
                    _ => {}
                }
            }
            self.publish_snapshot();
        }

        self.controller.stop();
        info!("player_system_stopped");
    }

    fn apply(&mut self, cmd: PlayerCommand) -> Result<(), AudioError> {
        match cmd {
            PlayerCommand::Register(items) => self.controller.register(items),
            PlayerCommand::Play(id) => {
                self.controller.play(&id)?;
            }
            PlayerCommand::TogglePlayPause => {
                self.controller.toggle_play_pause()?;
            }
            PlayerCommand::SkipBy(delta) => {
                self.controller.skip_by(delta)?;
            }
            PlayerCommand::SeekTo(fraction) => {
                self.controller.seek_to(fraction)?;
            }
            PlayerCommand::SetRate(rate) => self.controller.set_rate(rate)?,
            PlayerCommand::Stop => self.controller.stop(),
            PlayerCommand::Shutdown => {}
        }
        Ok(())
    }

    fn observe(&self) -> (PlaybackState, Option<ItemId>) {
        (
            self.controller.state(),
            self.controller.session().active().cloned(),
        )
    }

    fn announce(
        &self,
        before: &(PlaybackState, Option<ItemId>),
        after: &(PlaybackState, Option<ItemId>),
    ) {
        let Some(id) = after.1.clone() else {
            return;
        };
        let switched = before.1 != after.1;

        let event = match after.0 {
            PlaybackState::Playing if switched || before.0 != PlaybackState::Playing => {
                Event::ItemStarted(id)
            }
            PlaybackState::Paused if !switched && before.0 == PlaybackState::Playing => {
                Event::ItemPaused(id)
            }
            PlaybackState::Ended if switched || before.0 != PlaybackState::Ended => {
                Event::ItemEnded(id)
            }
            _ => return,
        };
        let _ = self.event_tx.send(event);
    }

    fn report(&self, error: AudioError) {
        warn!(error = %error, "player_command_failed");
        let event = match error {
            AudioError::LoadTimedOut { id, .. } => Event::LoadTimedOut(id),
            other => Event::PlaybackError(other.to_string()),
        };
        let _ = self.event_tx.send(event);
    }

    fn publish_snapshot(&self) {
        let _ = self
            .event_tx
            .send(Event::Refreshed(self.controller.snapshot().clone()));
    }
}
