use flume::Receiver;
use ratatui::Frame;
use tracing::{info, warn};

use crate::{
    audio::{
        config::step_rate,
        system::PlayerHandle,
        view::PlayerSnapshot,
    },
    event::events::Event,
    ui::{
        components::screen::PlayerScreen,
        input::InputHandler,
        message::AppMessage,
        tui::{TerminalEvent, Tui},
    },
};

pub struct App {
    player: PlayerHandle,
    event_rx: Receiver<Event>,
    snapshot: PlayerSnapshot,
    selected: usize,
    seek_step_secs: f64,
    has_focus: bool,
    should_quit: bool,
}

impl App {
    pub fn new(player: PlayerHandle, event_rx: Receiver<Event>, seek_step_secs: f64) -> Self {
        Self {
            player,
            event_rx,
            snapshot: PlayerSnapshot::default(),
            selected: 0,
            seek_step_secs,
            has_focus: true,
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> color_eyre::Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;

        while !self.should_quit {
            tui.draw(|f| self.ui(f))?;

            if let Some(evt) = tui.next().await {
                self.handle_terminal_event(evt, &mut tui)?;
            }
            while let Ok(evt) = self.event_rx.try_recv() {
                self.handle_player_event(evt);
            }
        }

        tui.exit()?;
        Ok(())
    }

    fn ui(&self, frame: &mut Frame) {
        if self.has_focus {
            let selected = (!self.snapshot.items.is_empty()).then_some(self.selected);
            frame.render_widget(PlayerScreen::new(&self.snapshot, selected), frame.area());
        }
    }

    fn handle_terminal_event(&mut self, evt: TerminalEvent, tui: &mut Tui) -> color_eyre::Result<()> {
        match evt {
            TerminalEvent::Key(key) => {
                if let Some(message) = InputHandler::handle_key(key) {
                    self.handle_message(message)?;
                }
            }
            TerminalEvent::FocusGained => {
                self.has_focus = true;
                tui.clear()?;
            }
            TerminalEvent::FocusLost => self.has_focus = false,
            TerminalEvent::Resize(..) => tui.clear()?,
            TerminalEvent::Tick => {}
        }
        Ok(())
    }

    fn handle_message(&mut self, message: AppMessage) -> color_eyre::Result<()> {
        let count = self.snapshot.items.len();
        match message {
            AppMessage::Quit => self.should_quit = true,
            AppMessage::SelectNext if count > 0 => {
                self.selected = (self.selected + 1).min(count - 1);
            }
            AppMessage::SelectPrevious => self.selected = self.selected.saturating_sub(1),
            AppMessage::SelectNext => {}
            AppMessage::PlaySelected => {
                if let Some(view) = self.snapshot.items.get(self.selected) {
                    if view.interactive {
                        self.player.play(view.id.clone())?;
                    }
                }
            }
            AppMessage::TogglePlayPause => self.player.toggle_play_pause()?,
            AppMessage::SeekForward => self.player.skip_by(self.seek_step_secs)?,
            AppMessage::SeekBackward => self.player.skip_by(-self.seek_step_secs)?,
            AppMessage::SeekToTenth(tenth) => self.player.seek_to(f64::from(tenth) / 10.0)?,
            AppMessage::FasterRate => self.player.set_rate(step_rate(self.snapshot.rate, 1))?,
            AppMessage::SlowerRate => self.player.set_rate(step_rate(self.snapshot.rate, -1))?,
            AppMessage::Stop => self.player.stop()?,
        }
        Ok(())
    }

    fn handle_player_event(&mut self, evt: Event) {
        match evt {
            Event::Refreshed(snapshot) => {
                self.selected = self.selected.min(snapshot.items.len().saturating_sub(1));
                self.snapshot = snapshot;
            }
            Event::ItemStarted(id) => info!(id = id.as_str(), "app_item_started"),
            Event::ItemPaused(id) => info!(id = id.as_str(), "app_item_paused"),
            Event::ItemEnded(id) => info!(id = id.as_str(), "app_item_ended"),
            Event::LoadTimedOut(id) => warn!(id = id.as_str(), "app_item_load_timed_out"),
            Event::PlaybackError(message) => warn!(message = message.as_str(), "app_playback_error"),
        }
    }
}
