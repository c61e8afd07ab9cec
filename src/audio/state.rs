use tracing::debug;

use crate::library::ItemId;

/// Lifecycle of the shared element with respect to the active item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Loading,
    Playing,
    Paused,
    Ended,
}

impl PlaybackState {
    pub fn label(self) -> &'static str {
        match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Loading => "loading",
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
            PlaybackState::Ended => "ended",
        }
    }
}

/// Which item owns the shared element, and where it is in its lifecycle.
/// Position and duration are always read back from the element itself.
#[derive(Debug, Clone, Default)]
pub struct PlaybackSession {
    active: Option<ItemId>,
    state: PlaybackState,
    load_attempts: u32,
}

impl PlaybackSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&ItemId> {
        self.active.as_ref()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_active(&self, id: &ItemId) -> bool {
        self.active.as_ref() == Some(id)
    }

    pub fn load_attempts(&self) -> u32 {
        self.load_attempts
    }

    pub(crate) fn begin_loading(&mut self, id: ItemId) {
        debug!(id = id.as_str(), from = self.state.label(), "session_loading");
        self.active = Some(id);
        self.state = PlaybackState::Loading;
        self.load_attempts = 0;
    }

    pub(crate) fn record_load_attempt(&mut self) -> u32 {
        self.load_attempts = self.load_attempts.saturating_add(1);
        self.load_attempts
    }

    /// Ignored while no item is active; every state but `Idle` needs one.
    pub(crate) fn transition(&mut self, state: PlaybackState) {
        if self.active.is_none() {
            return;
        }
        if self.state != state {
            debug!(
                id = self.active.as_ref().map(ItemId::as_str),
                from = self.state.label(),
                to = state.label(),
                "session_transition"
            );
        }
        self.state = state;
    }

    pub(crate) fn reset(&mut self) {
        self.active = None;
        self.state = PlaybackState::Idle;
        self.load_attempts = 0;
    }
}
