use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use reqwest::Url;

use crate::{
    audio::{
        config::PlayerConfig,
        controller::PlaybackController,
        error::AudioError,
        probe::{FormatSupport, StaticFormatProbe},
        traits::MediaElement,
    },
    library::{PlayableItem, StreamLocator},
};

#[derive(Debug, Default)]
pub struct FakeState {
    pub source: Option<String>,
    pub loads: u32,
    pub play_calls: u32,
    pub position: Duration,
    pub paused: bool,
    pub ended: bool,
    pub rate: f32,
    pub metadata: Option<Duration>,
    pub metadata_ready: bool,
    pub auto_metadata: bool,
    pub fail_play: bool,
}

/// Scriptable stand-in for the shared audio element. Clones share state so a
/// test can keep a handle after the controller took ownership.
#[derive(Debug, Clone)]
pub struct FakeElement {
    state: Arc<Mutex<FakeState>>,
}

impl FakeElement {
    /// Every loaded source reports `duration` right after `load()`.
    pub fn with_duration(duration: Duration) -> Self {
        let element = Self::deferred(duration);
        element.state().auto_metadata = true;
        element
    }

    /// Metadata only shows up once the test calls [`deliver_metadata`].
    ///
    /// [`deliver_metadata`]: FakeElement::deliver_metadata
    pub fn deferred(duration: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeState {
                paused: true,
                rate: 1.0,
                metadata: Some(duration),
                ..FakeState::default()
            })),
        }
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn deliver_metadata(&self) {
        self.state().metadata_ready = true;
    }

    /// Moves the playhead as a playing element would, ending at the duration.
    pub fn advance(&self, elapsed: Duration) {
        let mut state = self.state();
        if state.paused {
            return;
        }
        let total = state.metadata.unwrap_or(Duration::MAX);
        let next = state.position + elapsed.mul_f32(state.rate);
        if next >= total {
            state.position = total;
            state.paused = true;
            state.ended = true;
        } else {
            state.position = next;
        }
    }
}

impl MediaElement for FakeElement {
    fn set_source(&mut self, url: &str) {
        self.state().source = Some(url.to_string());
    }

    fn load(&mut self) {
        let mut state = self.state();
        state.loads += 1;
        state.position = Duration::ZERO;
        state.paused = true;
        state.ended = false;
        state.rate = 1.0;
        state.metadata_ready = state.auto_metadata;
    }

    fn play(&mut self) -> Result<(), AudioError> {
        let mut state = self.state();
        if state.fail_play {
            return Err(AudioError::DeviceError("no output device".into()));
        }
        state.play_calls += 1;
        state.paused = false;
        state.ended = false;
        Ok(())
    }

    fn pause(&mut self) {
        self.state().paused = true;
    }

    fn paused(&self) -> bool {
        self.state().paused
    }

    fn ended(&self) -> bool {
        self.state().ended
    }

    fn current_time(&self) -> Duration {
        self.state().position
    }

    fn set_current_time(&mut self, position: Duration) {
        let mut state = self.state();
        state.position = position;
        state.ended = false;
    }

    fn duration(&self) -> Option<Duration> {
        let state = self.state();
        if state.metadata_ready { state.metadata } else { None }
    }

    fn playback_rate(&self) -> f32 {
        self.state().rate
    }

    fn set_playback_rate(&mut self, rate: f32) {
        self.state().rate = rate;
    }
}

pub fn probe() -> StaticFormatProbe {
    StaticFormatProbe::new()
        .probably(["audio/mpeg", "audio/ogg"])
        .with("audio/mp4", FormatSupport::Maybe)
}

pub fn items() -> Vec<PlayableItem> {
    vec![
        PlayableItem::new(1, "Berachos 2a", StreamLocator::series(5, "berachos 2a.mp3")),
        PlayableItem::new(2, "Berachos 2b", StreamLocator::series(5, "berachos-2b.ogg")),
        PlayableItem::new(3, "Berachos 3a", StreamLocator::series(5, "berachos-3a.m4a")),
        PlayableItem::new(4, "Shmuez", StreamLocator::bucket("shmuez.wma")),
    ]
}

pub fn controller_with(element: FakeElement, config: PlayerConfig) -> PlaybackController<FakeElement> {
    let base = Url::parse("https://shiurbank.example.org/").unwrap();
    let mut controller = PlaybackController::new(element, Arc::new(probe()), base, config);
    controller.register(items());
    controller
}

pub fn controller(element: FakeElement) -> PlaybackController<FakeElement> {
    controller_with(element, PlayerConfig::default())
}
