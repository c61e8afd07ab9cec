use std::{sync::Arc, time::Duration};

use reqwest::Url;
use tracing::{debug, info, warn};

use crate::{
    audio::{
        config::{PlayerConfig, is_allowed_rate},
        error::AudioError,
        probe::FormatSupport,
        state::{PlaybackSession, PlaybackState},
        traits::{FormatProbe, MediaElement},
        view::{ItemView, PlayerSnapshot},
    },
    library::{ItemId, PlayableItem},
};

#[derive(Debug, Clone)]
struct RegisteredItem {
    item: PlayableItem,
    support: FormatSupport,
}

/// Drives one shared [`MediaElement`] on behalf of a list of items. At most
/// one item is active; every mutating call ends with a refresh pass whose
/// result is available from [`snapshot`](Self::snapshot).
pub struct PlaybackController<M: MediaElement> {
    media: M,
    probe: Arc<dyn FormatProbe>,
    base_url: Url,
    config: PlayerConfig,
    items: Vec<RegisteredItem>,
    session: PlaybackSession,
    rate: f32,
    snapshot: PlayerSnapshot,
}

impl<M: MediaElement> PlaybackController<M> {
    pub fn new(media: M, probe: Arc<dyn FormatProbe>, base_url: Url, config: PlayerConfig) -> Self {
        let rate = if is_allowed_rate(config.initial_rate) {
            config.initial_rate
        } else {
            1.0
        };

        let mut controller = Self {
            media,
            probe,
            base_url,
            config,
            items: Vec::new(),
            session: PlaybackSession::new(),
            rate,
            snapshot: PlayerSnapshot::default(),
        };
        controller.media.set_playback_rate(rate);
        controller.refresh();
        controller
    }

    /// Replaces the item list. Each item is probed once here; unsupported
    /// ones stay non-interactive for as long as they are registered.
    pub fn register(&mut self, items: Vec<PlayableItem>) {
        let registered: Vec<RegisteredItem> = items
            .into_iter()
            .map(|item| {
                let mime = item.content_type().into_owned();
                let support = self.probe.can_play_type(&mime);
                if !support.is_supported() {
                    debug!(id = item.id.as_str(), mime = mime.as_str(), "player_item_unsupported");
                }
                RegisteredItem { item, support }
            })
            .collect();
        self.items = registered;

        let orphaned = self
            .session
            .active()
            .is_some_and(|active| self.position_of(active).is_none());
        if orphaned {
            self.media.pause();
            self.session.reset();
        }

        self.refresh();
    }

    pub fn play(&mut self, id: &ItemId) -> Result<PlaybackState, AudioError> {
        let index = self
            .position_of(id)
            .ok_or_else(|| AudioError::UnknownItem(id.clone()))?;

        let entry = &self.items[index];
        if !entry.support.is_supported() {
            return Err(AudioError::UnsupportedFormat {
                id: id.clone(),
                mime: entry.item.content_type().into_owned(),
            });
        }

        if self.session.is_active(id) {
            match self.session.state() {
                PlaybackState::Loading => return Ok(PlaybackState::Loading),
                PlaybackState::Playing | PlaybackState::Paused if !self.media.paused() => {
                    self.pause_active();
                    return Ok(self.finish());
                }
                PlaybackState::Paused | PlaybackState::Playing => {
                    self.resume_active()?;
                    return Ok(self.finish());
                }
                PlaybackState::Ended => {
                    self.media.set_current_time(Duration::ZERO);
                    self.resume_active()?;
                    return Ok(self.finish());
                }
                PlaybackState::Idle => {}
            }
        }

        let url = self.items[index].item.stream_url(&self.base_url)?;
        if self.session.active().is_some() {
            self.media.pause();
        }

        info!(id = id.as_str(), url = url.as_str(), "player_load");
        self.media.set_source(url.as_str());
        self.media.load();
        self.media.set_playback_rate(self.rate);
        self.session.begin_loading(id.clone());

        // Metadata that is already there does not count as a poll.
        if self.media.duration().is_some() {
            return self.poll_metadata();
        }
        Ok(self.finish())
    }

    /// One step of the wait for media metadata. Starts playback as soon as a
    /// duration is known; gives up after `metadata_max_attempts` polls.
    pub fn poll_metadata(&mut self) -> Result<PlaybackState, AudioError> {
        if self.session.state() != PlaybackState::Loading {
            return Ok(self.session.state());
        }

        if let Some(duration) = self.media.duration() {
            debug!(
                id = self.active_id(),
                duration_ms = duration.as_millis() as u64,
                attempts = self.session.load_attempts(),
                "player_metadata_ready"
            );
            self.resume_active()?;
            return Ok(self.finish());
        }

        let attempts = self.session.record_load_attempt();
        if let Some(max) = self.config.metadata_max_attempts {
            if attempts >= max {
                let id = self.session.active().cloned();
                let waited = self.config.metadata_poll_interval * attempts;
                warn!(
                    id = self.active_id(),
                    waited_ms = waited.as_millis() as u64,
                    "player_metadata_timeout"
                );
                self.media.pause();
                self.session.reset();
                self.refresh();
                if let Some(id) = id {
                    return Err(AudioError::LoadTimedOut { id, waited });
                }
            }
        }

        Ok(self.finish())
    }

    pub fn toggle_play_pause(&mut self) -> Result<PlaybackState, AudioError> {
        match self.session.state() {
            PlaybackState::Idle | PlaybackState::Loading => return Ok(self.session.state()),
            PlaybackState::Ended => {
                self.media.set_current_time(Duration::ZERO);
                self.resume_active()?;
            }
            PlaybackState::Playing | PlaybackState::Paused => {
                if self.media.paused() {
                    self.resume_active()?;
                } else {
                    self.pause_active();
                }
            }
        }
        Ok(self.finish())
    }

    /// Moves the playhead by `delta_secs`, clamped to `[0, duration]`. With
    /// an unknown duration only the lower bound applies and targets past
    /// [`Duration::MAX`] saturate there.
    pub fn skip_by(&mut self, delta_secs: f64) -> Result<Duration, AudioError> {
        if !delta_secs.is_finite() {
            return Err(AudioError::InvalidSkipDelta(delta_secs));
        }
        self.require_active()?;

        let current = self.media.current_time().as_secs_f64();
        let mut target = (current + delta_secs).max(0.0);
        if let Some(duration) = self.media.duration() {
            target = target.min(duration.as_secs_f64());
        }

        let position = Duration::try_from_secs_f64(target).unwrap_or(Duration::MAX);
        self.media.set_current_time(position);
        self.leave_ended();
        self.finish();
        Ok(position)
    }

    pub fn seek_to(&mut self, fraction: f64) -> Result<Duration, AudioError> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(AudioError::InvalidSeekFraction(fraction));
        }
        self.require_active()?;
        let duration = self.media.duration().ok_or(AudioError::DurationUnknown)?;

        let position = duration.mul_f64(fraction);
        self.media.set_current_time(position);
        self.leave_ended();
        self.finish();
        Ok(position)
    }

    pub fn set_rate(&mut self, rate: f32) -> Result<(), AudioError> {
        if !is_allowed_rate(rate) {
            return Err(AudioError::UnsupportedRate(rate));
        }
        self.rate = rate;
        self.media.set_playback_rate(rate);
        self.finish();
        Ok(())
    }

    pub fn stop(&mut self) {
        self.media.pause();
        self.session.reset();
        self.refresh();
    }

    /// Picks up changes the element made on its own: reaching the end of the
    /// media, or being paused underneath us.
    pub fn tick(&mut self) -> PlaybackState {
        if self.session.state() == PlaybackState::Playing {
            if self.media.ended() {
                info!(id = self.active_id(), "player_ended");
                self.media.pause();
                self.media.set_current_time(Duration::ZERO);
                self.session.transition(PlaybackState::Ended);
            } else if self.media.paused() {
                self.session.transition(PlaybackState::Paused);
            }
        }
        self.finish()
    }

    pub fn state(&self) -> PlaybackState {
        self.session.state()
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub fn snapshot(&self) -> &PlayerSnapshot {
        &self.snapshot
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn items(&self) -> impl Iterator<Item = &PlayableItem> {
        self.items.iter().map(|entry| &entry.item)
    }

    pub fn is_interactive(&self, id: &ItemId) -> bool {
        self.items
            .iter()
            .any(|entry| &entry.item.id == id && entry.support.is_supported())
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    fn position_of(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|entry| &entry.item.id == id)
    }

    fn active_id(&self) -> Option<&str> {
        self.session.active().map(ItemId::as_str)
    }

    fn require_active(&self) -> Result<(), AudioError> {
        match self.session.state() {
            PlaybackState::Idle => Err(AudioError::NoActiveItem),
            _ => Ok(()),
        }
    }

    fn pause_active(&mut self) {
        self.media.pause();
        self.session.transition(PlaybackState::Paused);
    }

    fn resume_active(&mut self) -> Result<(), AudioError> {
        if let Err(e) = self.media.play() {
            warn!(id = self.active_id(), error = %e, "player_play_failed");
            self.media.pause();
            self.session.transition(PlaybackState::Paused);
            self.refresh();
            return Err(e);
        }
        self.media.set_playback_rate(self.rate);
        self.session.transition(PlaybackState::Playing);
        Ok(())
    }

    /// A seek away from the end clears `Ended`; the element is paused there.
    fn leave_ended(&mut self) {
        if self.session.state() == PlaybackState::Ended && !self.media.current_time().is_zero() {
            self.session.transition(PlaybackState::Paused);
        }
    }

    fn finish(&mut self) -> PlaybackState {
        self.refresh();
        self.session.state()
    }

    /// Rebuilds every item view. The active item shows the pause glyph only
    /// while the element itself is playing.
    fn refresh(&mut self) {
        let state = self.session.state();
        let active = self.session.active().cloned();
        let position = self.media.current_time();
        let duration = self.media.duration();
        let playing = state == PlaybackState::Playing && !self.media.paused();
        let buffered = self.media.buffered_ratio();

        let items = self
            .items
            .iter()
            .map(|entry| {
                let id = entry.item.id.clone();
                let title = entry.item.title.clone();
                if !entry.support.is_supported() {
                    ItemView::unavailable(id, title, entry.item.extension().as_deref())
                } else if active.as_ref() == Some(&id) {
                    ItemView::active(id, title, playing, position, duration, buffered)
                } else {
                    ItemView::idle(id, title)
                }
            })
            .collect();

        self.snapshot = PlayerSnapshot {
            items,
            state,
            active,
            position,
            duration,
            rate: self.rate,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        audio::{
            testing::{FakeElement, controller, controller_with},
            view::Glyph,
        },
        library::StreamLocator,
    };

    const LENGTH: Duration = Duration::from_secs(600);

    fn id(raw: i64) -> ItemId {
        ItemId::from(raw)
    }

    #[test]
    fn play_switches_between_items_keeping_one_playing() {
        let element = FakeElement::with_duration(LENGTH);
        let mut player = controller(element.clone());

        for (step, target) in [1, 2, 1].into_iter().enumerate() {
            assert_eq!(player.play(&id(target)).unwrap(), PlaybackState::Playing);

            let playing: Vec<_> = player.snapshot().playing_items().map(|v| v.id.clone()).collect();
            assert_eq!(playing, vec![id(target)], "step {step}");
            assert!(!element.state().paused);
        }
        assert_eq!(element.state().loads, 3);
    }

    #[test]
    fn play_resolves_the_series_stream_url() {
        let element = FakeElement::with_duration(LENGTH);
        let mut player = controller(element.clone());

        player.play(&id(1)).unwrap();

        assert_eq!(
            element.state().source.as_deref(),
            Some("https://shiurbank.example.org/api/audio/series/5/stream/berachos%202a.mp3")
        );
    }

    #[test]
    fn pressing_play_on_the_playing_item_pauses_it() {
        let element = FakeElement::with_duration(LENGTH);
        let mut player = controller(element.clone());
        player.play(&id(1)).unwrap();
        element.advance(Duration::from_secs(42));

        assert_eq!(player.play(&id(1)).unwrap(), PlaybackState::Paused);
        assert_eq!(player.snapshot().item(&id(1)).unwrap().glyph, Glyph::Play);

        assert_eq!(player.play(&id(1)).unwrap(), PlaybackState::Playing);
        assert_eq!(element.state().position, Duration::from_secs(42));
        assert_eq!(element.state().loads, 1);
    }

    #[test]
    fn toggling_twice_from_paused_returns_to_paused() {
        let element = FakeElement::with_duration(LENGTH);
        let mut player = controller(element.clone());
        player.play(&id(2)).unwrap();
        player.toggle_play_pause().unwrap();
        assert_eq!(player.state(), PlaybackState::Paused);

        player.toggle_play_pause().unwrap();
        let state = player.toggle_play_pause().unwrap();

        assert_eq!(state, PlaybackState::Paused);
        assert!(element.state().paused);
        assert_eq!(player.snapshot().playing_items().count(), 0);
    }

    #[test]
    fn toggle_without_active_item_is_a_no_op() {
        let element = FakeElement::with_duration(LENGTH);
        let mut player = controller(element.clone());

        assert_eq!(player.toggle_play_pause().unwrap(), PlaybackState::Idle);
        assert_eq!(element.state().play_calls, 0);
    }

    #[test]
    fn skip_forward_then_back_returns_to_the_same_position() {
        let element = FakeElement::with_duration(LENGTH);
        let mut player = controller(element.clone());
        player.play(&id(1)).unwrap();
        element.advance(Duration::from_secs(120));

        player.skip_by(15.0).unwrap();
        let position = player.skip_by(-15.0).unwrap();

        assert!((position.as_secs_f64() - 120.0).abs() < 0.001);
    }

    #[test]
    fn skip_is_clamped_to_the_known_duration() {
        let element = FakeElement::with_duration(LENGTH);
        let mut player = controller(element.clone());
        player.play(&id(1)).unwrap();

        assert_eq!(player.skip_by(-30.0).unwrap(), Duration::ZERO);
        assert_eq!(player.skip_by(10_000.0).unwrap(), LENGTH);
    }

    #[test]
    fn skip_with_unknown_duration_is_unclamped_above() {
        let element = FakeElement::deferred(LENGTH);
        let mut player = controller(element.clone());
        player.play(&id(1)).unwrap();
        assert_eq!(player.state(), PlaybackState::Loading);

        assert_eq!(player.skip_by(10_000.0).unwrap(), Duration::from_secs(10_000));
        assert_eq!(
            player.snapshot().item(&id(1)).unwrap().label,
            "2:46:40 / --:--"
        );
    }

    #[test]
    fn skip_needs_an_active_item() {
        let mut player = controller(FakeElement::with_duration(LENGTH));

        assert_eq!(player.skip_by(15.0), Err(AudioError::NoActiveItem));
    }

    #[test]
    fn seek_to_half_lands_in_the_middle() {
        let element = FakeElement::with_duration(LENGTH);
        let mut player = controller(element.clone());
        player.play(&id(1)).unwrap();

        let position = player.seek_to(0.5).unwrap();

        assert_eq!(position, LENGTH / 2);
        assert_eq!(element.state().position, LENGTH / 2);
        assert_eq!(player.snapshot().item(&id(1)).unwrap().progress, 0.5);
    }

    #[test]
    fn seek_requires_known_duration_and_a_valid_fraction() {
        let element = FakeElement::deferred(LENGTH);
        let mut player = controller(element.clone());
        player.play(&id(1)).unwrap();

        assert_eq!(player.seek_to(0.5), Err(AudioError::DurationUnknown));
        assert_eq!(player.seek_to(1.5), Err(AudioError::InvalidSeekFraction(1.5)));
    }

    #[test]
    fn unsupported_items_never_become_active() {
        let element = FakeElement::with_duration(LENGTH);
        let mut player = controller(element.clone());

        let result = player.play(&id(4));

        assert!(matches!(result, Err(AudioError::UnsupportedFormat { .. })));
        assert!(player.session().active().is_none());
        assert!(!player.is_interactive(&id(4)));
        let view = player.snapshot().item(&id(4)).unwrap();
        assert_eq!(view.glyph, Glyph::Unavailable);
        assert!(!view.interactive);
        assert_eq!(element.state().loads, 0);
    }

    #[test]
    fn unsupported_item_does_not_disturb_current_playback() {
        let element = FakeElement::with_duration(LENGTH);
        let mut player = controller(element.clone());
        player.play(&id(1)).unwrap();

        assert!(player.play(&id(4)).is_err());

        assert_eq!(player.session().active(), Some(&id(1)));
        assert_eq!(player.state(), PlaybackState::Playing);
    }

    #[test]
    fn ended_resets_position_and_keeps_the_item() {
        let element = FakeElement::with_duration(LENGTH);
        let mut player = controller(element.clone());
        player.play(&id(3)).unwrap();
        element.advance(LENGTH + Duration::from_secs(1));

        assert_eq!(player.tick(), PlaybackState::Ended);

        let view = player.snapshot().item(&id(3)).unwrap();
        assert_eq!(view.glyph, Glyph::Play);
        assert_eq!(view.label, "00:00 / 10:00");
        assert_eq!(element.state().position, Duration::ZERO);
        assert_eq!(player.session().active(), Some(&id(3)));

        assert_eq!(player.play(&id(3)).unwrap(), PlaybackState::Playing);
        assert_eq!(element.state().position, Duration::ZERO);
        assert_eq!(element.state().loads, 1);
    }

    #[test]
    fn metadata_wait_starts_playback_once_duration_arrives() {
        let element = FakeElement::deferred(LENGTH);
        let mut player = controller(element.clone());

        assert_eq!(player.play(&id(1)).unwrap(), PlaybackState::Loading);
        assert_eq!(player.poll_metadata().unwrap(), PlaybackState::Loading);
        assert_eq!(element.state().play_calls, 0);
        assert_eq!(player.snapshot().item(&id(1)).unwrap().glyph, Glyph::Play);

        element.deliver_metadata();

        assert_eq!(player.poll_metadata().unwrap(), PlaybackState::Playing);
        assert_eq!(element.state().play_calls, 1);
    }

    #[test]
    fn metadata_wait_gives_up_after_the_configured_attempts() {
        let element = FakeElement::deferred(LENGTH);
        let config = PlayerConfig {
            metadata_max_attempts: Some(3),
            ..PlayerConfig::default()
        };
        let mut player = controller_with(element.clone(), config);

        assert_eq!(player.play(&id(2)).unwrap(), PlaybackState::Loading);
        assert_eq!(player.session().load_attempts(), 0);
        assert_eq!(player.poll_metadata().unwrap(), PlaybackState::Loading);
        assert_eq!(player.poll_metadata().unwrap(), PlaybackState::Loading);
        let result = player.poll_metadata();

        assert_eq!(
            result,
            Err(AudioError::LoadTimedOut {
                id: id(2),
                waited: Duration::from_millis(300),
            })
        );
        assert_eq!(player.state(), PlaybackState::Idle);
        assert!(player.session().active().is_none());
    }

    #[test]
    fn unbounded_wait_keeps_loading() {
        let element = FakeElement::deferred(LENGTH);
        let config = PlayerConfig {
            metadata_max_attempts: None,
            ..PlayerConfig::default()
        };
        let mut player = controller_with(element, config);
        player.play(&id(1)).unwrap();

        for _ in 0..5_000 {
            assert_eq!(player.poll_metadata().unwrap(), PlaybackState::Loading);
        }
    }

    #[test]
    fn rate_is_validated_and_survives_a_switch() {
        let element = FakeElement::with_duration(LENGTH);
        let mut player = controller(element.clone());

        assert_eq!(player.set_rate(3.0), Err(AudioError::UnsupportedRate(3.0)));
        player.set_rate(1.5).unwrap();
        player.play(&id(1)).unwrap();
        player.play(&id(2)).unwrap();

        assert_eq!(element.state().rate, 1.5);
        assert_eq!(player.snapshot().rate, 1.5);
    }

    #[test]
    fn failed_play_leaves_the_item_paused() {
        let element = FakeElement::with_duration(LENGTH);
        element.state().fail_play = true;
        let mut player = controller(element.clone());

        assert!(matches!(player.play(&id(1)), Err(AudioError::DeviceError(_))));
        assert_eq!(player.state(), PlaybackState::Paused);
        assert_eq!(player.snapshot().playing_items().count(), 0);
    }

    #[test]
    fn external_pause_is_picked_up_on_tick() {
        let element = FakeElement::with_duration(LENGTH);
        let mut player = controller(element.clone());
        player.play(&id(1)).unwrap();

        element.state().paused = true;

        assert_eq!(player.tick(), PlaybackState::Paused);
    }

    #[test]
    fn registering_without_the_active_item_stops_playback() {
        let element = FakeElement::with_duration(LENGTH);
        let mut player = controller(element.clone());
        player.play(&id(1)).unwrap();

        player.register(crate::audio::testing::items().into_iter().skip(1).collect());

        assert_eq!(player.state(), PlaybackState::Idle);
        assert!(element.state().paused);
        assert_eq!(player.snapshot().items.len(), 3);
    }

    #[test]
    fn stop_detaches_the_active_item() {
        let element = FakeElement::with_duration(LENGTH);
        let mut player = controller(element.clone());
        player.play(&id(1)).unwrap();

        player.stop();

        assert_eq!(player.state(), PlaybackState::Idle);
        assert!(player.session().active().is_none());
        assert!(element.state().paused);
        assert!(player.snapshot().playing_items().next().is_none());
    }

    #[test]
    fn skipping_while_loading_never_overflows() {
        let element = FakeElement::deferred(LENGTH);
        let mut player = controller(element.clone());
        player.play(&id(1)).unwrap();
        element.state().position = Duration::from_secs(3);

        assert_eq!(player.skip_by(1e20), Ok(Duration::MAX));
        assert_eq!(player.state(), PlaybackState::Loading);

        element.state().position = Duration::from_secs(3);
        assert_eq!(player.skip_by(f64::MAX), Ok(Duration::MAX));

        element.state().position = Duration::from_secs(3);
        assert_eq!(
            player.skip_by(f64::INFINITY),
            Err(AudioError::InvalidSkipDelta(f64::INFINITY))
        );
        assert!(matches!(
            player.skip_by(f64::NAN),
            Err(AudioError::InvalidSkipDelta(delta)) if delta.is_nan()
        ));
        assert_eq!(element.state().position, Duration::from_secs(3));
    }

    #[test]
    fn pressing_play_while_loading_does_not_reload() {
        let element = FakeElement::deferred(LENGTH);
        let mut player = controller(element.clone());
        assert_eq!(player.play(&id(1)).unwrap(), PlaybackState::Loading);

        assert_eq!(player.play(&id(1)).unwrap(), PlaybackState::Loading);

        assert_eq!(element.state().loads, 1);
        assert_eq!(element.state().play_calls, 0);
        assert_eq!(player.session().load_attempts(), 0);
    }

    #[test]
    fn uncommon_extensions_use_their_own_mime_type() {
        let element = FakeElement::with_duration(LENGTH);
        let mut player = controller(element.clone());

        player.register(vec![
            PlayableItem::new("amr", "Amr", StreamLocator::bucket("talk.amr")),
            PlayableItem::new("3gp", "3gp", StreamLocator::bucket("talk.3gp")),
            PlayableItem::new("m4b", "M4b", StreamLocator::bucket("talk.m4b")),
        ]);

        assert!(!player.is_interactive(&ItemId::from("amr")));
        assert!(!player.is_interactive(&ItemId::from("3gp")));
        assert!(player.is_interactive(&ItemId::from("m4b")));
        assert!(matches!(
            player.play(&ItemId::from("amr")),
            Err(AudioError::UnsupportedFormat { mime, .. }) if mime == "audio/amr"
        ));
        let view = player.snapshot().item(&ItemId::from("3gp")).unwrap();
        assert_eq!(view.glyph, Glyph::Unavailable);
        assert_eq!(view.label, "Cannot play .3gp files");
        assert_eq!(element.state().loads, 0);
    }

    #[test]
    fn unknown_items_are_reported() {
        let mut player = controller(FakeElement::with_duration(LENGTH));

        assert_eq!(player.play(&id(99)), Err(AudioError::UnknownItem(id(99))));
    }
}
