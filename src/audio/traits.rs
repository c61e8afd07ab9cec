use std::time::Duration;

use crate::audio::{error::AudioError, probe::FormatSupport};

/// The single audio output shared by every item on a page. Mirrors the
/// surface of an HTML media element so a browser binding and a native sink
/// can sit behind the same controller.
pub trait MediaElement: Send {
    fn set_source(&mut self, url: &str);
    /// Starts fetching the current source. Duration stays unknown until the
    /// media metadata arrives.
    fn load(&mut self);
    fn play(&mut self) -> Result<(), AudioError>;
    fn pause(&mut self);
    fn paused(&self) -> bool;
    fn ended(&self) -> bool;
    fn current_time(&self) -> Duration;
    fn set_current_time(&mut self, position: Duration);
    fn duration(&self) -> Option<Duration>;
    fn playback_rate(&self) -> f32;
    fn set_playback_rate(&mut self, rate: f32);

    /// Share of the source already fetched, `0.0..=1.0`.
    fn buffered_ratio(&self) -> f64 {
        0.0
    }
}

/// Format capability query, answered the way `canPlayType` answers it.
pub trait FormatProbe: Send + Sync {
    fn can_play_type(&self, mime: &str) -> FormatSupport;
}
