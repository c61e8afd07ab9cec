//! Playback controller for ShiurBank recordings: one shared audio output, a
//! list of shiurim, and per-item progress kept in sync with playback.

pub mod audio;
pub mod event;
pub mod library;
pub mod ui;
pub mod util;

pub use audio::{
    config::PlayerConfig,
    controller::PlaybackController,
    error::AudioError,
    state::PlaybackState,
    system::{PlayerHandle, PlayerSystem},
};
pub use library::{ItemId, PlayableItem, StreamLocator};
