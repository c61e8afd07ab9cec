#[cfg(feature = "playback")]
pub mod app;
pub mod components;
pub mod input;
pub mod message;
#[cfg(feature = "playback")]
pub mod tui;
